//! Result iterators returned by `group_by`.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::Path;

use regroup_core::error::Result;
use regroup_core::types::{Group, Key};
use regroup_io::Workspace;
use regroup_operators::KWayMerger;

/// Lazy stream of `(key, values)` groups, keys strictly ascending, values in
/// input order within each group.
pub enum GroupIterator {
    Memory(MemoryGroupIter),
    Disk(DiskGroupIter),
}

impl GroupIterator {
    /// An iterator over no groups.
    pub fn empty() -> Self {
        GroupIterator::Memory(MemoryGroupIter::new(BTreeMap::new()))
    }
}

impl Iterator for GroupIterator {
    type Item = Result<Group>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            GroupIterator::Memory(iter) => iter.next(),
            GroupIterator::Disk(iter) => iter.next(),
        }
    }
}

/// Fast-path iterator over the in-memory multimap. The map is already
/// key-sorted; iteration is infallible and drop is trivial.
pub struct MemoryGroupIter {
    groups: btree_map::IntoIter<Key, Vec<String>>,
}

impl MemoryGroupIter {
    pub fn new(map: BTreeMap<Key, Vec<String>>) -> Self {
        Self {
            groups: map.into_iter(),
        }
    }
}

impl Iterator for MemoryGroupIter {
    type Item = Result<Group>;

    fn next(&mut self) -> Option<Self::Item> {
        self.groups.next().map(Ok)
    }
}

/// Spill-path iterator: a k-way merge over the final runs, owning the request
/// workspace.
///
/// The workspace is deleted exactly once, by whichever comes first: the
/// `next` call that drains the merger (before that final group is yielded),
/// a merge fault, or drop.
pub struct DiskGroupIter {
    merger: KWayMerger,
    workspace: Option<Workspace>,
}

impl DiskGroupIter {
    pub(crate) fn open(workspace: Workspace, runs: &[impl AsRef<Path>]) -> Result<Self> {
        // An open error here drops `workspace`, which removes the directory.
        let merger = KWayMerger::open(runs)?;
        Ok(Self {
            merger,
            workspace: Some(workspace),
        })
    }

    fn remove_workspace(&mut self) -> Result<()> {
        match self.workspace.take() {
            Some(workspace) => {
                tracing::debug!(request = workspace.id(), "removing workspace");
                workspace.remove()
            }
            None => Ok(()),
        }
    }
}

impl Iterator for DiskGroupIter {
    type Item = Result<Group>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.merger.next_group() {
            Ok(Some(group)) => {
                if self.merger.is_exhausted() {
                    if let Err(e) = self.remove_workspace() {
                        return Some(Err(e));
                    }
                }
                Some(Ok(group))
            }
            Ok(None) => match self.remove_workspace() {
                Ok(()) => None,
                Err(e) => Some(Err(e)),
            },
            Err(e) => {
                // Terminal fault: best-effort cleanup, then surface it.
                self.workspace.take();
                Some(Err(e))
            }
        }
    }
}
