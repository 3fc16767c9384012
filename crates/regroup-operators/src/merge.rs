//! Lazy k-way merge over sorted runs.

use std::cmp::Ordering;
use std::collections::binary_heap::PeekMut;
use std::collections::BinaryHeap;
use std::path::Path;

use regroup_core::error::Result;
use regroup_core::types::{Group, Key};
use regroup_io::RunReader;

/// Entry in the merge heap.
///
/// Ordered by `(key, file)` and reversed for min-heap behavior; the file
/// index tie-break keeps value concatenation deterministic in file-list
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MergeEntry {
    key: Key,
    file: usize,
}

impl PartialOrd for MergeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        (other.key, other.file).cmp(&(self.key, self.file))
    }
}

/// Lazy iterator over the k-way, key-ordered merge of K sorted runs.
///
/// Each emitted group concatenates, in file-list order, the values every
/// input run holds for that key. All K files are open after construction;
/// each is closed the moment it reaches EOF, so an exhausted merger holds no
/// handles.
pub struct KWayMerger {
    readers: Vec<Option<RunReader>>,
    heap: BinaryHeap<MergeEntry>,
}

impl KWayMerger {
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut readers = Vec::with_capacity(paths.len());
        let mut heap = BinaryHeap::with_capacity(paths.len());
        for (file, path) in paths.iter().enumerate() {
            let reader = RunReader::open(path.as_ref())?;
            match reader.peek_key() {
                Some(key) => {
                    heap.push(MergeEntry { key, file });
                    readers.push(Some(reader));
                }
                None => readers.push(None),
            }
        }
        Ok(Self { readers, heap })
    }

    /// True once every input run has been fully consumed.
    pub fn is_exhausted(&self) -> bool {
        self.heap.is_empty()
    }

    /// Produce the next group, or `None` when all runs are drained.
    pub fn next_group(&mut self) -> Result<Option<Group>> {
        let key = match self.heap.peek() {
            Some(entry) => entry.key,
            None => return Ok(None),
        };

        let mut values = Vec::new();
        // Pop every run currently sitting on `key`, in file order.
        loop {
            let top = match self.heap.peek_mut() {
                Some(top) => top,
                None => break,
            };
            if top.key != key {
                break;
            }
            let entry = PeekMut::pop(top);
            let reader = self.readers[entry.file]
                .as_mut()
                .expect("reader stays open while queued in the heap");
            values.append(&mut reader.next_values()?);
            match reader.peek_key() {
                Some(next_key) => self.heap.push(MergeEntry {
                    key: next_key,
                    file: entry.file,
                }),
                // EOF: dropping the reader closes the handle.
                None => self.readers[entry.file] = None,
            }
        }

        Ok(Some((key, values)))
    }
}

impl Iterator for KWayMerger {
    type Item = Result<Group>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_group().transpose()
    }
}
