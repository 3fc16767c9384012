//! The group-by orchestrator.

use regroup_core::config::{GroupByConfig, Limits};
use regroup_core::error::{Error, Result};
use regroup_core::stats::EngineStats;
use regroup_core::types::Key;
use regroup_io::{RunWriter, Workspace};
use regroup_operators::{DrainOutcome, KWayMerger, RunAccumulator};

use crate::result::{DiskGroupIter, GroupIterator, MemoryGroupIter};

/// Group a stream of `(key, value)` pairs by key with the given
/// configuration, returning a lazy iterator of `(key, values)` groups in
/// ascending key order.
///
/// Convenience wrapper over [`GroupByEngine`] for callers that do not need
/// the statistics afterwards.
pub fn group_by<I, V>(input: I, config: GroupByConfig) -> Result<GroupIterator>
where
    I: IntoIterator<Item = (Key, V)>,
    V: ToString,
{
    GroupByEngine::new(config).group_by(input)
}

/// Runs the two-stage pipeline: accumulate-and-spill, then cascade k-way
/// merges until at most `max_num_files` runs remain.
///
/// The engine is reusable; every `group_by` call resets the statistics and
/// works in its own freshly named workspace, so back-to-back invocations
/// never see each other's files.
pub struct GroupByEngine {
    config: GroupByConfig,
    limits: Limits,
    stats: EngineStats,
}

impl GroupByEngine {
    pub fn new(config: GroupByConfig) -> Self {
        let limits = config.limits();
        Self {
            config,
            limits,
            stats: EngineStats::default(),
        }
    }

    /// Counters from the most recent `group_by` call.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Consume `input` and produce the grouped stream.
    ///
    /// The input is drained exactly once. If everything fit in memory the
    /// workspace is removed before returning; otherwise ownership of the
    /// remaining runs moves into the returned iterator, which cleans up on
    /// exhaustion. On any fault the workspace is removed and the error
    /// surfaced.
    pub fn group_by<I, V>(&mut self, input: I) -> Result<GroupIterator>
    where
        I: IntoIterator<Item = (Key, V)>,
        V: ToString,
    {
        self.stats = EngineStats::default();
        self.limits = self.config.limits();

        let mut input = input.into_iter().peekable();
        if input.peek().is_none() {
            // Nothing to group; never touch the filesystem.
            return Ok(GroupIterator::empty());
        }

        let workspace = Workspace::create(
            &self.config.workspace_root,
            self.config.request_id.as_deref(),
        )?;
        let span = tracing::info_span!("group_by", request = workspace.id());
        let _guard = span.enter();

        let mut accumulator = RunAccumulator::new();
        let outcome = accumulator.drain(
            input,
            &workspace,
            &mut self.limits,
            self.config.max_memory,
            &mut self.stats,
        )?;

        match outcome {
            DrainOutcome::InMemory(map) => {
                tracing::info!(
                    entries = self.stats.total_num_entries,
                    "input fits in memory"
                );
                workspace.remove()?;
                Ok(GroupIterator::Memory(MemoryGroupIter::new(map)))
            }
            DrainOutcome::Spilled => {
                tracing::info!(
                    entries = self.stats.total_num_entries,
                    spills = self.stats.spills,
                    "input spilled to disk"
                );
                self.merge_until_bounded(&workspace)?;
                let runs: Vec<_> = (0..self.stats.num_files)
                    .map(|index| workspace.dump_path(index))
                    .collect();
                let iter = DiskGroupIter::open(workspace, &runs)?;
                Ok(GroupIterator::Disk(iter))
            }
        }
    }

    /// Cascade merge passes until the live run count is within the fan-in
    /// bound. Each pass reduces the count by a factor of up to
    /// `max_num_files`, so it terminates whenever the fan-in is at least 2.
    fn merge_until_bounded(&mut self, workspace: &Workspace) -> Result<()> {
        let fan_in = self.limits.max_num_files;
        while self.stats.num_files > fan_in {
            if fan_in < 2 {
                return Err(Error::MergeNotPossible {
                    num_files: self.stats.num_files,
                    max_num_files: fan_in,
                });
            }

            let num_files = self.stats.num_files;
            let mut next_slot = 0;
            let mut start = 0;
            while start < num_files {
                let end = (start + fan_in).min(num_files);
                if end - start == 1 {
                    // A lone trailing run just moves to its new slot.
                    workspace.rename_run(start, next_slot)?;
                } else {
                    self.merge_group(workspace, start, end, next_slot)?;
                }
                next_slot += 1;
                start = end;
            }

            tracing::info!(
                stage = self.stats.num_merge_stages,
                merged = num_files,
                into = next_slot,
                "completed merge stage"
            );
            self.stats.num_files = next_slot;
            self.stats.num_merge_stages += 1;
        }
        Ok(())
    }

    /// Merge runs `start..end` through the scratch file into dump slot
    /// `slot`, deleting the sources.
    fn merge_group(
        &self,
        workspace: &Workspace,
        start: usize,
        end: usize,
        slot: usize,
    ) -> Result<()> {
        let sources: Vec<_> = (start..end).map(|index| workspace.dump_path(index)).collect();
        let mut merger = KWayMerger::open(&sources)?;
        let mut writer = RunWriter::create(workspace.scratch_path())?;
        while let Some((key, values)) = merger.next_group()? {
            writer.write_group(key, &values)?;
        }
        writer.finish()?;

        for index in start..end {
            workspace.remove_run(index)?;
        }
        workspace.promote_scratch(slot)?;
        Ok(())
    }
}
