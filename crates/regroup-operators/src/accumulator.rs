//! In-memory accumulation and spilling of the input stream.

use std::collections::BTreeMap;

use regroup_core::config::Limits;
use regroup_core::error::Result;
use regroup_core::stats::EngineStats;
use regroup_core::types::Key;
use regroup_io::{RunWriter, Workspace};

/// Assumed in-memory footprint of one `(key, value)` pair, used when deriving
/// limits from a byte budget: an 8-byte key, a short value token, and the
/// per-entry overhead of the tree multimap. A heuristic, not a hard memory
/// guarantee.
pub const PAIR_FOOTPRINT_BYTES: usize = 64;

/// What `drain` produced.
pub enum DrainOutcome {
    /// No spill was needed; the whole input is grouped in this multimap.
    InMemory(BTreeMap<Key, Vec<String>>),
    /// One or more runs were written into the workspace.
    Spilled,
}

/// Consumes the input stream, holding groups in a sorted multimap and writing
/// it out as a run whenever the value count reaches the spill threshold.
///
/// Entry counting is per individual value, not per distinct key. The multimap
/// keeps keys sorted, so a spill is a straight traversal.
pub struct RunAccumulator {
    map: BTreeMap<Key, Vec<String>>,
    entry_count: usize,
    num_runs: usize,
}

impl Default for RunAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            entry_count: 0,
            num_runs: 0,
        }
    }

    /// Runs written so far.
    pub fn num_runs(&self) -> usize {
        self.num_runs
    }

    /// Drain the input. Spills whenever the threshold is reached; applies the
    /// memory-budget retune exactly once, on the first pair, before it is
    /// stored. Returns the fast-path multimap when nothing was ever spilled,
    /// otherwise flushes the residue as a final run.
    pub fn drain<I, V>(
        &mut self,
        input: I,
        workspace: &Workspace,
        limits: &mut Limits,
        max_memory: Option<u64>,
        stats: &mut EngineStats,
    ) -> Result<DrainOutcome>
    where
        I: Iterator<Item = (Key, V)>,
        V: ToString,
    {
        for (key, value) in input {
            if self.entry_count >= limits.max_hashmap_entries {
                self.spill(workspace, stats)?;
            }

            stats.total_num_entries += 1;
            if stats.total_num_entries == 1 {
                if let Some(budget) = max_memory {
                    limits.retune_for_memory(budget, PAIR_FOOTPRINT_BYTES);
                    tracing::info!(
                        max_memory = budget,
                        max_hashmap_entries = limits.max_hashmap_entries,
                        max_num_files = limits.max_num_files,
                        "derived limits from memory budget"
                    );
                }
            }

            self.map.entry(key).or_default().push(value.to_string());
            self.entry_count += 1;
        }

        if self.num_runs == 0 {
            return Ok(DrainOutcome::InMemory(std::mem::take(&mut self.map)));
        }
        if !self.map.is_empty() {
            self.spill(workspace, stats)?;
        }
        Ok(DrainOutcome::Spilled)
    }

    /// Write the multimap as run `dump_<num_runs>` and clear it.
    fn spill(&mut self, workspace: &Workspace, stats: &mut EngineStats) -> Result<()> {
        let path = workspace.dump_path(self.num_runs);
        let mut writer = RunWriter::create(&path)?;
        for (key, values) in &self.map {
            writer.write_group(*key, values)?;
        }
        writer.finish()?;

        self.map.clear();
        self.entry_count = 0;
        self.num_runs += 1;
        stats.spills += 1;
        stats.num_files += 1;
        tracing::debug!(run = %path.display(), spills = stats.spills, "spilled in-memory groups");
        Ok(())
    }
}
