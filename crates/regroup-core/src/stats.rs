//! Observable per-invocation counters.

use serde::Serialize;

/// Counters reset at the start of every `group_by` invocation.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EngineStats {
    /// In-memory dumps written to disk.
    pub spills: u64,

    /// Cascading merge passes run to get under the fan-in bound.
    pub num_merge_stages: u64,

    /// Input pairs consumed.
    pub total_num_entries: u64,

    /// Live run files right now.
    pub num_files: usize,
}
