//! Engine configuration and the derived operating limits.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Fan-in ceiling applied when limits are derived from a memory budget.
pub const MAX_TUNED_FAN_IN: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupByConfig {
    /// Maximum number of runs merged in one pass; also the maximum number of
    /// runs the result iterator reads from.
    pub max_num_files: usize,

    /// Spill threshold, counted in individual values held in memory (not
    /// distinct keys).
    pub max_hashmap_entries: usize,

    /// Optional memory budget in bytes. When set, `max_hashmap_entries` and
    /// `max_num_files` are recomputed from it once the first pair is seen.
    pub max_memory: Option<u64>,

    /// Workspace directory name for this request. When unset, or when the
    /// directory already exists, a fresh unique name is generated.
    pub request_id: Option<String>,

    /// Parent directory for request workspaces.
    pub workspace_root: PathBuf,
}

impl Default for GroupByConfig {
    fn default() -> Self {
        Self {
            max_num_files: 100,
            max_hashmap_entries: 1_000_000,
            max_memory: None,
            request_id: None,
            workspace_root: std::env::temp_dir(),
        }
    }
}

impl GroupByConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `REGROUP_MAX_NUM_FILES`: merge fan-in bound
    /// - `REGROUP_MAX_HASHMAP_ENTRIES`: spill threshold in values
    /// - `REGROUP_MAX_MEMORY`: memory budget in bytes
    /// - `REGROUP_WORKSPACE_ROOT`: parent directory for workspaces
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("REGROUP_MAX_NUM_FILES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_num_files = v;
            }
        }

        if let Ok(s) = std::env::var("REGROUP_MAX_HASHMAP_ENTRIES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_hashmap_entries = v;
            }
        }

        if let Ok(s) = std::env::var("REGROUP_MAX_MEMORY") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.max_memory = Some(v);
            }
        }

        if let Ok(s) = std::env::var("REGROUP_WORKSPACE_ROOT") {
            cfg.workspace_root = PathBuf::from(s);
        }

        cfg
    }

    /// Snapshot the operating limits for one invocation.
    pub fn limits(&self) -> Limits {
        Limits {
            max_hashmap_entries: self.max_hashmap_entries,
            max_num_files: self.max_num_files,
        }
    }
}

/// The two limits the engine actually operates under. Separate from
/// `GroupByConfig` because a memory budget rewrites both mid-drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_hashmap_entries: usize,
    pub max_num_files: usize,
}

impl Limits {
    /// Rewrite both limits from a byte budget and a per-pair footprint.
    ///
    /// Both receive the same quotient; the fan-in is then capped at
    /// [`MAX_TUNED_FAN_IN`]. The quotient is floored at 1 so a budget below
    /// one pair degrades to spill-per-entry rather than an empty dump.
    pub fn retune_for_memory(&mut self, max_memory: u64, pair_footprint_bytes: usize) {
        let quotient = ((max_memory / pair_footprint_bytes as u64) as usize).max(1);
        self.max_hashmap_entries = quotient;
        self.max_num_files = quotient.min(MAX_TUNED_FAN_IN);
    }
}
