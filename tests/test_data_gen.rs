//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use regroup::{GroupByConfig, GroupIterator, Key};

/// Deterministic pair generator: pair `i` has key `(i * key_jump) % key_range`
/// and value `(i * value_jump) % value_range`.
pub struct IncrementalKeyValueIterator {
    remaining: usize,
    key_range: i64,
    value_range: i64,
    key_jump: i64,
    value_jump: i64,
    current_key: i64,
    current_value: i64,
}

impl IncrementalKeyValueIterator {
    pub fn new(nr_pairs: usize, key_range: i64, value_range: i64) -> Self {
        Self::with_jumps(nr_pairs, key_range, value_range, 1, 1)
    }

    pub fn with_jumps(
        nr_pairs: usize,
        key_range: i64,
        value_range: i64,
        key_jump: i64,
        value_jump: i64,
    ) -> Self {
        Self {
            remaining: nr_pairs,
            key_range,
            value_range,
            key_jump,
            value_jump,
            current_key: 0,
            current_value: 0,
        }
    }
}

impl Iterator for IncrementalKeyValueIterator {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let pair = (self.current_key, self.current_value);
        self.current_key = (self.current_key + self.key_jump) % self.key_range;
        self.current_value = (self.current_value + self.value_jump) % self.value_range;
        Some(pair)
    }
}

/// Reference group-by: sorted keys, values in input order, everything in
/// memory. Engine output must match this exactly.
pub fn reference_groups<I, V>(pairs: I) -> Vec<(Key, Vec<String>)>
where
    I: IntoIterator<Item = (Key, V)>,
    V: ToString,
{
    let mut map: BTreeMap<Key, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        map.entry(key).or_default().push(value.to_string());
    }
    map.into_iter().collect()
}

/// Exhaust a result iterator, asserting no item failed.
pub fn collect_groups(iter: GroupIterator) -> Vec<(Key, Vec<String>)> {
    iter.collect::<Result<_, _>>().expect("group stream failed")
}

/// Config rooted in an isolated temp directory.
pub fn config_in(root: &Path) -> GroupByConfig {
    GroupByConfig {
        workspace_root: root.to_path_buf(),
        ..GroupByConfig::default()
    }
}

/// Number of directories directly under `root` (live workspaces).
pub fn dirs_under(root: &Path) -> usize {
    match std::fs::read_dir(root) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .count(),
        Err(_) => 0,
    }
}
