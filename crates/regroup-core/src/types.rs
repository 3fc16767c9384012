//! Type vocabulary used across the engine.

/// Group-by key. Keys compare by natural numeric order.
pub type Key = i64;

/// One emitted group: a key and every value seen for it, in input order.
pub type Group = (Key, Vec<String>);
