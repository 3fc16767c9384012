#![forbid(unsafe_code)]
//! regroup: external-memory group-by-key over bounded-memory streams.
//!
//! Feed it any finite stream of `(key, value)` pairs and a memory budget and
//! it returns a lazy stream of `(key, values)` groups in ascending key order,
//! with each group's values in input order. Inputs larger than the in-memory
//! threshold are chunked into sorted runs on disk and reduced with cascading
//! k-way merges; the temporary files live in a per-request workspace that is
//! removed when the result is exhausted.
//!
//! ```
//! use regroup::{group_by, GroupByConfig};
//!
//! let pairs = vec![(1, 0), (0, 1), (1, 2), (5, 7)];
//! let groups: Vec<_> = group_by(pairs, GroupByConfig::default())
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(
//!     groups,
//!     vec![
//!         (0, vec!["1".to_string()]),
//!         (1, vec!["0".to_string(), "2".to_string()]),
//!         (5, vec!["7".to_string()]),
//!     ]
//! );
//! ```

pub use regroup_core::{EngineStats, Error, Group, GroupByConfig, Key, Limits, Result};
pub use regroup_engine::{group_by, DiskGroupIter, GroupByEngine, GroupIterator, MemoryGroupIter};
pub use regroup_io::{RunReader, RunWriter, Workspace};
pub use regroup_operators::{KWayMerger, RunAccumulator};
