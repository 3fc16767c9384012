#![forbid(unsafe_code)]
//! regroup-operators: the two halves of the spill-and-merge pipeline.
//!
//! `RunAccumulator` chunks the input stream into key-sorted runs on disk;
//! `KWayMerger` lazily merges any number of those runs back into one
//! key-ordered group stream. Both are synchronous and pull-based; the engine
//! crate owns the orchestration between them.

pub mod accumulator;
pub mod merge;

pub use accumulator::{DrainOutcome, RunAccumulator, PAIR_FOOTPRINT_BYTES};
pub use merge::KWayMerger;
