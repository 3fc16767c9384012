#![forbid(unsafe_code)]
//! regroup-engine: drives the spill-and-merge pipeline end to end.
//!
//! One invocation consumes one input stream exactly once and returns a lazy
//! group iterator: either a sorted in-memory view (nothing was spilled) or a
//! k-way merge over the final on-disk runs, which removes its workspace on
//! exhaustion. Strictly single-threaded and pull-based; concurrent
//! invocations are isolated by their workspace directories.

pub mod engine;
pub mod result;

pub use engine::{group_by, GroupByEngine};
pub use result::{DiskGroupIter, GroupIterator, MemoryGroupIter};
