#![forbid(unsafe_code)]
//! regroup-io: everything that touches the filesystem.
//!
//! Two concerns live here: the line-oriented sorted-run format
//! (`RunWriter`/`RunReader`) and the per-request `Workspace` directory that
//! owns every run file from the first spill until the terminal cleanup.
//! Runs are written once and read once; no file is ever accessed concurrently.

pub mod run;
pub mod workspace;

pub use run::{RunReader, RunWriter};
pub use workspace::Workspace;
