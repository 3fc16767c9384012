use std::path::PathBuf;

use thiserror::Error;

/// Canonical result for the whole workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Every fault is terminal: the engine removes the request workspace and
/// surfaces the error to the caller. There is no retry policy.
///
/// Iterator exhaustion is not represented here; `Iterator::next` returning
/// `None` is the end-of-stream signal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt run {}:{line}: {reason}", path.display())]
    CorruptRun {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("cannot reduce {num_files} runs: max_num_files={max_num_files} must be at least 2")]
    MergeNotPossible {
        num_files: usize,
        max_num_files: usize,
    },
}
