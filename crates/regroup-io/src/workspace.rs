//! Per-request workspace directory.
//!
//! One directory per `group_by` invocation holds every run file plus the
//! transient merge scratch file. The directory exists from creation until
//! exactly one terminal event: the fast-path return, result-iterator
//! exhaustion, or a fault. `Drop` covers abandoned iterators and error
//! unwinding with a best-effort removal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;

use regroup_core::error::Result;

/// Scratch file used while merging a group of runs; renamed into a dump slot
/// on completion, never present when the engine returns.
const SCRATCH_NAME: &str = "_merge";

pub struct Workspace {
    dir: PathBuf,
    defused: bool,
}

impl Workspace {
    /// Create the request directory under `root`.
    ///
    /// Uses `request_id` when that name is free; otherwise mints names of the
    /// form `request_<utc-timestamp-with-microseconds><random 30-bit>`, with
    /// the random suffix truncated by its last 3 digits, until `create_dir`
    /// succeeds.
    pub fn create(root: &Path, request_id: Option<&str>) -> Result<Self> {
        fs::create_dir_all(root)?;

        if let Some(id) = request_id {
            let dir = root.join(id);
            if !dir.is_dir() {
                fs::create_dir(&dir)?;
                return Ok(Self { dir, defused: false });
            }
            // Name taken: fall through and mint a fresh one.
        }

        let mut rng = rand::thread_rng();
        loop {
            let mut name = format!(
                "{}{}",
                Utc::now().format("request_%Y%m%d_%H%M%S_%6f"),
                rng.gen_range(0..(1u32 << 30)),
            );
            name.truncate(name.len() - 3);
            let dir = root.join(name);
            match fs::create_dir(&dir) {
                Ok(()) => return Ok(Self { dir, defused: false }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// The request id, i.e. the directory name.
    pub fn id(&self) -> &str {
        self.dir.file_name().and_then(|n| n.to_str()).unwrap_or("")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the run file in slot `index`.
    pub fn dump_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("dump_{index}"))
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.dir.join(SCRATCH_NAME)
    }

    /// Move the run in slot `from` into slot `to`.
    pub fn rename_run(&self, from: usize, to: usize) -> Result<()> {
        fs::rename(self.dump_path(from), self.dump_path(to))?;
        Ok(())
    }

    /// Delete the run in slot `index`.
    pub fn remove_run(&self, index: usize) -> Result<()> {
        fs::remove_file(self.dump_path(index))?;
        Ok(())
    }

    /// Rename the scratch file into dump slot `slot`.
    pub fn promote_scratch(&self, slot: usize) -> Result<()> {
        fs::rename(self.scratch_path(), self.dump_path(slot))?;
        Ok(())
    }

    /// Delete the whole directory. This is the terminal event; errors are
    /// reported to the caller.
    pub fn remove(mut self) -> Result<()> {
        self.defused = true;
        fs::remove_dir_all(&self.dir)?;
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.defused {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::create(root.path(), None).unwrap();
        let b = Workspace::create(root.path(), None).unwrap();
        assert!(a.id().starts_with("request_"));
        assert!(b.id().starts_with("request_"));
        assert_ne!(a.id(), b.id());
        assert!(a.dir().is_dir());
        assert!(b.dir().is_dir());
    }

    #[test]
    fn explicit_id_is_used_when_free() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create(root.path(), Some("my_request")).unwrap();
        assert_eq!(ws.id(), "my_request");
    }

    #[test]
    fn taken_id_falls_back_to_generated() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("my_request")).unwrap();
        let ws = Workspace::create(root.path(), Some("my_request")).unwrap();
        assert_ne!(ws.id(), "my_request");
        assert!(root.path().join("my_request").is_dir());
    }

    #[test]
    fn remove_deletes_directory() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create(root.path(), Some("gone")).unwrap();
        let dir = ws.dir().to_path_buf();
        std::fs::write(ws.dump_path(0), "1\nv\n").unwrap();
        ws.remove().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn drop_removes_directory_best_effort() {
        let root = tempfile::tempdir().unwrap();
        let dir = {
            let ws = Workspace::create(root.path(), None).unwrap();
            ws.dir().to_path_buf()
        };
        assert!(!dir.exists());
    }
}
