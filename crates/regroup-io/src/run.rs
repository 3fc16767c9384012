//! The sorted-run file format.
//!
//! A run is UTF-8 text, two lines per entry: the decimal key, then the
//! entry's values joined by single spaces. Keys are strictly increasing
//! within a run, each key appears once, and a values line is never empty.
//! EOF marks the end of the run.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use regroup_core::error::{Error, Result};
use regroup_core::types::Key;

/// Streaming writer for one run file.
///
/// Callers must feed entries in ascending-key order with no duplicates;
/// the writer does not re-sort.
pub struct RunWriter {
    out: BufWriter<File>,
}

impl RunWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    /// Append one entry. The values list must be non-empty.
    pub fn write_group(&mut self, key: Key, values: &[String]) -> Result<()> {
        debug_assert!(!values.is_empty(), "a run entry needs at least one value");
        writeln!(self.out, "{key}")?;
        writeln!(self.out, "{}", values.join(" "))?;
        Ok(())
    }

    /// Flush buffered entries. The file is well-formed once this returns;
    /// fsync is not required.
    pub fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Cursor over one run file.
///
/// `open` primes the first key; `peek_key` exposes it without consuming;
/// `next_values` consumes the current entry's values and advances the cursor
/// to the following key. Assumes the file was produced by [`RunWriter`].
pub struct RunReader {
    path: PathBuf,
    input: BufReader<File>,
    line: u64,
    current_key: Option<Key>,
}

impl RunReader {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        let mut reader = Self {
            path,
            input: BufReader::new(file),
            line: 0,
            current_key: None,
        };
        reader.current_key = reader.read_key_line()?;
        Ok(reader)
    }

    /// Key of the entry the cursor is on, or `None` at end of run.
    pub fn peek_key(&self) -> Option<Key> {
        self.current_key
    }

    /// Consume the current entry's values and advance to the next key.
    pub fn next_values(&mut self) -> Result<Vec<String>> {
        debug_assert!(self.current_key.is_some(), "cursor already at end of run");
        let line = match self.read_line()? {
            Some(line) => line,
            None => return Err(self.corrupt("entry is missing its values line")),
        };
        let values: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if values.is_empty() {
            return Err(self.corrupt("entry has an empty values list"));
        }
        self.current_key = self.read_key_line()?;
        Ok(values)
    }

    fn read_key_line(&mut self) -> Result<Option<Key>> {
        let line = match self.read_line()? {
            Some(line) => line,
            None => return Ok(None),
        };
        match line.trim().parse::<Key>() {
            Ok(key) => Ok(Some(key)),
            Err(_) => Err(self.corrupt(&format!("expected a decimal key, got {line:?}"))),
        }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    fn corrupt(&self, reason: &str) -> Error {
        Error::CorruptRun {
            path: self.path.clone(),
            line: self.line,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_run(dir: &tempfile::TempDir, name: &str, entries: &[(Key, &[&str])]) -> PathBuf {
        let path = dir.path().join(name);
        let mut writer = RunWriter::create(&path).unwrap();
        for (key, values) in entries {
            let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            writer.write_group(*key, &values).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_run(&dir, "run", &[(-3, &["a"]), (0, &["b", "c"]), (7, &["d"])]);

        let mut reader = RunReader::open(&path).unwrap();
        assert_eq!(reader.peek_key(), Some(-3));
        assert_eq!(reader.next_values().unwrap(), vec!["a"]);
        assert_eq!(reader.peek_key(), Some(0));
        assert_eq!(reader.next_values().unwrap(), vec!["b", "c"]);
        assert_eq!(reader.peek_key(), Some(7));
        assert_eq!(reader.next_values().unwrap(), vec!["d"]);
        assert_eq!(reader.peek_key(), None);
    }

    #[test]
    fn two_lines_per_entry_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_run(&dir, "run", &[(1, &["x", "y"]), (2, &["z"])]);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1\nx y\n2\nz\n");
    }

    #[test]
    fn bad_key_line_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run");
        std::fs::write(&path, "not-a-key\nv\n").unwrap();
        match RunReader::open(&path) {
            Err(Error::CorruptRun { line, .. }) => assert_eq!(line, 1),
            Err(other) => panic!("expected CorruptRun, got {other:?}"),
            Ok(_) => panic!("expected CorruptRun, got a reader"),
        }
    }

    #[test]
    fn missing_values_line_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run");
        std::fs::write(&path, "5\n").unwrap();
        let mut reader = RunReader::open(&path).unwrap();
        assert_eq!(reader.peek_key(), Some(5));
        assert!(matches!(
            reader.next_values(),
            Err(Error::CorruptRun { .. })
        ));
    }

    #[test]
    fn empty_values_line_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run");
        std::fs::write(&path, "5\n\n").unwrap();
        let mut reader = RunReader::open(&path).unwrap();
        assert!(matches!(
            reader.next_values(),
            Err(Error::CorruptRun { .. })
        ));
    }
}
