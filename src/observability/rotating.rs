//! Append-only line writer with numbered size rotation.
//!
//! When the active file grows past the size limit it becomes `<file>.1`, the
//! previous `<file>.1` becomes `<file>.2`, and so on; the oldest backup beyond
//! the retention count is deleted.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Default rotation threshold (10 MB).
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated files kept.
pub const DEFAULT_BACKUPS: usize = 3;

pub struct RotatingWriter {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: Mutex<Option<File>>,
}

impl RotatingWriter {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self::with_limits(path, DEFAULT_MAX_BYTES, DEFAULT_BACKUPS)
    }

    #[must_use]
    pub fn with_limits(path: PathBuf, max_bytes: u64, backups: usize) -> Self {
        Self {
            path,
            max_bytes,
            backups,
            file: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `line` plus a newline, rotating first if the file is full.
    ///
    /// # Errors
    ///
    /// Any I/O error from rotating, opening or writing the file.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);

        let full = fs::metadata(&self.path).is_ok_and(|meta| meta.len() >= self.max_bytes);
        if full {
            *file = None;
            self.rotate()?;
        }

        if file.is_none() {
            *file = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        let Some(handle) = file.as_mut() else {
            return Err(io::Error::other("trace file unavailable"));
        };

        writeln!(handle, "{line}")?;
        handle.flush()
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&self) -> io::Result<()> {
        if self.backups == 0 {
            return fs::remove_file(&self.path);
        }

        let oldest = self.backup_path(self.backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))
    }
}

impl std::fmt::Debug for RotatingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingWriter")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("backups", &self.backups)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_default()
    }

    #[test]
    fn appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingWriter::new(dir.path().join("spans.json"));
        writer.write_line("a").unwrap();
        writer.write_line("b").unwrap();
        assert_eq!(read(writer.path()), "a\nb\n");
    }

    #[test]
    fn rotates_into_numbered_backups_and_drops_the_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spans.json");
        // Every line is 2 bytes, so each write after the first rotates.
        let writer = RotatingWriter::with_limits(path.clone(), 2, 2);

        for line in ["1", "2", "3", "4"] {
            writer.write_line(line).unwrap();
        }

        assert_eq!(read(&path), "4\n");
        assert_eq!(read(&dir.path().join("spans.json.1")), "3\n");
        assert_eq!(read(&dir.path().join("spans.json.2")), "2\n");
        assert!(!dir.path().join("spans.json.3").exists());
    }
}
