//! Rotating file writer with size-based rotation and backup retention.
//!
//! Plugs into `tracing-subscriber`'s fmt layer through [`MakeWriter`]. When the
//! active file would grow past its size limit it is shifted to `<name>.1`,
//! older backups move up by one, and anything past the retention limit is
//! deleted.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

/// Maximum file size before rotation (10 MiB).
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of backup files to retain after rotation.
const MAX_BACKUP_FILES: usize = 3;

struct Active {
    file: Option<File>,
    size: u64,
}

/// Thread-safe rotating log file.
///
/// The file is opened lazily on the first write, so construction never fails.
///
/// # Example
///
/// ```rust
/// use std::io::Write;
/// use virtgrid::observability::RotatingFileWriter;
///
/// let dir = tempfile::tempdir()?;
/// let writer = RotatingFileWriter::new(dir.path().join("grid.log"));
/// (&writer).write_all(b"filter recomputed\n")?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    active: Mutex<Active>,
}

impl RotatingFileWriter {
    /// Creates a writer for `path` with the default limits (10 MiB, 3 backups).
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            max_bytes: MAX_FILE_SIZE_BYTES,
            max_backups: MAX_BACKUP_FILES,
            active: Mutex::new(Active { file: None, size: 0 }),
        }
    }

    /// Overrides the rotation threshold.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Overrides the number of retained backups.
    #[must_use]
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    /// Path of the active log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `n`th backup, `n >= 1`.
    #[must_use]
    pub fn backup_path(&self, n: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Active>> {
        self.active
            .lock()
            .map_err(|e| io::Error::other(format!("log writer mutex poisoned: {e}")))
    }

    fn write_locked(&self, active: &mut Active, buf: &[u8]) -> io::Result<()> {
        let incoming = buf.len() as u64;

        if active.file.is_none() {
            let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            active.size = file.metadata().map_or(0, |m| m.len());
            active.file = Some(file);
        }

        if active.size > 0 && active.size + incoming > self.max_bytes {
            active.file = None;
            self.rotate_files()?;
            active.file = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
            active.size = 0;
        }

        let file = active
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file unavailable"))?;
        file.write_all(buf)?;
        active.size += incoming;
        Ok(())
    }

    /// Shifts `<name>.n` to `<name>.n+1`, drops the oldest, and moves the
    /// active file to `<name>.1`.
    fn rotate_files(&self) -> io::Result<()> {
        if self.max_backups == 0 {
            return fs::remove_file(&self.path);
        }

        let oldest = self.backup_path(self.max_backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for n in (1..self.max_backups).rev() {
            let from = self.backup_path(n);
            if from.exists() {
                fs::rename(&from, self.backup_path(n + 1))?;
            }
        }

        if self.path.exists() {
            fs::rename(&self.path, self.backup_path(1))?;
        }
        Ok(())
    }
}

impl Write for &RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut active = self.lock()?;
        self.write_locked(&mut active, buf)?;
        drop(active);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut active = self.lock()?;
        match active.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = &'a Self;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}

impl std::fmt::Debug for RotatingFileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileWriter")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("max_backups", &self.max_backups)
            .finish_non_exhaustive()
    }
}
