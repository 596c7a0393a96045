//! Persistence adapter for the backing file.
//!
//! Memory is authoritative; the file is a best-effort copy:
//! - reads that fail for any reason (missing, unreadable, not UTF-8) yield `""`
//! - writes go through a temp file + rename so readers never see a torn file
//! - a symlinked document is written through the link, keeping its mode
//! - async reads run on the blocking pool under a timeout and resolve as
//!   empty when the filesystem is stuck
//! - an async write settles only once the blocking writer has returned; the
//!   timeout is reported but never lets a second writer start alongside it

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Persistence failures. Logged by the caller, never surfaced to writers.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("`{0}` did not respond within {1:?}")]
    Timeout(PathBuf, Duration),

    #[error("persistence worker failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Reads and writes one backing file. Holds no document state.
#[derive(Debug, Clone)]
pub struct Persistence {
    path: PathBuf,
    timeout: Duration,
}

impl Persistence {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. Any failure is reported as empty content.
    pub fn load(&self) -> String {
        read_document(&self.path).unwrap_or_else(|e| {
            crate::debug!("persist"; "read {} failed, treating as empty: {}", self.path.display(), e);
            String::new()
        })
    }

    /// Atomically replace the document with `content`.
    pub fn write(&self, content: &str) -> Result<(), PersistError> {
        write_atomic(&self.path, content).map_err(|e| PersistError::Io(self.path.clone(), e))
    }

    /// [`load`](Self::load) on the blocking pool, bounded by the timeout.
    pub async fn load_async(&self) -> String {
        let this = self.clone();
        match tokio::time::timeout(self.timeout, tokio::task::spawn_blocking(move || this.load()))
            .await
        {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                crate::log!("persist"; "read worker failed, treating as empty: {}", e);
                String::new()
            }
            Err(_) => {
                crate::log!("persist"; "read of {} timed out, treating as empty", self.path.display());
                String::new()
            }
        }
    }

    /// [`write`](Self::write) on the blocking pool.
    ///
    /// Resolves when the write has finished. Past the timeout a slow write is
    /// logged and still awaited: the blocking task cannot be cancelled, and
    /// abandoning it would let the next write race it.
    pub async fn save(&self, content: String) -> Result<(), PersistError> {
        let this = self.clone();
        let mut task = tokio::task::spawn_blocking(move || this.write(&content));
        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(joined) => joined?,
            Err(_) => {
                let slow = PersistError::Timeout(self.path.clone(), self.timeout);
                crate::log!("persist"; "{}, waiting for it to finish", slow);
                task.await?
            }
        }
    }
}

fn read_document(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Temp file next to `path`, hidden so editors and listings skip it.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.syncpad.tmp"))
}

/// File the bytes actually live in: symlinks resolved, or `path` itself
/// when it does not exist yet.
fn write_target(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Write to a sibling temp file, fsync, then rename over the target.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let target = write_target(path);
    let tmp = temp_path(&target);
    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        if let Ok(meta) = fs::metadata(&target) {
            fs::set_permissions(&tmp, meta.permissions())?;
        }
        fs::rename(&tmp, &target)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
