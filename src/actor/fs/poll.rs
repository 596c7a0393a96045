use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Cheap fingerprint of the document's on-disk state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct FileStamp {
    pub(super) modified: Option<SystemTime>,
    pub(super) len: u64,
    pub(super) exists: bool,
}

impl FileStamp {
    const MISSING: Self = Self {
        modified: None,
        len: 0,
        exists: false,
    };

    pub(super) fn read(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) => Self {
                modified: meta.modified().ok(),
                len: meta.len(),
                exists: true,
            },
            Err(_) => Self::MISSING,
        }
    }
}

/// Periodic stat comparison. Works everywhere, native watch or not.
pub(super) struct StatPoller {
    path: PathBuf,
    last: FileStamp,
}

impl StatPoller {
    /// Capture the baseline stamp now.
    pub(super) fn new(path: PathBuf) -> Self {
        let last = FileStamp::read(&path);
        Self { path, last }
    }

    /// Re-stat the file. Returns `true` when the stamp moved.
    pub(super) fn check(&mut self) -> bool {
        let stamp = FileStamp::read(&self.path);
        if stamp == self.last {
            return false;
        }

        crate::debug!(
            "watch";
            "poll: {} changed (exists: {}, len: {} -> {})",
            self.path.display(), stamp.exists, self.last.len, stamp.len
        );
        self.last = stamp;
        true
    }
}
