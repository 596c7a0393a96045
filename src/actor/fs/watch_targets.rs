use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::types::{ChangeSource, TaggedEvent};

/// Native watch consistency manager.
///
/// Responsibility:
/// - Watch the document itself and its containing directory
/// - Re-attach the file watch after the file is replaced or recreated
///
/// Either channel may be unavailable; the stat poll covers for it.
pub(super) struct WatchTargets {
    file: PathBuf,
    dir: Option<PathBuf>,
    file_watcher: Option<RecommendedWatcher>,
    dir_watcher: Option<RecommendedWatcher>,
    file_attached: bool,
    dir_attached: bool,
}

impl WatchTargets {
    /// Channels that are not requested. Only polling will run.
    pub(super) fn disabled(file: PathBuf) -> Self {
        Self {
            dir: file.parent().map(Path::to_path_buf),
            file,
            file_watcher: None,
            dir_watcher: None,
            file_attached: false,
            dir_attached: false,
        }
    }

    /// Create both native watchers and attach whatever currently exists.
    pub(super) fn attach(file: PathBuf, tx: &Sender<TaggedEvent>) -> Self {
        let mut targets = Self::disabled(file);
        targets.file_watcher = create_watcher(ChangeSource::File, tx);
        targets.dir_watcher = create_watcher(ChangeSource::Directory, tx);
        targets.maintain();
        targets
    }

    /// The file watch points at a vanished inode; re-attach on next maintain.
    pub(super) fn mark_stale(&mut self) {
        self.file_attached = false;
    }

    pub(super) fn is_native_active(&self) -> bool {
        self.file_attached || self.dir_attached
    }

    pub(super) fn maintain(&mut self) {
        if let Some(watcher) = self.file_watcher.as_mut()
            && !self.file_attached
            && self.file.exists()
        {
            self.file_attached = rewatch(watcher, &self.file);
        }

        // Drop stale handle if the directory itself went away
        if self.dir_attached && self.dir.as_deref().is_some_and(|d| !d.exists()) {
            self.dir_attached = false;
        }
        if let (Some(watcher), Some(dir)) = (self.dir_watcher.as_mut(), self.dir.as_deref())
            && !self.dir_attached
            && dir.exists()
        {
            self.dir_attached = rewatch(watcher, dir);
        }
    }
}

fn create_watcher(source: ChangeSource, tx: &Sender<TaggedEvent>) -> Option<RecommendedWatcher> {
    let tx = tx.clone();
    match notify::recommended_watcher(move |res| {
        let _ = tx.send((source, res));
    }) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            crate::log!("watch"; "{} watch unavailable, relying on polling: {}", source.label(), e);
            None
        }
    }
}

fn rewatch(watcher: &mut RecommendedWatcher, path: &Path) -> bool {
    let _ = watcher.unwatch(path);
    match watcher.watch(path, RecursiveMode::NonRecursive) {
        Ok(()) => {
            crate::debug!("watch"; "attached watch: {}", path.display());
            true
        }
        Err(e) => {
            crate::debug!("watch"; "cannot watch {}: {}", path.display(), e);
            false
        }
    }
}

/// Outcome of a native event that concerns the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Relevant {
    /// The file may have been swapped out from under the file watch
    pub(super) reattach: bool,
}

/// Decide whether a native event may have changed the document.
///
/// Access and metadata-only events are noise. Directory events only count
/// when one of their paths names the document.
pub(super) fn classify(source: ChangeSource, event: &Event, file_name: &OsString) -> Option<Relevant> {
    let reattach = match event.kind {
        EventKind::Access(_) | EventKind::Modify(ModifyKind::Metadata(_)) => return None,
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => {
            true
        }
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => false,
    };

    if source == ChangeSource::Directory
        && !event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
    {
        return None;
    }

    crate::debug!("watch"; "{} event: {:?}", source.label(), event.kind);
    Some(Relevant { reattach })
}
