/// Which detection channel noticed a possible change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// Periodic stat comparison
    Poll,
    /// Native watch on the document itself
    File,
    /// Native watch on the containing directory
    Directory,
}

impl ChangeSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Poll => "poll",
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// Raw notify result tagged with the watcher it came from
pub(super) type TaggedEvent = (ChangeSource, notify::Result<notify::Event>);
