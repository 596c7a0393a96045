//! `[document]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [document]
//! path = "~/notes/shared.txt"   # Backing file (relative to the config file)
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Backing document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Path of the plain-text backing file.
    ///
    /// `~` is expanded; relative paths resolve against the config file's
    /// directory. After loading this is always absolute.
    pub path: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("document.txt"),
        }
    }
}

impl DocumentConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.path.as_os_str().is_empty() {
            diag.error("document.path", "document path must not be empty");
        } else if self.path.file_name().is_none() {
            diag.error_with_hint(
                "document.path",
                format!("`{}` does not name a file", self.path.display()),
                "point it at a file such as `notes.txt`, not a directory",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_document_config_default() {
        let config = test_parse_config("");
        assert_eq!(config.document.path, PathBuf::from("document.txt"));
    }

    #[test]
    fn test_document_config_path() {
        let config = test_parse_config("[document]\npath = \"notes/shared.md\"");
        assert_eq!(config.document.path, PathBuf::from("notes/shared.md"));
    }

    #[test]
    fn test_document_config_rejects_empty_path() {
        let config = test_parse_config("[document]\npath = \"\"");
        let mut diag = ConfigDiagnostics::new();
        config.document.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
