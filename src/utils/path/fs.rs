//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve relative paths against a base directory
//! - `expand_path` - `~` expansion for user-supplied paths

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// The backing document may not exist yet, so the fallback matters here:
/// the parent directory is canonicalized when possible and the file name
/// re-attached.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && !parent.as_os_str().is_empty()
        && let Ok(parent) = parent.canonicalize()
    {
        return parent.join(name);
    }

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    }
}

/// Resolve a path relative to `base_dir` unless it is already absolute.
///
/// Always returns an absolute path when `base_dir` is absolute.
#[inline]
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    normalize_path(&base_dir.join(path))
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths that are not valid UTF-8 or have no tilde are returned unchanged.
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_missing_file_in_existing_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("not-yet.txt");
        let normalized = normalize_path(&missing);
        assert_eq!(normalized.file_name().unwrap(), "not-yet.txt");
        assert_eq!(
            normalized.parent().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_resolve_path_absolute() {
        let path = Path::new("/absolute/path");
        let resolved = resolve_path(path, Path::new("/base"));
        assert_eq!(resolved, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_resolve_path_relative_to_base() {
        let resolved = resolve_path(Path::new("nonexistent/doc.txt"), Path::new("/base"));
        assert_eq!(resolved, PathBuf::from("/base/nonexistent/doc.txt"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = Path::new("notes/doc.txt");
        assert_eq!(expand_path(path), PathBuf::from("notes/doc.txt"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = expand_path(Path::new("~/doc.txt"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("doc.txt"));
    }
}
