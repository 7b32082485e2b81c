//! Snapshot key normalization
//!
//! A snapshot key is a root-relative path with forward-slash separators, no leading
//! separator and no `.`/`..` segments. Segment bytes are kept exactly as they appear on
//! disk or in the remote listing, so a key always maps back to the same file.

use crate::error::ScanError;
use std::path::{Component, Path, PathBuf};

/// Compute the snapshot key of `path` relative to `root`.
///
/// Trailing separators on `root` are irrelevant; `Path::strip_prefix` compares components.
pub fn relative_key(root: &Path, path: &Path) -> Result<String, ScanError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        ScanError::InvalidPath(format!("{:?} is not under root {:?}", path, root))
    })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name
                    .to_str()
                    .ok_or_else(|| ScanError::NonUtf8Path(path.to_path_buf()))?;
                segments.push(name);
            }
            Component::CurDir => {}
            other => {
                return Err(ScanError::InvalidPath(format!(
                    "Unexpected component {:?} in {:?}",
                    other, path
                )))
            }
        }
    }

    if segments.is_empty() {
        return Err(ScanError::InvalidPath(format!(
            "{:?} has no path relative to root",
            path
        )));
    }

    Ok(segments.join("/"))
}

/// Check that a key received from the remote side is safe to join onto a local root.
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("empty path".to_string());
    }
    if key.starts_with('/') {
        return Err(format!("{}: absolute path", key));
    }
    if key.contains('\\') || key.contains('\0') {
        return Err(format!("{}: contains a backslash or NUL", key));
    }
    for segment in key.split('/') {
        match segment {
            "" => return Err(format!("{}: empty segment", key)),
            "." | ".." => return Err(format!("{}: relative segment {:?}", key, segment)),
            _ => {}
        }
    }
    Ok(())
}

/// Local path for a snapshot key under `root`
pub fn local_path(root: &Path, key: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in key.split('/') {
        path.push(segment);
    }
    path
}

/// Ancestor directories of `key`, nearest first (`a/b/c.txt` → `a/b`, `a`).
pub fn ancestors(key: &str) -> impl Iterator<Item = &str> {
    key.char_indices()
        .rev()
        .filter(|(_, c)| *c == '/')
        .map(move |(idx, _)| &key[..idx])
}
