use std::path::{Path, PathBuf};

use crate::protocol::types::StoreError;

/// The logical root every client-visible path must start with.
pub const NAMESPACE_ROOT: &str = "~store";

/// Checks that a logical path is inside the shared namespace without touching
/// the filesystem. Used by the router so invalid paths are rejected before
/// any I/O or forwarding is attempted.
pub fn validate(logical: &str) -> Result<(), StoreError> {
    segments_of(logical)?;
    Ok(())
}

/// Rewrites a logical path into this node's local filesystem path.
///
/// The namespace root segment is replaced by `storage_root`; the remainder is
/// preserved unchanged. Empty segments collapse, and `.`/`..` segments are
/// rejected so the result is always strictly inside `storage_root`.
pub fn translate(storage_root: &Path, logical: &str) -> Result<PathBuf, StoreError> {
    let mut local = storage_root.to_path_buf();
    for segment in segments_of(logical)? {
        local.push(segment);
    }
    Ok(local)
}

fn segments_of(logical: &str) -> Result<Vec<&str>, StoreError> {
    let rest = match logical.strip_prefix(NAMESPACE_ROOT) {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => return Err(StoreError::InvalidPath(logical.to_string())),
    };

    let mut segments = Vec::new();
    for segment in rest.split('/') {
        if segment.is_empty() {
            continue;
        }
        if segment == "." || segment == ".." {
            return Err(StoreError::InvalidPath(logical.to_string()));
        }
        segments.push(segment);
    }
    Ok(segments)
}

/// Checks that a client-supplied file name is a single path segment.
///
/// The stored name is joined under an already-translated directory, so any
/// separator or dot-segment in it would bypass the containment that
/// [`translate`] enforces on the directory part.
pub fn validate_file_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(StoreError::InvalidPath(name.to_string()));
    }
    Ok(())
}

/// The final segment of a logical path, used as the on-disk file name when a
/// client downloads without giving one.
pub fn basename(logical: &str) -> &str {
    logical.rsplit('/').next().unwrap_or(logical)
}
