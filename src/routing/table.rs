use crate::protocol::types::{NodeRole, StoreError};

/// The extension of the final path segment, matched exactly.
///
/// `archive.txt.bak` is a `.bak` file, not a text file; a dotless or
/// dot-leading name has no extension.
pub fn extension_of(path: &str) -> Option<&str> {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Resolves the role owning the file at `path` via the static route table.
pub fn route(path: &str) -> Result<NodeRole, StoreError> {
    match extension_of(path) {
        Some(ext) => owner_of_extension(ext),
        None => Err(StoreError::UnsupportedFileType(path.to_string())),
    }
}

/// Resolves the role owning an extension class (`.txt` and `txt` both work).
pub fn owner_of_extension(extension: &str) -> Result<NodeRole, StoreError> {
    match extension.trim_start_matches('.') {
        "c" => Ok(NodeRole::Front),
        "txt" => Ok(NodeRole::TextStore),
        "pdf" => Ok(NodeRole::DocStore),
        _ => Err(StoreError::UnsupportedFileType(extension.to_string())),
    }
}
