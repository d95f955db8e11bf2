use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tracing::debug;

use super::namespace;
use crate::protocol::types::{NodeRole, StoreError};
use crate::routing::table::extension_of;

/// The file operations one node performs against its own storage root.
///
/// Every role runs the same handler; the router decides which node a command
/// reaches, the handler only touches the local filesystem.
pub struct NodeHandler {
    role: NodeRole,
    storage_root: PathBuf,
}

impl NodeHandler {
    pub fn new(role: NodeRole, storage_root: PathBuf) -> Self {
        Self { role, storage_root }
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Writes `data` as `name` under the logical destination directory,
    /// creating missing parents and overwriting an existing file.
    ///
    /// Known limitation: a write that fails midway leaves no guarantee about
    /// partial content on disk; the failure is reported, not repaired.
    pub async fn store(&self, dest: &str, name: &str, data: &[u8]) -> Result<(), StoreError> {
        namespace::validate_file_name(name)?;
        let dir = namespace::translate(&self.storage_root, dest)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::WriteFailed(dest.to_string(), e.to_string()))?;

        let target = dir.join(name);
        fs::write(&target, data)
            .await
            .map_err(|e| StoreError::WriteFailed(format!("{}/{}", dest, name), e.to_string()))?;

        debug!(role = %self.role, name, dest, bytes = data.len(), "stored file");
        Ok(())
    }

    /// Reads the file at the logical path, returning its basename and bytes.
    pub async fn retrieve(&self, logical: &str) -> Result<(String, Vec<u8>), StoreError> {
        let local = namespace::translate(&self.storage_root, logical)?;
        let meta = fs::metadata(&local)
            .await
            .map_err(|e| io_error(logical, e))?;
        if meta.is_dir() {
            return Err(StoreError::IsDirectory(logical.to_string()));
        }

        let data = fs::read(&local).await.map_err(|e| io_error(logical, e))?;
        debug!(role = %self.role, logical, bytes = data.len(), "retrieved file");
        Ok((namespace::basename(logical).to_string(), data))
    }

    /// Removes the file at the logical path. Deleting an already-deleted
    /// path reports `NotFound`; directories are never removed here.
    pub async fn delete(&self, logical: &str) -> Result<(), StoreError> {
        let local = namespace::translate(&self.storage_root, logical)?;
        let meta = fs::metadata(&local)
            .await
            .map_err(|e| io_error(logical, e))?;
        if meta.is_dir() {
            return Err(StoreError::IsDirectory(logical.to_string()));
        }

        fs::remove_file(&local)
            .await
            .map_err(|e| io_error(logical, e))?;
        debug!(role = %self.role, logical, "deleted file");
        Ok(())
    }

    /// Non-recursive listing of regular files under the logical directory,
    /// filtered to `extension` when given, sorted by name.
    ///
    /// A directory this node never created simply holds nothing, so a missing
    /// path lists as empty rather than failing.
    pub async fn list_matching(
        &self,
        logical: &str,
        extension: Option<&str>,
    ) -> Result<Vec<String>, StoreError> {
        let local = namespace::translate(&self.storage_root, logical)?;
        let mut entries = match fs::read_dir(&local).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(logical, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(logical, e))?
        {
            let file_type = entry.file_type().await.map_err(|e| io_error(logical, e))?;
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match extension {
                Some(ext) if extension_of(&name) != Some(ext) => continue,
                _ => files.push(name),
            }
        }

        files.sort();
        Ok(files)
    }
}

fn io_error(logical: &str, e: std::io::Error) -> StoreError {
    match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound(logical.to_string()),
        ErrorKind::PermissionDenied => StoreError::PermissionDenied(logical.to_string()),
        _ => StoreError::Io {
            path: logical.to_string(),
            source: e,
        },
    }
}
