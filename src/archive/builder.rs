use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tokio::process::Command as TarCommand;
use tracing::{debug, warn};

use crate::protocol::types::StoreError;
use crate::routing::table::extension_of;

/// Packs all files of one extension class under the storage root.
pub struct ArchiveBuilder {
    storage_root: PathBuf,
}

impl ArchiveBuilder {
    pub fn new(storage_root: PathBuf) -> Self {
        Self { storage_root }
    }

    /// Builds `<ext>files.tar` from every matching file under the root.
    ///
    /// The matching-file scan runs first so an extension with no files is a
    /// precise `NoMatchingFiles` instead of an empty or invalid archive.
    pub async fn build(&self, extension: &str) -> Result<(String, Vec<u8>), StoreError> {
        let ext = extension.trim_start_matches('.');
        let matches = self.collect_matching(ext).await?;
        if matches.is_empty() {
            return Err(StoreError::NoMatchingFiles(format!(".{}", ext)));
        }

        debug!(ext, count = matches.len(), "packing archive");

        let mut command = TarCommand::new("tar");
        command.arg("-cf").arg("-").arg("-C").arg(&self.storage_root);
        // A stored name may start with a dash; never let tar read one as an
        // option.
        command.arg("--");
        for path in &matches {
            command.arg(path);
        }

        let output = command
            .output()
            .await
            .map_err(|e| StoreError::BuildFailed(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(ext, %stderr, "tar exited with failure");
            return Err(StoreError::BuildFailed(stderr.trim().to_string()));
        }

        Ok((format!("{}files.tar", ext), output.stdout))
    }

    /// Walks the storage root and collects matching files, relative to the
    /// root so the archive extracts with the node-local layout.
    async fn collect_matching(&self, ext: &str) -> Result<Vec<String>, StoreError> {
        let mut stack = vec![self.storage_root.clone()];
        let mut found = Vec::new();

        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StoreError::Io {
                        path: dir.display().to_string(),
                        source: e,
                    })
                }
            };

            while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::Io {
                path: dir.display().to_string(),
                source: e,
            })? {
                let file_type = entry.file_type().await.map_err(|e| StoreError::Io {
                    path: entry.path().display().to_string(),
                    source: e,
                })?;

                if file_type.is_dir() {
                    stack.push(entry.path());
                    continue;
                }
                if !file_type.is_file() {
                    continue;
                }

                let name = entry.file_name().to_string_lossy().into_owned();
                if extension_of(&name) != Some(ext) {
                    continue;
                }
                if let Ok(relative) = entry.path().strip_prefix(&self.storage_root) {
                    found.push(relative.display().to_string());
                }
            }
        }

        found.sort();
        Ok(found)
    }
}
