//! Filesystem artifact store - Implements ArtifactStorePort on a flat directory

use std::path::{Path, PathBuf};

use application::{error::ApplicationError, ports::ArtifactStorePort};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Writes scripts, audio and article dumps into one directory
#[derive(Debug, Clone)]
pub struct FilesystemArtifactStore {
    dir: PathBuf,
}

impl FilesystemArtifactStore {
    /// Store rooted at `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactStorePort for FilesystemArtifactStore {
    #[instrument(skip(self, contents), fields(bytes = contents.len()))]
    async fn save(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, ApplicationError> {
        // names come from artifact_file_name; anything path-like is a bug upstream
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(ApplicationError::Storage(format!(
                "invalid artifact name '{file_name}'"
            )));
        }

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            ApplicationError::Storage(format!(
                "Failed to create {}: {e}",
                self.dir.display()
            ))
        })?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, contents).await.map_err(|e| {
            ApplicationError::Storage(format!("Failed to write {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), "💾 Artifact saved");
        Ok(path)
    }
}
