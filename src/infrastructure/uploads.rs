//! Photo persistence under the configured upload directory

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::UploadsConfig;
use crate::shared::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct PhotoStorage {
    dir: PathBuf,
    max_file_size: usize,
}

impl PhotoStorage {
    pub fn new(dir: impl Into<PathBuf>, max_file_size: usize) -> Self {
        Self {
            dir: dir.into(),
            max_file_size,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` as `photo_<owner_id><ext>` and returns the file name.
    ///
    /// `original_name` only contributes its extension.
    pub async fn save(
        &self,
        owner_id: &str,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> DomainResult<String> {
        let file_name = format!("photo_{}{}", owner_id, extension_of(original_name));
        let path = self.dir.join(&file_name);

        let written = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, bytes).await
        }
        .await;

        if let Err(e) = written {
            error!(path = %path.display(), error = %e, "Photo write failed");
            return Err(DomainError::from(e));
        }
        info!(path = %path.display(), size = bytes.len(), "Photo stored");
        Ok(file_name)
    }
}

impl From<&UploadsConfig> for PhotoStorage {
    fn from(config: &UploadsConfig) -> Self {
        Self::new(config.dir.clone(), config.max_file_size)
    }
}

/// `.ext` of the uploaded file name, or empty.
fn extension_of(name: Option<&str>) -> String {
    name.and_then(|n| Path::new(n).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_handling() {
        assert_eq!(extension_of(Some("me.JPG")), ".JPG");
        assert_eq!(extension_of(Some("archive.tar.gz")), ".gz");
        assert_eq!(extension_of(Some("noext")), "");
        assert_eq!(extension_of(Some("evil.p/hp")), "");
        assert_eq!(extension_of(None), "");
    }

    #[tokio::test]
    async fn saves_under_owner_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PhotoStorage::new(dir.path().join("uploads"), 1_000);

        let name = storage.save("b1", Some("cover.png"), b"png").await.unwrap();
        assert_eq!(name, "photo_b1.png");
        let stored = std::fs::read(dir.path().join("uploads").join(&name)).unwrap();
        assert_eq!(stored, b"png");
    }

    #[tokio::test]
    async fn unwritable_directory_is_upload_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let storage = PhotoStorage::new(blocker.join("uploads"), 1_000);

        let err = storage.save("b1", Some("a.png"), b"png").await.unwrap_err();
        assert_eq!(err, DomainError::Upload("Problem with file upload".into()));
    }
}
