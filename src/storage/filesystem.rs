use crate::dicom::DicomFile;
use crate::storage::{validate_id, FileStore, StorageError, StorageResult, DEFAULT_STORE_PATH};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Filesystem-based file store
///
/// Each file is one flat file under the root directory, named by its id.
/// The root is created on first write, not on construction.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root_path: PathBuf,
}

impl FilesystemStore {
    pub fn new<P: AsRef<Path>>(root_path: P) -> Self {
        // Keep the path verbatim; canonicalizing resolves symlinks such as
        // /var -> /private/var on macOS.
        Self {
            root_path: root_path.as_ref().to_path_buf(),
        }
    }

    pub fn with_default_path() -> Self {
        Self::new(DEFAULT_STORE_PATH)
    }

    pub fn base_path(&self) -> &Path {
        &self.root_path
    }

    fn file_path(&self, id: &str) -> StorageResult<PathBuf> {
        validate_id(id)?;
        Ok(self.root_path.join(id))
    }
}

#[async_trait]
impl FileStore for FilesystemStore {
    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn get(&self, id: &str) -> StorageResult<DicomFile> {
        let path = self.file_path(id)?;
        let content = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(id.to_string()),
            _ => StorageError::Io(e),
        })?;

        tracing::debug!("loaded {} ({} bytes) from {}", id, content.len(), path.display());
        Ok(DicomFile::new(id, content.len() as u64, content))
    }

    async fn create(&self, file: &DicomFile) -> StorageResult<()> {
        let path = self.file_path(file.id())?;
        tokio::fs::create_dir_all(&self.root_path).await?;
        tokio::fs::write(&path, file.content()).await?;

        tracing::debug!("stored {} ({} bytes) at {}", file.id(), file.size(), path.display());
        Ok(())
    }
}
