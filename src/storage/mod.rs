use crate::dicom::DicomFile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod filesystem;

pub use filesystem::FilesystemStore;

/// Default root directory for stored DICOM files
pub const DEFAULT_STORE_PATH: &str = "/tmp/dicom";

/// Error type for storage operations
#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    InvalidId(String),
    Io(std::io::Error),
    Config(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound(id) => write!(f, "file was not found: {}", id),
            StorageError::InvalidId(id) => write!(f, "invalid file id: {:?}", id),
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent store for DICOM files, keyed by file id.
///
/// Implementations only move bytes; parsing and rendering stay with
/// [`DicomFile`].
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug {
    /// All stored file ids. A store that was never written to is empty.
    async fn list(&self) -> StorageResult<Vec<String>>;

    /// Load a file by id.
    ///
    /// Unknown ids give `NotFound`; ids that fail [`validate_id`] give
    /// `InvalidId` without touching storage.
    async fn get(&self, id: &str) -> StorageResult<DicomFile>;

    /// Persist the full contents of `file` under its id, replacing any
    /// existing file with the same id
    async fn create(&self, file: &DicomFile) -> StorageResult<()>;
}

/// Ids map straight onto storage keys, so they must be a single plain
/// path component.
pub fn validate_id(id: &str) -> StorageResult<()> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidId(id.to_string()))
    }
}

/// Configuration for the file store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub options: std::collections::HashMap<String, serde_json::Value>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let mut options = std::collections::HashMap::new();
        options.insert(
            "path".to_string(),
            serde_json::Value::String(DEFAULT_STORE_PATH.to_string()),
        );

        Self {
            backend: default_backend(),
            options,
        }
    }
}

fn default_backend() -> String {
    "filesystem".to_string()
}

/// Create a file store from configuration
pub fn create_file_store(config: &StorageConfig) -> StorageResult<Arc<dyn FileStore>> {
    match config.backend.as_str() {
        "filesystem" => {
            let path = config
                .options
                .get("path")
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_STORE_PATH);

            Ok(Arc::new(FilesystemStore::new(path)))
        }
        _ => Err(StorageError::Config(format!(
            "Unknown storage backend: {}",
            config.backend
        ))),
    }
}
