//! In-memory storage implementation

use super::traits::FileStorage;
use super::types::{StorageError, StorageResult, StoredFile};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct MemoryEntry {
    content_type: String,
    data: Vec<u8>,
}

/// In-memory storage backend
///
/// Cloning is cheap and clones share the same files, so one handle can be
/// given to a formatter while another keeps inserting.
///
/// # Examples
///
/// ```rust
/// use acton_svg::storage::{FileStorage, MemoryFileStorage};
///
/// # async fn example() -> anyhow::Result<()> {
/// let storage = MemoryFileStorage::new();
/// storage.insert("public://logo.svg", "image/svg+xml", b"<svg/>".to_vec());
///
/// assert!(storage.exists("public://logo.svg").await?);
/// assert_eq!(storage.url("public://logo.svg").await?, "/files/logo.svg");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFileStorage {
    files: Arc<RwLock<HashMap<String, MemoryEntry>>>,
    public_url: String,
}

impl Default for MemoryFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileStorage {
    /// Creates an empty store serving files under `/files`
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            public_url: "/files".to_string(),
        }
    }

    /// Sets the URL prefix files are served under
    #[must_use]
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into();
        self
    }

    /// Adds or replaces a file
    pub fn insert(&self, uri: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) {
        self.files.write().insert(
            uri.into(),
            MemoryEntry {
                content_type: content_type.into(),
                data,
            },
        );
    }

    /// Removes a file, returning whether it was present
    pub fn remove(&self, uri: &str) -> bool {
        self.files.write().remove(uri).is_some()
    }

    /// Number of stored files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether the store holds no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    fn path_of(uri: &str) -> &str {
        uri.split_once("://").map_or(uri, |(_, path)| path)
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn retrieve(&self, uri: &str) -> StorageResult<Vec<u8>> {
        self.files
            .read()
            .get(uri)
            .map(|entry| entry.data.clone())
            .ok_or_else(|| StorageError::NotFound(uri.to_string()))
    }

    async fn exists(&self, uri: &str) -> StorageResult<bool> {
        Ok(self.files.read().contains_key(uri))
    }

    async fn url(&self, uri: &str) -> StorageResult<String> {
        if !self.files.read().contains_key(uri) {
            return Err(StorageError::NotFound(uri.to_string()));
        }
        Ok(format!(
            "{}/{}",
            self.public_url.trim_end_matches('/'),
            Self::path_of(uri)
        ))
    }

    async fn get_metadata(&self, uri: &str) -> StorageResult<StoredFile> {
        let files = self.files.read();
        let entry = files
            .get(uri)
            .ok_or_else(|| StorageError::NotFound(uri.to_string()))?;
        let path = Self::path_of(uri);
        let filename = path.rsplit('/').next().unwrap_or(path);

        Ok(StoredFile::new(
            uri,
            filename,
            &entry.content_type,
            entry.data.len() as u64,
            uri,
        ))
    }
}
