//! File access for the render pipeline
//!
//! The gateway is the only component that touches storage during a render
//! pass. A missing or unreadable file is reported as a value, logged with
//! the file id and URI, and never aborts the pass.

use super::traits::FileStorage;
use super::types::{FileItem, StorageError, StorageResult};

/// Reads field files through a storage backend
///
/// # Examples
///
/// ```rust
/// use acton_svg::storage::{FileGateway, FileItem, MemoryFileStorage, StorageError};
///
/// # async fn example() {
/// let storage = MemoryFileStorage::new();
/// storage.insert("public://logo.svg", "image/svg+xml", b"<svg/>".to_vec());
/// let gateway = FileGateway::new(storage);
///
/// let logo = FileItem::new("1", "public://logo.svg", "logo.svg", "image/svg+xml");
/// assert_eq!(gateway.read(&logo).await.unwrap(), b"<svg/>");
///
/// let missing = FileItem::new("2", "public://gone.svg", "gone.svg", "image/svg+xml");
/// assert!(matches!(gateway.read(&missing).await, Err(StorageError::NotFound(_))));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileGateway<S> {
    storage: S,
    max_bytes: Option<u64>,
}

impl<S: FileStorage> FileGateway<S> {
    /// Creates a gateway without a size limit
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            max_bytes: None,
        }
    }

    /// Rejects files larger than `max_bytes`
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Returns the underlying storage backend
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the file content, reading it on first access
    ///
    /// Content is stored into the item, so repeated reads within a render
    /// pass hit storage once.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for missing files,
    /// `StorageError::FileSizeExceeded` above the size limit, or any other
    /// backend error. Every failure is logged with `file_id` and `file_uri`.
    pub async fn read<'a>(&self, file: &'a FileItem) -> StorageResult<&'a [u8]> {
        if let Some(data) = file.content() {
            return Ok(data);
        }

        match self.fetch(&file.uri).await {
            Ok(data) => Ok(file.store_content(data)),
            Err(error) => {
                tracing::warn!(
                    file_id = %file.id,
                    file_uri = %file.uri,
                    %error,
                    "Image file is missing or unreadable"
                );
                Err(error)
            }
        }
    }

    /// Resolves the public URL of a file
    ///
    /// Returns `None` (and logs) when the backend cannot produce one.
    pub async fn url(&self, file: &FileItem) -> Option<String> {
        match self.storage.url(&file.uri).await {
            Ok(url) => Some(url),
            Err(error) => {
                tracing::warn!(
                    file_id = %file.id,
                    file_uri = %file.uri,
                    %error,
                    "Could not resolve file URL"
                );
                None
            }
        }
    }

    async fn fetch(&self, uri: &str) -> StorageResult<Vec<u8>> {
        let data = self.storage.retrieve(uri).await?;

        if let Some(limit) = self.max_bytes {
            let actual = data.len() as u64;
            if actual > limit {
                return Err(StorageError::FileSizeExceeded { actual, limit });
            }
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::MockFileStorage;
    use crate::storage::MemoryFileStorage;

    fn svg_item(uri: &str) -> FileItem {
        FileItem::new("10", uri, "logo.svg", "image/svg+xml")
    }

    #[tokio::test]
    async fn test_read_loads_once() {
        let mut storage = MockFileStorage::new();
        storage
            .expect_retrieve()
            .times(1)
            .returning(|_| Ok(b"<svg/>".to_vec()));
        let gateway = FileGateway::new(storage);
        let file = svg_item("public://logo.svg");

        assert_eq!(gateway.read(&file).await.unwrap(), b"<svg/>");
        assert_eq!(gateway.read(&file).await.unwrap(), b"<svg/>");
        assert!(file.is_loaded());
    }

    #[tokio::test]
    async fn test_missing_file_returns_not_found_without_bytes() {
        let gateway = FileGateway::new(MemoryFileStorage::new());
        let file = svg_item("public://missing.svg");

        let result = gateway.read(&file).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(!file.is_loaded());
    }

    #[tokio::test]
    async fn test_io_error_is_reported() {
        let mut storage = MockFileStorage::new();
        storage.expect_retrieve().returning(|_| {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        });
        let gateway = FileGateway::new(storage);
        let file = svg_item("public://locked.svg");

        assert!(matches!(gateway.read(&file).await, Err(StorageError::Io(_))));
        assert_eq!(file.content(), None);
    }

    #[tokio::test]
    async fn test_size_limit() {
        let storage = MemoryFileStorage::new();
        storage.insert("public://big.svg", "image/svg+xml", vec![b' '; 64]);
        let gateway = FileGateway::new(storage).with_max_bytes(16);
        let file = svg_item("public://big.svg");

        assert!(matches!(
            gateway.read(&file).await,
            Err(StorageError::FileSizeExceeded { actual: 64, limit: 16 })
        ));
        assert!(!file.is_loaded());
    }

    #[tokio::test]
    async fn test_url_failure_is_none() {
        let gateway = FileGateway::new(MemoryFileStorage::new());
        assert_eq!(gateway.url(&svg_item("public://missing.svg")).await, None);
    }
}
