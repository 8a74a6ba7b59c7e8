//! File storage trait definitions

use super::types::{StorageResult, StoredFile};
use async_trait::async_trait;

/// Read-only abstraction over file storage backends
///
/// Field rendering only ever reads files, so the trait covers retrieval,
/// existence checks, public URL generation and metadata lookup. Files are
/// addressed by storage URI (`public://images/logo.svg`).
///
/// # Examples
///
/// ```rust,no_run
/// use acton_svg::storage::{FileStorage, LocalFileStorage};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let storage = LocalFileStorage::new(PathBuf::from("/var/www/files"))?;
///
/// let data = storage.retrieve("public://images/logo.svg").await?;
/// let url = storage.url("public://images/logo.svg").await?;
/// println!("{} bytes served from {url}", data.len());
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Retrieves the complete file data
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file doesn't exist (`StorageError::NotFound`)
    /// - The URI is not valid for this backend (`StorageError::InvalidPath`)
    /// - File I/O fails
    async fn retrieve(&self, uri: &str) -> StorageResult<Vec<u8>>;

    /// Checks if a file exists
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is invalid or the backend is unavailable
    async fn exists(&self, uri: &str) -> StorageResult<bool>;

    /// Returns a public URL for accessing the file
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist or the URI is invalid
    async fn url(&self, uri: &str) -> StorageResult<String>;

    /// Retrieves file metadata without reading the file data
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file doesn't exist (`StorageError::NotFound`)
    /// - Metadata cannot be read
    async fn get_metadata(&self, uri: &str) -> StorageResult<StoredFile>;
}
