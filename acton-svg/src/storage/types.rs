//! Core types for file storage

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during file storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// File not found in storage
    #[error("File not found: {0}")]
    NotFound(String),

    /// I/O error during storage operation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file URI or path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// File size exceeds limit
    #[error("File size {actual} exceeds limit of {limit} bytes")]
    FileSizeExceeded {
        /// Actual file size
        actual: u64,
        /// Maximum allowed size
        limit: u64,
    },

    /// Generic storage error
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file referenced by an image field item
///
/// The raw bytes are read lazily by the [`FileGateway`](super::FileGateway)
/// and stored exactly once; after that the item is immutable.
///
/// # Examples
///
/// ```rust
/// use acton_svg::storage::FileItem;
///
/// let file = FileItem::new("42", "public://logo.svg", "logo.svg", "image/svg+xml");
/// assert!(!file.is_loaded());
/// assert_eq!(file.extension(), Some("svg"));
/// assert_eq!(file.cache_tags(), vec!["file:42".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct FileItem {
    /// File entity identifier
    pub id: String,

    /// Storage URI (e.g. `public://images/logo.svg`)
    pub uri: String,

    /// Original filename
    pub filename: String,

    /// Declared MIME type, as recorded at upload time
    pub content_type: String,

    content: OnceCell<Vec<u8>>,
}

impl FileItem {
    /// Creates a file reference whose content has not been read yet
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        uri: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            content: OnceCell::new(),
        }
    }

    /// Attaches already-loaded content
    ///
    /// # Examples
    ///
    /// ```rust
    /// use acton_svg::storage::FileItem;
    ///
    /// let file = FileItem::new("1", "public://a.svg", "a.svg", "image/svg+xml")
    ///     .with_content(b"<svg/>".to_vec());
    /// assert_eq!(file.content(), Some(&b"<svg/>"[..]));
    /// ```
    #[must_use]
    pub fn with_content(self, data: Vec<u8>) -> Self {
        // A fresh cell cannot already be set, so the result is ignorable.
        let _ = self.content.set(data);
        self
    }

    /// Returns the loaded content, if any
    #[must_use]
    pub fn content(&self) -> Option<&[u8]> {
        self.content.get().map(Vec::as_slice)
    }

    /// Whether the content has been read
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.content.get().is_some()
    }

    /// Returns the size of the loaded content in bytes
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.content().map(|data| data.len() as u64)
    }

    /// Stores freshly read content, keeping the first value if one exists
    pub(crate) fn store_content(&self, data: Vec<u8>) -> &[u8] {
        self.content.get_or_init(|| data).as_slice()
    }

    /// Extracts the file extension from the filename
    ///
    /// Returns `None` if the filename has no extension
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Cache tags identifying this file as a render dependency
    #[must_use]
    pub fn cache_tags(&self) -> Vec<String> {
        vec![format!("file:{}", self.id)]
    }
}

impl fmt::Display for FileItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileItem(id={}, uri={})", self.id, self.uri)
    }
}

/// Metadata about a file held by a storage backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage URI the file is addressed by
    pub uri: String,

    /// Filename component of the URI
    pub filename: String,

    /// MIME content type
    pub content_type: String,

    /// File size in bytes
    pub size: u64,

    /// Storage backend-specific path or key
    ///
    /// - For local storage: filesystem path
    /// - For memory storage: the URI itself
    pub storage_path: String,
}

impl StoredFile {
    /// Creates a new stored file metadata record
    #[must_use]
    pub fn new(
        uri: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        storage_path: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            size,
            storage_path: storage_path.into(),
        }
    }

    /// Builds an unloaded [`FileItem`] for this stored file
    #[must_use]
    pub fn to_file_item(&self, id: impl Into<String>) -> FileItem {
        FileItem::new(id, &self.uri, &self.filename, &self.content_type)
    }
}

impl fmt::Display for StoredFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoredFile(uri={}, filename={}, size={})",
            self.uri, self.filename, self.size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_item_starts_unloaded() {
        let file = FileItem::new("7", "public://a.svg", "a.svg", "image/svg+xml");
        assert!(!file.is_loaded());
        assert_eq!(file.content(), None);
        assert_eq!(file.size(), None);
    }

    #[test]
    fn test_store_content_keeps_first_value() {
        let file = FileItem::new("7", "public://a.svg", "a.svg", "image/svg+xml");
        assert_eq!(file.store_content(b"first".to_vec()), b"first");
        assert_eq!(file.store_content(b"second".to_vec()), b"first");
        assert_eq!(file.size(), Some(5));
    }

    #[test]
    fn test_extension() {
        let file = FileItem::new("1", "public://logo.svg", "logo.svg", "image/svg+xml");
        assert_eq!(file.extension(), Some("svg"));

        let no_ext = FileItem::new("2", "public://README", "README", "text/plain");
        assert_eq!(no_ext.extension(), None);

        let multiple_dots = FileItem::new("3", "public://a.tar.gz", "a.tar.gz", "application/gzip");
        assert_eq!(multiple_dots.extension(), Some("gz"));

        let trailing_dot = FileItem::new("4", "public://odd.", "odd.", "text/plain");
        assert_eq!(trailing_dot.extension(), None);
    }

    #[test]
    fn test_cache_tags() {
        let file = FileItem::new("99", "public://a.svg", "a.svg", "image/svg+xml");
        assert_eq!(file.cache_tags(), vec!["file:99"]);
    }

    #[test]
    fn test_stored_file_to_file_item() {
        let stored = StoredFile::new("public://x/y.svg", "y.svg", "image/svg+xml", 12, "/srv/x/y.svg");
        let item = stored.to_file_item("5");
        assert_eq!(item.id, "5");
        assert_eq!(item.uri, "public://x/y.svg");
        assert_eq!(item.content_type, "image/svg+xml");
        assert!(!item.is_loaded());
    }

    #[test]
    fn test_stored_file_display() {
        let stored = StoredFile::new("public://t.svg", "t.svg", "image/svg+xml", 1024, "/srv/t.svg");
        let display = format!("{stored}");
        assert!(display.contains("public://t.svg"));
        assert!(display.contains("1024"));
    }
}
