//! Local filesystem storage implementation

use super::traits::FileStorage;
use super::types::{StorageError, StorageResult, StoredFile};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// URI scheme served by the local backend
const PUBLIC_SCHEME: &str = "public";

/// Local filesystem storage backend
///
/// Maps `public://` URIs (and bare relative paths) onto a base directory:
///
/// ```text
/// public://images/logo.svg  ->  {base_path}/images/logo.svg
///                           ->  {public_url}/images/logo.svg
/// ```
///
/// Absolute paths, `..` segments and other schemes are rejected with
/// [`StorageError::InvalidPath`], so a URI can never escape the base
/// directory.
///
/// # Examples
///
/// ```rust,no_run
/// use acton_svg::storage::{FileStorage, LocalFileStorage};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let storage = LocalFileStorage::new(PathBuf::from("/var/www/files"))?
///     .with_public_url("https://cdn.example.com/files");
///
/// let url = storage.url("public://images/logo.svg").await?;
/// assert_eq!(url, "https://cdn.example.com/files/images/logo.svg");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    /// Base directory for file storage
    base_path: PathBuf,

    /// URL prefix the base directory is served under
    public_url: String,
}

impl LocalFileStorage {
    /// Creates a new local file storage instance
    ///
    /// Files are served under `/files` until [`with_public_url`](Self::with_public_url)
    /// says otherwise.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` if the base path exists and is not a directory
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        // Validate base path (synchronous check is OK for initialization)
        if base_path.exists() && !base_path.is_dir() {
            return Err(StorageError::InvalidPath(format!(
                "{} is not a directory",
                base_path.display()
            )));
        }

        Ok(Self {
            base_path,
            public_url: "/files".to_string(),
        })
    }

    /// Sets the URL prefix files are served under
    #[must_use]
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into();
        self
    }

    /// Returns the base directory
    #[must_use]
    pub const fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// Extracts the storage-relative path from a URI
    fn relative_path(uri: &str) -> StorageResult<&str> {
        let path = match uri.split_once("://") {
            Some((PUBLIC_SCHEME, rest)) => rest,
            Some((scheme, _)) => {
                return Err(StorageError::InvalidPath(format!(
                    "unsupported scheme `{scheme}` in {uri}"
                )))
            }
            None => uri,
        };

        if path.is_empty() || path.starts_with(['/', '\\']) || path.contains(':') {
            return Err(StorageError::InvalidPath(uri.to_string()));
        }
        if path.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(StorageError::InvalidPath(uri.to_string()));
        }

        Ok(path)
    }

    /// Gets the full filesystem path for a URI
    fn resolve(&self, uri: &str) -> StorageResult<PathBuf> {
        Self::relative_path(uri).map(|relative| self.base_path.join(relative))
    }
}

/// Maps a missing file onto `NotFound`, keeping other I/O failures as-is
fn not_found_or_io(error: std::io::Error, uri: &str) -> StorageError {
    if error.kind() == ErrorKind::NotFound {
        StorageError::NotFound(uri.to_string())
    } else {
        StorageError::Io(error)
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn retrieve(&self, uri: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(uri)?;
        fs::read(&path).await.map_err(|e| not_found_or_io(e, uri))
    }

    async fn exists(&self, uri: &str) -> StorageResult<bool> {
        let path = self.resolve(uri)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn url(&self, uri: &str) -> StorageResult<String> {
        let relative = Self::relative_path(uri)?;

        if !self.exists(uri).await? {
            return Err(StorageError::NotFound(uri.to_string()));
        }

        Ok(format!(
            "{}/{}",
            self.public_url.trim_end_matches('/'),
            relative.replace('\\', "/")
        ))
    }

    async fn get_metadata(&self, uri: &str) -> StorageResult<StoredFile> {
        let path = self.resolve(uri)?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(e, uri))?;

        if !metadata.is_file() {
            return Err(StorageError::NotFound(uri.to_string()));
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidPath(format!("Invalid filename in {uri}")))?
            .to_string();
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(StoredFile {
            uri: uri.to_string(),
            filename,
            content_type,
            size: metadata.len(),
            storage_path: path.to_string_lossy().to_string(),
        })
    }
}
