//! Error types and error handling
//!
//! Each module has its own error enum; [`ActonSvgError`] collects them for
//! callers that handle one item of a render pass as a unit.

use crate::config::ConfigError;
use crate::postprocess::PostProcessError;
use crate::sanitize::SanitizeError;
use crate::storage::{FileItem, StorageError};
use thiserror::Error;

/// Crate error type
#[derive(Debug, Error)]
pub enum ActonSvgError {
    /// The referenced file is missing or unreadable
    #[error("File {file_id} ({uri}) is unavailable: {source}")]
    FileUnavailable {
        /// File entity identifier
        file_id: String,
        /// Storage URI
        uri: String,
        /// Underlying storage failure
        source: StorageError,
    },

    /// SVG content could not be made safe
    #[error("Sanitization failed: {0}")]
    SanitizationFailure(#[from] SanitizeError),

    /// Markup lacks the structure a post-processing step needs
    #[error("Malformed markup structure: {0}")]
    MalformedMarkupStructure(#[from] PostProcessError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage backend failure not tied to a field item
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ActonSvgError {
    /// Wraps a storage failure for a specific file
    #[must_use]
    pub fn file_unavailable(file: &FileItem, source: StorageError) -> Self {
        Self::FileUnavailable {
            file_id: file.id.clone(),
            uri: file.uri.clone(),
            source,
        }
    }
}

/// Result type using [`ActonSvgError`]
pub type Result<T, E = ActonSvgError> = std::result::Result<T, E>;
