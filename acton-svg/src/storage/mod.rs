//! File storage, access and SVG detection
//!
//! - [`FileStorage`] - read-only backend abstraction ([`LocalFileStorage`], [`MemoryFileStorage`])
//! - [`FileGateway`] - logged, fail-soft file reads for the render pipeline
//! - [`SvgDetector`] - content-based SVG classification
//!
//! # Examples
//!
//! ```rust
//! use acton_svg::storage::{FileGateway, FileItem, MemoryFileStorage, SvgDetector};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let storage = MemoryFileStorage::new();
//! storage.insert("public://logo.svg", "image/svg+xml", b"<svg><rect/></svg>".to_vec());
//!
//! let gateway = FileGateway::new(storage);
//! let file = FileItem::new("1", "public://logo.svg", "logo.svg", "image/svg+xml");
//! gateway.read(&file).await?;
//!
//! assert!(SvgDetector::new().is_svg(&file));
//! # Ok(())
//! # }
//! ```

pub mod detection;
pub mod gateway;
pub mod local;
pub mod memory;
pub mod traits;
pub mod types;

pub use detection::{SvgDetector, SVG_MIME};
pub use gateway::FileGateway;
pub use local::LocalFileStorage;
pub use memory::MemoryFileStorage;
pub use traits::FileStorage;
pub use types::{FileItem, StorageError, StorageResult, StoredFile};
