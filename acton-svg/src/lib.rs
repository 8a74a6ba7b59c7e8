//! acton-svg: Sanitized inline SVG rendering for image fields
//!
//! Content sites let editors upload SVG files into image fields. Rendering
//! them through `<img>` is safe but loses styling and accessibility; inlining
//! them is flexible but an SVG file can carry scripts. This crate renders
//! image fields either way and makes the inline path safe:
//!
//! - **storage**: read-only file access ([`FileStorage`](storage::FileStorage)),
//!   fail-soft reads ([`FileGateway`](storage::FileGateway)) and content-based
//!   SVG detection ([`SvgDetector`](storage::SvgDetector))
//! - **sanitize**: allowlist sanitization into
//!   [`SanitizedMarkup`](sanitize::SanitizedMarkup), the only markup that is
//!   ever inlined
//! - **postprocess**: prolog stripping, dimension overrides and accessible
//!   titles
//! - **render**: the per-item decision between image reference and inline
//!   markup ([`SvgImageFormatter`](render::SvgImageFormatter))
//!
//! # Quick Start
//!
//! ```rust
//! use acton_svg::prelude::*;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let storage = MemoryFileStorage::new();
//! storage.insert(
//!     "public://logo.svg",
//!     "image/svg+xml",
//!     br#"<?xml version="1.0"?><svg><script>alert(1)</script><rect/></svg>"#.to_vec(),
//! );
//!
//! let formatter = SvgImageFormatter::new(FileGateway::new(storage));
//! let settings = RenderSettings {
//!     render_as_image: false,
//!     alt_as_title: true,
//!     ..RenderSettings::default()
//! };
//! let items = vec![
//!     FieldItem::new(0, FileItem::new("1", "public://logo.svg", "logo.svg", "image/svg+xml"))
//!         .with_alt("Company logo"),
//! ];
//!
//! for element in formatter.render(&items, &settings).await {
//!     assert_eq!(element.to_html(), "<svg><title>Company logo</title><rect/></svg>");
//! }
//! # Ok(())
//! # }
//! ```

// Lint configuration is handled at the workspace level in Cargo.toml

pub mod config;
pub mod error;
pub mod observability;
pub mod postprocess;
pub mod render;
pub mod sanitize;
pub mod storage;

#[cfg(test)]
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use acton_svg::prelude::*;
    //! ```

    // Configuration
    pub use crate::config::{ActonSvgConfig, ImageLink, RenderSettings, SvgAttributes};

    // Errors
    pub use crate::error::ActonSvgError;

    // Storage
    pub use crate::storage::{
        FileGateway, FileItem, FileStorage, LocalFileStorage, MemoryFileStorage, StorageError,
        SvgDetector,
    };

    // Sanitization and post-processing
    pub use crate::postprocess::{PostProcessOptions, PostProcessor};
    pub use crate::sanitize::{AllowlistSanitizer, SanitizeError, SanitizedMarkup, SvgSanitizer};

    // Rendering
    pub use crate::render::{
        ElementKind, EntityRef, FieldItem, FieldRenderer, ImageStyleService, SvgImageFormatter,
        UrlResolver, ViewElement,
    };
}
