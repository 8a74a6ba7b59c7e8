//! Testing utilities for acton-svg
//!
//! - SVG fixtures covering common attack vectors
//! - Assertion helpers for sanitized markup and rendered elements
//! - Re-exported mockall-generated mocks for collaborator traits

pub mod assertions;
pub mod fixtures;

// Re-export for convenience
pub use assertions::*;
pub use fixtures::*;

pub use crate::render::collaborators::{MockImageStyleService, MockUrlResolver};
pub use crate::sanitize::MockSvgSanitizer;
pub use crate::storage::traits::MockFileStorage;
