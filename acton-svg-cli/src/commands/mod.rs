//! CLI command implementations

pub mod check;
pub mod render;
pub mod sanitize;

pub use check::{CheckCommand, Classification};
pub use render::RenderCommand;
pub use sanitize::{SanitizeCommand, SanitizedFile};
