//! Render pass input and output types

use super::cache::CacheMetadata;
use crate::sanitize::SanitizedMarkup;
use crate::storage::FileItem;
use serde::Serialize;
use std::collections::BTreeMap;

/// Reference to the entity that owns a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityRef {
    /// Entity type (e.g. `node`)
    pub entity_type: String,
    /// Entity identifier
    pub id: String,
}

impl EntityRef {
    /// Creates an entity reference
    #[must_use]
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

/// One value of an image field
#[derive(Debug, Clone)]
pub struct FieldItem {
    /// Position in the field
    pub delta: usize,
    /// Referenced file
    pub file: FileItem,
    /// Alternative text
    pub alt: String,
    /// Extra HTML attributes for the rendered image
    pub attributes: BTreeMap<String, String>,
    /// Entity owning the field
    pub entity: Option<EntityRef>,
}

impl FieldItem {
    /// Creates an item without alt text or attributes
    #[must_use]
    pub const fn new(delta: usize, file: FileItem) -> Self {
        Self {
            delta,
            file,
            alt: String::new(),
            attributes: BTreeMap::new(),
            entity: None,
        }
    }

    /// Sets the alt text
    #[must_use]
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    /// Adds an HTML attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets the owning entity
    #[must_use]
    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }
}

/// Per-item values computed for rendering
///
/// Built fresh for every item and never shared between items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldItemView {
    /// Alternative text
    pub alt: String,
    /// Resolved link target
    pub url: Option<String>,
    /// HTML attributes
    pub attributes: BTreeMap<String, String>,
    /// Cache metadata of the item
    pub cache: CacheMetadata,
}

/// Everything needed to render an `<img>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageDescriptor {
    /// Storage URI
    pub uri: String,
    /// Public (or derivative) URL
    pub url: Option<String>,
    /// Alternative text
    pub alt: String,
    /// Image style applied
    pub image_style: Option<String>,
    /// HTML attributes
    pub attributes: BTreeMap<String, String>,
    /// Link target
    pub link: Option<String>,
    /// Width in pixels (`<n>px`), SVG only
    pub width: Option<String>,
    /// Height in pixels (`<n>px`), SVG only
    pub height: Option<String>,
}

/// How an item is rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Standard image element
    ImageReference(ImageDescriptor),
    /// Inline SVG wrapped in a link
    LinkedMarkup {
        /// Link target
        url: String,
        /// Sanitized SVG
        markup: SanitizedMarkup,
    },
    /// Inline SVG
    InlineMarkup {
        /// Sanitized SVG
        markup: SanitizedMarkup,
    },
}

/// Rendered field item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewElement {
    /// Position of the source item in the field
    pub delta: usize,
    /// Rendered form
    pub kind: ElementKind,
    /// Cache metadata
    pub cache: CacheMetadata,
}

impl ViewElement {
    /// Sanitized markup, for inline elements
    #[must_use]
    pub const fn markup(&self) -> Option<&SanitizedMarkup> {
        match &self.kind {
            ElementKind::LinkedMarkup { markup, .. } | ElementKind::InlineMarkup { markup } => {
                Some(markup)
            }
            ElementKind::ImageReference(_) => None,
        }
    }

    /// Image descriptor, for image references
    #[must_use]
    pub const fn image(&self) -> Option<&ImageDescriptor> {
        match &self.kind {
            ElementKind::ImageReference(image) => Some(image),
            _ => None,
        }
    }
}
