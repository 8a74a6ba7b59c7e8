//! Services the formatter depends on
//!
//! Both are injected into [`SvgImageFormatter`](super::SvgImageFormatter);
//! the `No*` implementations are used when a site has no such service.

use super::types::EntityRef;

/// Image style (derivative) lookup
#[cfg_attr(test, mockall::automock)]
pub trait ImageStyleService: Send + Sync {
    /// Cache tags of a style's configuration
    fn cache_tags(&self, style: &str) -> Vec<String>;

    /// URL of the derivative of `uri` in `style`, if the style exists
    fn derivative_url(&self, style: &str, uri: &str) -> Option<String>;
}

/// Canonical URLs of content entities
#[cfg_attr(test, mockall::automock)]
pub trait UrlResolver: Send + Sync {
    /// URL of an entity, if it has one
    fn entity_url(&self, entity: &EntityRef) -> Option<String>;
}

/// Site without image styles
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImageStyles;

impl ImageStyleService for NoImageStyles {
    fn cache_tags(&self, _style: &str) -> Vec<String> {
        Vec::new()
    }

    fn derivative_url(&self, _style: &str, _uri: &str) -> Option<String> {
        None
    }
}

/// Site without entity URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUrlResolver;

impl UrlResolver for NoUrlResolver {
    fn entity_url(&self, _entity: &EntityRef) -> Option<String> {
        None
    }
}
