//! Cache metadata attached to rendered elements

use serde::Serialize;
use std::collections::BTreeSet;

/// Cache context for output that varies with the site's base URL
pub const URL_SITE_CONTEXT: &str = "url.site";

/// Cache tags and contexts of a rendered element
///
/// Tags name dependencies (invalidate when `file:42` changes); contexts name
/// variation axes. Both are plain string sets and merging is a set union.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheMetadata {
    /// Dependency tags
    pub tags: BTreeSet<String>,
    /// Variation contexts
    pub contexts: BTreeSet<String>,
}

impl CacheMetadata {
    /// Empty metadata
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata with the given tags
    #[must_use]
    pub fn from_tags<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut metadata = Self::new();
        metadata.add_tags(tags);
        metadata
    }

    /// Adds tags
    pub fn add_tags<I, T>(&mut self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
    }

    /// Adds a context
    pub fn add_context(&mut self, context: impl Into<String>) {
        self.contexts.insert(context.into());
    }

    /// Unions `other` into `self`
    pub fn merge(&mut self, other: &Self) {
        self.tags.extend(other.tags.iter().cloned());
        self.contexts.extend(other.contexts.iter().cloned());
    }

    /// Consuming variant of [`merge`](Self::merge)
    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        self.merge(other);
        self
    }

    /// Whether there are no tags and no contexts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_union() {
        let mut a = CacheMetadata::from_tags(["file:1", "config:image.style.thumb"]);
        let mut b = CacheMetadata::from_tags(["file:1", "file:2"]);
        b.add_context(URL_SITE_CONTEXT);

        a.merge(&b);

        assert_eq!(
            a.tags.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["config:image.style.thumb", "file:1", "file:2"]
        );
        assert!(a.contexts.contains(URL_SITE_CONTEXT));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = CacheMetadata::from_tags(["file:1"]);
        assert_eq!(a.clone().merged(&a), a);
        assert!(CacheMetadata::new().is_empty());
    }
}
