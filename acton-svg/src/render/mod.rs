//! Field rendering
//!
//! [`SvgImageFormatter`] turns the items of an image field into
//! [`ViewElement`]s. For every item it decides between a standard image
//! reference and inline SVG markup:
//!
//! ```text
//! render_as_image? ── yes ──▶ ImageReference (no file read)
//!        │ no
//!   read file ── unavailable ──▶ skip item
//!        │
//!   is SVG? ── no ──▶ ImageReference
//!        │ yes
//!   sanitize ── failure ──▶ skip item (logged)
//!        │
//!   post-process (prolog, dimensions, title)
//!        │
//!   link? ── yes ──▶ LinkedMarkup
//!        │ no
//!   InlineMarkup
//! ```
//!
//! Items are independent: a failing item is logged and left out, the rest
//! of the field still renders.

pub mod cache;
pub mod collaborators;
mod html;
pub mod types;

pub use cache::{CacheMetadata, URL_SITE_CONTEXT};
pub use collaborators::{ImageStyleService, NoImageStyles, NoUrlResolver, UrlResolver};
pub use types::{ElementKind, EntityRef, FieldItem, FieldItemView, ImageDescriptor, ViewElement};

use crate::config::{ImageLink, RenderSettings};
use crate::error::{ActonSvgError, Result};
use crate::postprocess::{PostProcessOptions, PostProcessor};
use crate::sanitize::{AllowlistSanitizer, SvgSanitizer};
use crate::storage::{FileGateway, FileStorage, SvgDetector};
use async_trait::async_trait;
use std::sync::Arc;

/// Renders the items of a field
#[async_trait]
pub trait FieldRenderer: Send + Sync {
    /// Renders every item that can be rendered, in order
    async fn render(&self, items: &[FieldItem], settings: &RenderSettings) -> Vec<ViewElement>;
}

/// Image formatter with inline SVG support
///
/// # Examples
///
/// ```rust
/// use acton_svg::config::RenderSettings;
/// use acton_svg::render::{FieldItem, FieldRenderer, SvgImageFormatter};
/// use acton_svg::storage::{FileGateway, FileItem, MemoryFileStorage};
///
/// # async fn example() {
/// let storage = MemoryFileStorage::new();
/// storage.insert(
///     "public://logo.svg",
///     "image/svg+xml",
///     br#"<svg onload="alert(1)"><circle r="4"/></svg>"#.to_vec(),
/// );
///
/// let formatter = SvgImageFormatter::new(FileGateway::new(storage));
/// let items = vec![FieldItem::new(
///     0,
///     FileItem::new("1", "public://logo.svg", "logo.svg", "image/svg+xml"),
/// )];
/// let settings = RenderSettings {
///     render_as_image: false,
///     ..RenderSettings::default()
/// };
///
/// let elements = formatter.render(&items, &settings).await;
/// assert_eq!(elements[0].to_html(), r#"<svg><circle r="4"/></svg>"#);
/// # }
/// ```
pub struct SvgImageFormatter<S> {
    gateway: FileGateway<S>,
    sanitizer: Arc<dyn SvgSanitizer>,
    post_processor: PostProcessor,
    detector: SvgDetector,
    url_resolver: Arc<dyn UrlResolver>,
    image_styles: Arc<dyn ImageStyleService>,
}

impl<S: FileStorage> SvgImageFormatter<S> {
    /// Creates a formatter with the default sanitizer and no optional services
    #[must_use]
    pub fn new(gateway: FileGateway<S>) -> Self {
        Self {
            gateway,
            sanitizer: Arc::new(AllowlistSanitizer::default()),
            post_processor: PostProcessor::new(),
            detector: SvgDetector::new(),
            url_resolver: Arc::new(NoUrlResolver),
            image_styles: Arc::new(NoImageStyles),
        }
    }

    /// Replaces the sanitizer
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn SvgSanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Replaces the SVG detector
    #[must_use]
    pub const fn with_detector(mut self, detector: SvgDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Sets the entity URL resolver used for content links
    #[must_use]
    pub fn with_url_resolver(mut self, url_resolver: Arc<dyn UrlResolver>) -> Self {
        self.url_resolver = url_resolver;
        self
    }

    /// Sets the image style service
    #[must_use]
    pub fn with_image_styles(mut self, image_styles: Arc<dyn ImageStyleService>) -> Self {
        self.image_styles = image_styles;
        self
    }

    /// Returns the file gateway
    #[must_use]
    pub const fn gateway(&self) -> &FileGateway<S> {
        &self.gateway
    }

    /// Computes alt text, link target, attributes and cache metadata of an item
    pub async fn build_view(&self, item: &FieldItem, settings: &RenderSettings) -> FieldItemView {
        let mut cache = CacheMetadata::new();
        if let Some(style) = settings.image_style() {
            cache.add_tags(self.image_styles.cache_tags(style));
        }
        cache.add_tags(item.file.cache_tags());

        let url = match settings.image_link {
            ImageLink::None => None,
            ImageLink::Content => item
                .entity
                .as_ref()
                .and_then(|entity| self.url_resolver.entity_url(entity)),
            ImageLink::File => {
                let url = self.gateway.url(&item.file).await;
                if url.is_some() {
                    cache.add_context(URL_SITE_CONTEXT);
                }
                url
            }
        };

        FieldItemView {
            alt: item.alt.clone(),
            url,
            attributes: item.attributes.clone(),
            cache,
        }
    }

    /// Renders one item
    ///
    /// # Errors
    ///
    /// - [`ActonSvgError::FileUnavailable`] if inline rendering needs the
    ///   file and it cannot be read
    /// - [`ActonSvgError::SanitizationFailure`] if an SVG cannot be sanitized
    pub async fn render_item(&self, item: &FieldItem, settings: &RenderSettings) -> Result<ViewElement> {
        let view = self.build_view(item, settings).await;
        let file = &item.file;

        if settings.render_as_image {
            let declares_svg = self.detector.declares_svg(file);
            let image = self.image_descriptor(item, settings, &view, declares_svg).await;
            return Ok(element(item, ElementKind::ImageReference(image), view));
        }

        let data = self
            .gateway
            .read(file)
            .await
            .map_err(|source| ActonSvgError::file_unavailable(file, source))?;

        if !self.detector.is_svg(file) {
            let image = self.image_descriptor(item, settings, &view, false).await;
            return Ok(element(item, ElementKind::ImageReference(image), view));
        }

        let markup = self.sanitizer.sanitize(data)?;

        let mut options = PostProcessOptions::default().with_dimensions(
            settings.svg_attributes.width_px(),
            settings.svg_attributes.height_px(),
        );
        if settings.alt_as_title && !view.alt.trim().is_empty() {
            options = options.with_title(view.alt.clone());
        }
        let markup = self.post_processor.process(markup, &options);

        let kind = match view.url.clone() {
            Some(url) => ElementKind::LinkedMarkup { url, markup },
            None => ElementKind::InlineMarkup { markup },
        };

        Ok(element(item, kind, view))
    }

    async fn image_descriptor(
        &self,
        item: &FieldItem,
        settings: &RenderSettings,
        view: &FieldItemView,
        svg: bool,
    ) -> ImageDescriptor {
        let file = &item.file;
        let style = settings.image_style();

        let derivative = style.and_then(|style| self.image_styles.derivative_url(style, &file.uri));
        let url = match derivative {
            Some(url) => Some(url),
            None => self.gateway.url(file).await,
        };

        let (width, height) = if svg {
            (settings.svg_attributes.width_px(), settings.svg_attributes.height_px())
        } else {
            (None, None)
        };

        ImageDescriptor {
            uri: file.uri.clone(),
            url,
            alt: view.alt.clone(),
            image_style: style.map(str::to_string),
            attributes: view.attributes.clone(),
            link: view.url.clone(),
            width,
            height,
        }
    }
}

#[async_trait]
impl<S: FileStorage> FieldRenderer for SvgImageFormatter<S> {
    async fn render(&self, items: &[FieldItem], settings: &RenderSettings) -> Vec<ViewElement> {
        let mut elements = Vec::with_capacity(items.len());

        for item in items {
            match self.render_item(item, settings).await {
                Ok(element) => elements.push(element),
                Err(error) => log_skipped(item, &error),
            }
        }

        elements
    }
}

fn element(item: &FieldItem, kind: ElementKind, view: FieldItemView) -> ViewElement {
    ViewElement {
        delta: item.delta,
        kind,
        cache: view.cache,
    }
}

fn log_skipped(item: &FieldItem, error: &ActonSvgError) {
    match error {
        // Already logged by the gateway
        ActonSvgError::FileUnavailable { .. } => tracing::debug!(
            delta = item.delta,
            file_id = %item.file.id,
            "Skipping field item with unavailable file"
        ),
        ActonSvgError::SanitizationFailure(_) => tracing::warn!(
            delta = item.delta,
            file_id = %item.file.id,
            file_uri = %item.file.uri,
            %error,
            "SVG could not be sanitized, skipping field item"
        ),
        _ => tracing::warn!(
            delta = item.delta,
            file_id = %item.file.id,
            file_uri = %item.file.uri,
            %error,
            "Skipping field item"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::collaborators::{MockImageStyleService, MockUrlResolver};
    use crate::sanitize::{MockSvgSanitizer, SanitizeError};
    use crate::storage::traits::MockFileStorage;
    use crate::storage::{FileItem, MemoryFileStorage, StorageError};
    use crate::testing;
    use mockall::predicate::eq;

    const HOSTILE_SVG: &[u8] =
        b"<?xml version=\"1.0\"?><svg><script>alert(1)</script><rect/></svg>";
    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];

    fn storage() -> MemoryFileStorage {
        let storage = MemoryFileStorage::new();
        storage.insert("public://logo.svg", "image/svg+xml", HOSTILE_SVG.to_vec());
        storage.insert("public://photo.png", "image/png", PNG.to_vec());
        storage
    }

    fn svg_item(delta: usize) -> FieldItem {
        FieldItem::new(
            delta,
            FileItem::new("1", "public://logo.svg", "logo.svg", "image/svg+xml"),
        )
    }

    fn inline() -> RenderSettings {
        RenderSettings {
            render_as_image: false,
            ..RenderSettings::default()
        }
    }

    #[tokio::test]
    async fn test_inline_svg_is_sanitized() {
        let formatter = SvgImageFormatter::new(FileGateway::new(storage()));

        let elements = formatter.render(&[svg_item(0)], &inline()).await;

        assert_eq!(elements.len(), 1);
        let markup = elements[0].markup().unwrap().as_str();
        assert_eq!(markup, "<svg><rect/></svg>");
        assert!(!markup.contains("<script"));
        assert!(!markup.contains("<?xml"));
    }

    #[tokio::test]
    async fn test_render_as_image_reads_nothing() {
        let mut storage = MockFileStorage::new();
        storage.expect_retrieve().never();
        storage
            .expect_url()
            .with(eq("public://logo.svg"))
            .returning(|_| Ok("/files/logo.svg".to_string()));
        let formatter = SvgImageFormatter::new(FileGateway::new(storage));

        let settings = RenderSettings {
            svg_attributes: crate::config::SvgAttributes::new("32", "16"),
            ..RenderSettings::default()
        };
        let elements = formatter.render(&[svg_item(0).with_alt("Logo")], &settings).await;

        let image = elements[0].image().unwrap();
        assert_eq!(image.url.as_deref(), Some("/files/logo.svg"));
        assert_eq!(image.alt, "Logo");
        assert_eq!(image.width.as_deref(), Some("32px"));
        assert_eq!(image.height.as_deref(), Some("16px"));
    }

    #[tokio::test]
    async fn test_missing_file_is_skipped() {
        let formatter = SvgImageFormatter::new(FileGateway::new(storage()));
        let missing = FieldItem::new(
            1,
            FileItem::new("2", "public://gone.svg", "gone.svg", "image/svg+xml"),
        );

        let elements = formatter
            .render(&[svg_item(0), missing, svg_item(2)], &inline())
            .await;

        assert_eq!(elements.iter().map(|e| e.delta).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[tokio::test]
    async fn test_non_svg_renders_as_image() {
        let formatter = SvgImageFormatter::new(FileGateway::new(storage()));
        let photo = FieldItem::new(
            0,
            FileItem::new("3", "public://photo.png", "photo.png", "image/png"),
        );
        let settings = RenderSettings {
            svg_attributes: crate::config::SvgAttributes::new("32", ""),
            ..inline()
        };

        let elements = formatter.render(&[photo], &settings).await;

        let image = elements[0].image().unwrap();
        assert_eq!(image.url.as_deref(), Some("/files/photo.png"));
        assert_eq!(image.width, None);
    }

    #[tokio::test]
    async fn test_sanitizer_failure_skips_item() {
        let mut sanitizer = MockSvgSanitizer::new();
        sanitizer
            .expect_sanitize()
            .times(1)
            .returning(|_| Err(SanitizeError::Malformed("broken".to_string())));
        let formatter =
            SvgImageFormatter::new(FileGateway::new(storage())).with_sanitizer(Arc::new(sanitizer));

        let result = formatter.render_item(&svg_item(0), &inline()).await;
        assert!(matches!(result, Err(ActonSvgError::SanitizationFailure(_))));
    }

    #[tokio::test]
    async fn test_alt_as_title() {
        let formatter = SvgImageFormatter::new(FileGateway::new(storage()));
        let settings = RenderSettings {
            alt_as_title: true,
            ..inline()
        };

        let titled = formatter
            .render(&[svg_item(0).with_alt("Our <logo>")], &settings)
            .await;
        assert_eq!(
            titled[0].markup().unwrap().as_str(),
            "<svg><title>Our &lt;logo&gt;</title><rect/></svg>"
        );

        let untitled = formatter.render(&[svg_item(0).with_alt("  ")], &settings).await;
        assert_eq!(untitled[0].markup().unwrap().as_str(), "<svg><rect/></svg>");
    }

    #[tokio::test]
    async fn test_content_link() {
        let mut resolver = MockUrlResolver::new();
        resolver
            .expect_entity_url()
            .returning(|entity| Some(format!("/{}/{}", entity.entity_type, entity.id)));
        let formatter =
            SvgImageFormatter::new(FileGateway::new(storage())).with_url_resolver(Arc::new(resolver));
        let settings = RenderSettings {
            image_link: ImageLink::Content,
            ..inline()
        };

        let elements = formatter
            .render(&[svg_item(0).with_entity(EntityRef::new("node", "5"))], &settings)
            .await;

        assert!(matches!(
            &elements[0].kind,
            ElementKind::LinkedMarkup { url, .. } if url == "/node/5"
        ));
        assert!(elements[0].cache.contexts.is_empty());
    }

    #[tokio::test]
    async fn test_file_link_adds_site_context() {
        let formatter = SvgImageFormatter::new(FileGateway::new(storage()));
        let settings = RenderSettings {
            image_link: ImageLink::File,
            ..inline()
        };

        let elements = formatter.render(&[svg_item(0)], &settings).await;

        assert_eq!(
            elements[0].to_html(),
            "<a href=\"/files/logo.svg\"><svg><rect/></svg></a>"
        );
        assert!(elements[0].cache.contexts.contains(URL_SITE_CONTEXT));
    }

    #[tokio::test]
    async fn test_unresolved_file_link_has_no_site_context() {
        let mut storage = MockFileStorage::new();
        storage
            .expect_url()
            .returning(|uri| Err(StorageError::NotFound(uri.to_string())));
        storage.expect_retrieve().never();

        let formatter = SvgImageFormatter::new(FileGateway::new(storage));
        let settings = RenderSettings {
            render_as_image: true,
            image_link: ImageLink::File,
            ..RenderSettings::default()
        };

        let elements = formatter.render(&[svg_item(0)], &settings).await;

        let image = elements[0].image().unwrap();
        assert_eq!(image.link, None);
        assert_eq!(image.url, None);
        assert!(elements[0].cache.contexts.is_empty());
    }

    #[tokio::test]
    async fn test_cache_tags_include_style_and_file() {
        let mut styles = MockImageStyleService::new();
        styles
            .expect_cache_tags()
            .with(eq("thumbnail"))
            .returning(|style| vec![format!("config:image.style.{style}")]);
        styles.expect_derivative_url().returning(|style, uri| {
            Some(format!("/styles/{style}/{}", uri.trim_start_matches("public://")))
        });
        let formatter =
            SvgImageFormatter::new(FileGateway::new(storage())).with_image_styles(Arc::new(styles));
        let settings = RenderSettings {
            image_style: Some("thumbnail".to_string()),
            ..RenderSettings::default()
        };

        let elements = formatter.render(&[svg_item(0)], &settings).await;

        assert_eq!(
            elements[0].cache.tags.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["config:image.style.thumbnail", "file:1"]
        );
        assert_eq!(
            elements[0].image().unwrap().url.as_deref(),
            Some("/styles/thumbnail/logo.svg")
        );
    }

    #[tokio::test]
    async fn test_inline_dimensions() {
        let formatter = SvgImageFormatter::new(FileGateway::new(storage()));
        let settings = RenderSettings {
            svg_attributes: crate::config::SvgAttributes::new("24", "24"),
            ..inline()
        };

        let elements = formatter.render(&[svg_item(0)], &settings).await;
        assert_eq!(
            elements[0].markup().unwrap().as_str(),
            "<svg width=\"24px\" height=\"24px\"><rect/></svg>"
        );
    }

    #[tokio::test]
    async fn test_mixed_field() {
        let storage = testing::fixture_storage(&[
            ("xxe.svg", "image/svg+xml", testing::XXE_SVG.as_bytes()),
            ("bomb.svg", "application/octet-stream", testing::ENTITY_BOMB_SVG.as_bytes()),
            ("fake.svg", "image/svg+xml", testing::PNG_BYTES),
        ]);
        let formatter = SvgImageFormatter::new(FileGateway::new(storage));
        let items = [
            testing::field_item(0, "10", "xxe.svg", "image/svg+xml"),
            testing::field_item(1, "11", "bomb.svg", "application/octet-stream"),
            testing::field_item(2, "12", "fake.svg", "image/svg+xml"),
        ];

        let elements = formatter.render(&items, &inline()).await;

        assert_eq!(elements.len(), 3);
        testing::assert_inline(&elements[0]);
        assert_eq!(testing::assert_inline(&elements[1]).as_str(), "<svg><text/></svg>");
        let fake = testing::assert_image_reference(&elements[2]);
        assert_eq!(fake.url.as_deref(), Some("/files/fake.svg"));
    }

    #[tokio::test]
    async fn test_unreadable_file_reports_unavailable() {
        let mut storage = MockFileStorage::new();
        storage
            .expect_retrieve()
            .returning(|uri| Err(StorageError::NotFound(uri.to_string())));
        let formatter = SvgImageFormatter::new(FileGateway::new(storage));

        let result = formatter.render_item(&svg_item(4), &inline()).await;
        assert!(matches!(
            result,
            Err(ActonSvgError::FileUnavailable { ref file_id, .. }) if file_id == "1"
        ));
    }
}
