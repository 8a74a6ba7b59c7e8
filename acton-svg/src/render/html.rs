//! HTML serialization of rendered elements

use super::types::{ElementKind, ImageDescriptor, ViewElement};
use crate::sanitize::escape_html;
use std::fmt::Write;

impl ViewElement {
    /// Renders the element as an HTML fragment
    ///
    /// Inline markup is emitted verbatim (it is already sanitized); URLs,
    /// alt text and attribute values are escaped.
    ///
    /// ```rust
    /// use acton_svg::render::{CacheMetadata, ElementKind, ImageDescriptor, ViewElement};
    ///
    /// let element = ViewElement {
    ///     delta: 0,
    ///     kind: ElementKind::ImageReference(ImageDescriptor {
    ///         url: Some("/files/a.png".to_string()),
    ///         alt: "A \"quoted\" alt".to_string(),
    ///         ..ImageDescriptor::default()
    ///     }),
    ///     cache: CacheMetadata::new(),
    /// };
    ///
    /// assert_eq!(element.to_html(), r#"<img src="/files/a.png" alt="A &quot;quoted&quot; alt" />"#);
    /// ```
    #[must_use]
    pub fn to_html(&self) -> String {
        match &self.kind {
            ElementKind::InlineMarkup { markup } => markup.to_string(),
            ElementKind::LinkedMarkup { url, markup } => link(url, markup.as_str()),
            ElementKind::ImageReference(image) => {
                let img = img_tag(image);
                match &image.link {
                    Some(url) => link(url, &img),
                    None => img,
                }
            }
        }
    }
}

fn link(url: &str, inner: &str) -> String {
    format!("<a href=\"{}\">{inner}</a>", escape_html(url))
}

fn img_tag(image: &ImageDescriptor) -> String {
    let mut tag = String::from("<img");

    if let Some(url) = &image.url {
        push_attribute(&mut tag, "src", url);
    }
    push_attribute(&mut tag, "alt", &image.alt);
    if let Some(width) = &image.width {
        push_attribute(&mut tag, "width", width.trim_end_matches("px"));
    }
    if let Some(height) = &image.height {
        push_attribute(&mut tag, "height", height.trim_end_matches("px"));
    }

    for (name, value) in &image.attributes {
        if is_safe_attribute_name(name) && !matches!(name.as_str(), "src" | "alt" | "width" | "height") {
            push_attribute(&mut tag, name, value);
        }
    }

    tag.push_str(" />");
    tag
}

fn push_attribute(tag: &mut String, name: &str, value: &str) {
    // Writing to a String cannot fail
    let _ = write!(tag, " {name}=\"{}\"", escape_html(value));
}

/// Plain attribute names, excluding event handlers
fn is_safe_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.to_ascii_lowercase().starts_with("on")
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CacheMetadata;
    use crate::sanitize::SanitizedMarkup;

    fn element(kind: ElementKind) -> ViewElement {
        ViewElement {
            delta: 0,
            kind,
            cache: CacheMetadata::new(),
        }
    }

    #[test]
    fn test_inline_markup_is_verbatim() {
        let markup = SanitizedMarkup::new("<svg><rect/></svg>".to_string());
        assert_eq!(
            element(ElementKind::InlineMarkup { markup }).to_html(),
            "<svg><rect/></svg>"
        );
    }

    #[test]
    fn test_linked_markup_escapes_url() {
        let markup = SanitizedMarkup::new("<svg/>".to_string());
        let html = element(ElementKind::LinkedMarkup {
            url: "/node/1?a=1&b=\"2\"".to_string(),
            markup,
        })
        .to_html();

        assert_eq!(html, "<a href=\"/node/1?a=1&amp;b=&quot;2&quot;\"><svg/></a>");
    }

    #[test]
    fn test_image_reference_with_link_and_attributes() {
        let mut image = ImageDescriptor {
            url: Some("/files/logo.svg".to_string()),
            alt: "Logo".to_string(),
            link: Some("/files/logo.svg".to_string()),
            width: Some("64px".to_string()),
            ..ImageDescriptor::default()
        };
        image.attributes.insert("class".to_string(), "brand".to_string());
        image.attributes.insert("onerror".to_string(), "alert(1)".to_string());
        image.attributes.insert("x\" onload=\"y".to_string(), "z".to_string());
        image.attributes.insert("src".to_string(), "javascript:alert(1)".to_string());

        assert_eq!(
            element(ElementKind::ImageReference(image)).to_html(),
            "<a href=\"/files/logo.svg\"><img src=\"/files/logo.svg\" alt=\"Logo\" width=\"64\" class=\"brand\" /></a>"
        );
    }

    #[test]
    fn test_image_reference_without_url() {
        let image = ImageDescriptor {
            uri: "public://gone.png".to_string(),
            ..ImageDescriptor::default()
        };
        assert_eq!(element(ElementKind::ImageReference(image)).to_html(), "<img alt=\"\" />");
    }
}
