//! Markup post-processing for inline SVG
//!
//! Runs after sanitization and prepares markup for embedding in a page:
//!
//! 1. [`strip_prolog`] removes XML declarations and DOCTYPEs, which are
//!    invalid inside an HTML document
//! 2. Surrounding whitespace is trimmed
//! 3. [`apply_dimensions`] overrides the root `width`/`height`
//! 4. [`inject_title`] sets the accessible `<title>` from the alt text
//!
//! The steps are textual and only ever see sanitized markup; the values they
//! insert are escaped or validated numbers.

use crate::sanitize::{escape_html, SanitizedMarkup};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

static XML_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<\?xml.*?\?>").expect("Invalid regex"));

static DOCTYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!DOCTYPE(?:[^\[>]*\[.*?\])?[^>]*>").expect("Invalid regex")
});

/// First `<title>` element, either `<title/>` or `<title …>…</title>`
static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<title(\s[^>]*?)?(?:/>|>(.*?)</title\s*>)").expect("Invalid regex")
});

/// Opening `<svg>` tag, possibly self-closing
static SVG_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<svg(?:\s[^>]*)?/?>").expect("Invalid regex"));

static WIDTH_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\swidth\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("Invalid regex")
});

static HEIGHT_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\sheight\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("Invalid regex")
});

/// Post-processing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostProcessError {
    /// The markup has no `<svg` opening tag to attach a title to
    #[error("Markup has no <svg> opening tag")]
    MissingSvgTag,
}

/// Options for one [`PostProcessor::process`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessOptions {
    /// Remove XML declarations and DOCTYPEs
    pub strip_prolog: bool,
    /// Text for the `<title>` element
    pub title: Option<String>,
    /// Root width override (number, optional `px` suffix)
    pub width: Option<String>,
    /// Root height override (number, optional `px` suffix)
    pub height: Option<String>,
}

impl Default for PostProcessOptions {
    fn default() -> Self {
        Self {
            strip_prolog: true,
            title: None,
            width: None,
            height: None,
        }
    }
}

impl PostProcessOptions {
    /// Sets the title override
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the dimension overrides
    #[must_use]
    pub fn with_dimensions(mut self, width: Option<String>, height: Option<String>) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Applies the post-processing steps to sanitized markup
#[derive(Debug, Clone, Copy, Default)]
pub struct PostProcessor;

impl PostProcessor {
    /// Creates a post-processor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs all enabled steps
    ///
    /// A missing `<svg>` tag is logged and only the title step is skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use acton_svg::postprocess::{PostProcessOptions, PostProcessor};
    /// use acton_svg::sanitize::{AllowlistSanitizer, SvgSanitizer};
    ///
    /// let markup = AllowlistSanitizer::default()
    ///     .sanitize(b"<svg><rect/></svg>")
    ///     .unwrap();
    /// let options = PostProcessOptions::default().with_title("Company logo");
    ///
    /// let processed = PostProcessor::new().process(markup, &options);
    /// assert_eq!(processed.as_str(), "<svg><title>Company logo</title><rect/></svg>");
    /// ```
    #[must_use]
    pub fn process(&self, markup: SanitizedMarkup, options: &PostProcessOptions) -> SanitizedMarkup {
        let mut current = if options.strip_prolog {
            strip_prolog(markup.as_str())
        } else {
            markup.into_string()
        };
        current = current.trim().to_string();
        current = apply_dimensions(&current, options.width.as_deref(), options.height.as_deref());

        if let Some(title) = options.title.as_deref() {
            match inject_title(&current, title) {
                Ok(titled) => current = titled,
                Err(error) => {
                    tracing::warn!(%error, "Could not set SVG title, skipping title");
                }
            }
        }

        SanitizedMarkup::new(current)
    }
}

/// Removes every XML declaration and DOCTYPE
///
/// Removal repeats until nothing matches, so the result never contains a
/// prolog that was assembled from the pieces around a removed one, and
/// applying the function twice gives the same result as applying it once.
///
/// ```rust
/// use acton_svg::postprocess::strip_prolog;
///
/// let markup = r#"<?xml version="1.0"?><!DOCTYPE svg [<!ENTITY a "b">]><svg/>"#;
/// assert_eq!(strip_prolog(markup), "<svg/>");
/// ```
#[must_use]
pub fn strip_prolog(markup: &str) -> String {
    let mut current = markup.to_string();
    loop {
        let without_decl = XML_DECLARATION.replace_all(&current, "");
        let stripped = DOCTYPE.replace_all(&without_decl, "").into_owned();
        if stripped == current {
            return stripped;
        }
        current = stripped;
    }
}

/// Sets the text of the first `<title>`, or inserts one after `<svg …>`
///
/// The title is HTML-escaped. Attributes on existing `<title>` and `<svg>`
/// tags are preserved, and a self-closing `<svg/>` is expanded.
///
/// # Errors
///
/// Returns [`PostProcessError::MissingSvgTag`] if there is no `<svg`
/// opening tag, even when a `<title>` is present.
pub fn inject_title(markup: &str, title: &str) -> Result<String, PostProcessError> {
    let tag = SVG_OPEN.find(markup).ok_or(PostProcessError::MissingSvgTag)?;
    let escaped = escape_html(title);

    if TITLE.is_match(markup) {
        let replaced = TITLE.replacen(markup, 1, |caps: &Captures<'_>| {
            let attributes = caps.get(1).map_or("", |m| m.as_str());
            format!("<title{attributes}>{escaped}</title>")
        });
        return Ok(replaced.into_owned());
    }

    let before = &markup[..tag.start()];
    let after = &markup[tag.end()..];

    let titled = match tag.as_str().strip_suffix("/>") {
        Some(open) => format!(
            "{before}{}><title>{escaped}</title></svg>{after}",
            open.trim_end()
        ),
        None => format!("{before}{}<title>{escaped}</title>{after}", tag.as_str()),
    };

    Ok(titled)
}

/// Overrides `width`/`height` on the first `<svg>` tag
///
/// Values must be non-negative numbers with an optional `px` suffix and are
/// written with `px`. Anything else, or markup without `<svg>`, is left
/// untouched.
///
/// ```rust
/// use acton_svg::postprocess::apply_dimensions;
///
/// let markup = r#"<svg width="100" viewBox="0 0 1 1"><rect/></svg>"#;
/// assert_eq!(
///     apply_dimensions(markup, Some("32"), Some("24px")),
///     r#"<svg viewBox="0 0 1 1" width="32px" height="24px"><rect/></svg>"#
/// );
/// ```
#[must_use]
pub fn apply_dimensions(markup: &str, width: Option<&str>, height: Option<&str>) -> String {
    let width = width.and_then(pixel_value);
    let height = height.and_then(pixel_value);
    if width.is_none() && height.is_none() {
        return markup.to_string();
    }

    let Some(tag) = SVG_OPEN.find(markup) else {
        return markup.to_string();
    };

    let mut open_tag = tag.as_str().to_string();
    let mut added = String::new();
    if let Some(width) = width {
        open_tag = WIDTH_ATTR.replace_all(&open_tag, "").into_owned();
        added.push_str(&format!(" width=\"{width}\""));
    }
    if let Some(height) = height {
        open_tag = HEIGHT_ATTR.replace_all(&open_tag, "").into_owned();
        added.push_str(&format!(" height=\"{height}\""));
    }

    let (head, close) = open_tag
        .strip_suffix("/>")
        .map_or_else(|| (&open_tag[..open_tag.len() - 1], ">"), |head| (head, "/>"));

    format!(
        "{}{}{added}{close}{}",
        &markup[..tag.start()],
        head.trim_end(),
        &markup[tag.end()..]
    )
}

/// Normalizes a dimension to `<number>px`
pub(crate) fn pixel_value(value: &str) -> Option<String> {
    let number = value.trim();
    let number = number.strip_suffix("px").unwrap_or(number).trim_end();
    let parsed: f64 = number.parse().ok()?;

    (parsed.is_finite() && parsed >= 0.0 && number.bytes().all(|b| b.is_ascii_digit() || b == b'.'))
        .then(|| format!("{number}px"))
}
