//! SVG sanitization
//!
//! Uploaded SVG files are documents, not pictures: they can carry scripts,
//! event handlers, external entity declarations and remote references. Before
//! SVG markup is inlined into a page it goes through an [`SvgSanitizer`],
//! which is the only way to obtain [`SanitizedMarkup`] from untrusted bytes.
//!
//! [`AllowlistSanitizer`] streams the document with `quick-xml` and rebuilds
//! it from allowlisted elements and attributes only. Anything it does not
//! know is removed:
//!
//! - XML declarations, DOCTYPEs (with their entity declarations), comments
//!   and processing instructions
//! - Elements outside the allowlist, with their whole subtree
//! - Event handlers and every attribute outside the allowlist
//! - References other than `#fragment` (and, on `<image>`, inline rasters)
//! - Stylesheets and values that execute script or load remote resources
//!
//! # Examples
//!
//! ```rust
//! use acton_svg::sanitize::{AllowlistSanitizer, SvgSanitizer};
//!
//! let sanitizer = AllowlistSanitizer::default();
//! let markup = sanitizer
//!     .sanitize(br#"<svg onload="alert(1)"><script>alert(2)</script><rect width="4"/></svg>"#)
//!     .unwrap();
//!
//! assert_eq!(markup.as_str(), r#"<svg><rect width="4"/></svg>"#);
//! ```

pub mod markup;
pub mod policy;

pub use markup::{escape_html, SanitizedMarkup};

use quick_xml::events::{BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default input size limit (5 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Sanitization errors
///
/// Any of these means the file must not be rendered inline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// Input is not valid UTF-8
    #[error("Invalid encoding: {0}")]
    Encoding(String),

    /// Input exceeds the configured size limit
    #[error("SVG of {actual} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// Input size
        actual: u64,
        /// Configured limit
        limit: u64,
    },

    /// Markup could not be parsed
    #[error("Malformed SVG: {0}")]
    Malformed(String),

    /// Root element is not `<svg>`
    #[error("Root element is not <svg>: {0}")]
    NotSvg(String),

    /// Nothing left to render
    #[error("SVG is empty")]
    Empty,
}

/// Result type for sanitization
pub type SanitizeResult<T> = Result<T, SanitizeError>;

/// Turns untrusted SVG bytes into markup that is safe to inline
#[cfg_attr(test, mockall::automock)]
pub trait SvgSanitizer: Send + Sync {
    /// Sanitizes raw SVG bytes
    ///
    /// # Errors
    ///
    /// Returns a [`SanitizeError`] when the input cannot be made safe.
    fn sanitize(&self, raw: &[u8]) -> SanitizeResult<SanitizedMarkup>;
}

/// Sanitizer settings (`[sanitizer]` configuration section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Largest input accepted, in bytes
    pub max_bytes: u64,

    /// Keep base64 PNG/JPEG/GIF/WebP `data:` URIs on `<image>`
    pub allow_data_images: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            allow_data_images: true,
        }
    }
}

/// What a sanitization pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    /// Elements removed with their subtree
    pub removed_elements: usize,
    /// Attributes dropped from kept elements
    pub removed_attributes: usize,
    /// Declarations, comments, processing instructions and unknown entities
    pub removed_nodes: usize,
    /// Stylesheets dropped for unsafe content
    pub removed_styles: usize,
}

impl SanitizeReport {
    /// Total number of removals
    #[must_use]
    pub const fn total(&self) -> usize {
        self.removed_elements + self.removed_attributes + self.removed_nodes + self.removed_styles
    }

    /// Whether the input passed through unchanged apart from formatting
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Allowlist-based SVG sanitizer
#[derive(Debug, Clone, Default)]
pub struct AllowlistSanitizer {
    options: SanitizeOptions,
}

impl AllowlistSanitizer {
    /// Creates a sanitizer with the given options
    #[must_use]
    pub const fn new(options: SanitizeOptions) -> Self {
        Self { options }
    }

    /// Returns the active options
    #[must_use]
    pub const fn options(&self) -> &SanitizeOptions {
        &self.options
    }

    /// Sanitizes and reports what was removed
    ///
    /// # Errors
    ///
    /// See [`SanitizeError`].
    pub fn sanitize_with_report(
        &self,
        raw: &[u8],
    ) -> SanitizeResult<(SanitizedMarkup, SanitizeReport)> {
        let actual = raw.len() as u64;
        let limit = self.options.max_bytes;
        if actual > limit {
            return Err(SanitizeError::TooLarge { actual, limit });
        }

        let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
        let input = std::str::from_utf8(raw).map_err(|e| SanitizeError::Encoding(e.to_string()))?;
        if input.trim().is_empty() {
            return Err(SanitizeError::Empty);
        }

        let mut cleaner = Cleaner::new(&self.options);
        cleaner.run(input)?;
        let (markup, report) = cleaner.finish()?;

        tracing::debug!(
            removed_elements = report.removed_elements,
            removed_attributes = report.removed_attributes,
            removed_nodes = report.removed_nodes,
            removed_styles = report.removed_styles,
            "SVG sanitized"
        );

        Ok((markup, report))
    }
}

impl SvgSanitizer for AllowlistSanitizer {
    fn sanitize(&self, raw: &[u8]) -> SanitizeResult<SanitizedMarkup> {
        self.sanitize_with_report(raw).map(|(markup, _)| markup)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    NotSeen,
    Open,
    Closed,
}

/// State of one sanitization pass
struct Cleaner<'o> {
    options: &'o SanitizeOptions,
    writer: Writer<Vec<u8>>,
    /// Names of kept elements that are still open
    open: Vec<String>,
    /// Kept start tag not yet written; becomes `<x/>` if nothing is emitted inside
    pending: Option<BytesStart<'static>>,
    /// Depth inside a removed subtree
    skip_depth: usize,
    root: Root,
    /// Stylesheet text collected inside `<style>`
    style: Option<String>,
    report: SanitizeReport,
}

impl<'o> Cleaner<'o> {
    fn new(options: &'o SanitizeOptions) -> Self {
        Self {
            options,
            writer: Writer::new(Vec::new()),
            open: Vec::new(),
            pending: None,
            skip_depth: 0,
            root: Root::NotSeen,
            style: None,
            report: SanitizeReport::default(),
        }
    }

    fn run(&mut self, input: &str) -> SanitizeResult<()> {
        let mut reader = Reader::from_str(input);

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(error) => {
                    return Err(SanitizeError::Malformed(format!(
                        "{error} at byte {}",
                        reader.error_position()
                    )))
                }
            };

            match event {
                Event::Start(elem) => self.start(&elem, false)?,
                Event::Empty(elem) => self.start(&elem, true)?,
                Event::End(_) => self.end()?,
                Event::Text(text) => {
                    let text = text.decode().map_err(|e| SanitizeError::Encoding(e.to_string()))?;
                    self.text(&text)?;
                }
                Event::CData(cdata) => {
                    let text = cdata.decode().map_err(|e| SanitizeError::Encoding(e.to_string()))?;
                    self.text(&text)?;
                }
                Event::GeneralRef(reference) => self.reference(&reference)?,
                Event::Decl(_) | Event::DocType(_) | Event::PI(_) | Event::Comment(_) => {
                    self.report.removed_nodes += 1;
                }
                Event::Eof => break,
            }
        }

        Ok(())
    }

    fn finish(self) -> SanitizeResult<(SanitizedMarkup, SanitizeReport)> {
        if self.root == Root::NotSeen {
            return Err(SanitizeError::NotSvg("no root element".to_string()));
        }
        if let Some(name) = self.open.last() {
            return Err(SanitizeError::Malformed(format!("unclosed element <{name}>")));
        }
        if self.skip_depth > 0 {
            return Err(SanitizeError::Malformed("unclosed element".to_string()));
        }

        let markup = String::from_utf8(self.writer.into_inner())
            .map_err(|e| SanitizeError::Encoding(e.to_string()))?;
        if markup.is_empty() {
            return Err(SanitizeError::Empty);
        }

        Ok((SanitizedMarkup::new(markup), self.report))
    }

    fn start(&mut self, elem: &BytesStart<'_>, empty: bool) -> SanitizeResult<()> {
        if self.skip_depth > 0 {
            if !empty {
                self.skip_depth += 1;
            }
            return Ok(());
        }

        let name = utf8(elem.name().as_ref())?.to_owned();

        match self.root {
            Root::NotSeen if name != "svg" => return Err(SanitizeError::NotSvg(name)),
            Root::NotSeen => self.root = Root::Open,
            Root::Closed => {
                self.remove_subtree(empty);
                return Ok(());
            }
            Root::Open => {}
        }

        // <style> holds text only
        if !policy::is_allowed_element(&name) || self.style.is_some() {
            self.remove_subtree(empty);
            return Ok(());
        }

        self.flush_pending()?;
        let clean = self.clean_start(&name, elem)?;

        if empty {
            self.write(Event::Empty(clean))?;
            if self.open.is_empty() {
                self.root = Root::Closed;
            }
        } else {
            if name == "style" {
                self.style = Some(String::new());
            }
            self.pending = Some(clean);
            self.open.push(name);
        }

        Ok(())
    }

    fn end(&mut self) -> SanitizeResult<()> {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return Ok(());
        }

        let Some(name) = self.open.pop() else {
            return Err(SanitizeError::Malformed("unexpected closing tag".to_string()));
        };

        if let Some(css) = self.style.take() {
            if policy::is_safe_value(&css) {
                if !css.is_empty() {
                    self.flush_pending()?;
                    self.write(Event::Text(BytesText::new(&css)))?;
                }
            } else {
                self.report.removed_styles += 1;
            }
        }

        match self.pending.take() {
            Some(start) => self.write(Event::Empty(start))?,
            None => self.write(Event::End(BytesEnd::new(name)))?,
        }

        if self.open.is_empty() {
            self.root = Root::Closed;
        }

        Ok(())
    }

    fn text(&mut self, text: &str) -> SanitizeResult<()> {
        if self.skip_depth > 0 || self.open.is_empty() || text.is_empty() {
            return Ok(());
        }
        if let Some(css) = self.style.as_mut() {
            css.push_str(text);
            return Ok(());
        }

        self.flush_pending()?;
        self.write(Event::Text(BytesText::new(text)))
    }

    /// Resolves character references and the five predefined entities
    ///
    /// Any other entity is dropped unexpanded.
    fn reference(&mut self, reference: &BytesRef<'_>) -> SanitizeResult<()> {
        if self.skip_depth > 0 || self.open.is_empty() {
            return Ok(());
        }

        let resolved = if reference.is_char_ref() {
            reference
                .resolve_char_ref()
                .map_err(|e| SanitizeError::Malformed(e.to_string()))?
        } else {
            let name = reference
                .decode()
                .map_err(|e| SanitizeError::Encoding(e.to_string()))?;
            predefined_entity(&name)
        };

        match resolved {
            Some(c) => {
                let mut buf = [0u8; 4];
                self.text(c.encode_utf8(&mut buf))
            }
            None => {
                self.report.removed_nodes += 1;
                Ok(())
            }
        }
    }

    fn remove_subtree(&mut self, empty: bool) {
        self.report.removed_elements += 1;
        if !empty {
            self.skip_depth = 1;
        }
    }

    /// Rebuilds a start tag from allowlisted attributes
    fn clean_start(&mut self, name: &str, elem: &BytesStart<'_>) -> SanitizeResult<BytesStart<'static>> {
        let mut clean = BytesStart::new(name.to_owned());

        for attribute in elem.attributes() {
            let attribute = attribute.map_err(|e| SanitizeError::Malformed(e.to_string()))?;
            let key = utf8(attribute.key.as_ref())?;
            let value = attribute.unescape_value().ok();

            match value {
                Some(value) if self.allows_attribute(name, key, &value) => {
                    clean.push_attribute((key, value.as_ref()));
                }
                _ => self.report.removed_attributes += 1,
            }
        }

        Ok(clean)
    }

    fn allows_attribute(&self, element: &str, key: &str, value: &str) -> bool {
        match key {
            "xmlns" => value == policy::SVG_NAMESPACE,
            "xmlns:xlink" => value == policy::XLINK_NAMESPACE,
            "href" | "xlink:href" => {
                policy::is_local_reference(value)
                    || (self.options.allow_data_images
                        && policy::accepts_data_image(element)
                        && policy::is_data_image(value))
            }
            _ => policy::is_allowed_attribute(key) && policy::is_safe_value(value),
        }
    }

    fn flush_pending(&mut self) -> SanitizeResult<()> {
        if let Some(start) = self.pending.take() {
            self.write(Event::Start(start))?;
        }
        Ok(())
    }

    fn write(&mut self, event: Event<'_>) -> SanitizeResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| SanitizeError::Malformed(e.to_string()))
    }
}

fn utf8(bytes: &[u8]) -> SanitizeResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| SanitizeError::Encoding(e.to_string()))
}

fn predefined_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}
