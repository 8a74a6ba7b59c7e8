//! SVG detection with content sniffing
//!
//! Decides whether a file really is an SVG document. The filename extension
//! is never trusted on its own: an attacker can name any payload `logo.svg`.
//! Detection looks at the bytes instead:
//!
//! 1. Binary signatures (magic numbers) are checked with the `infer` crate;
//!    anything recognised as a non-text type is rejected.
//! 2. The document is parsed up to its first element, which must be `<svg>`.
//! 3. In strict mode, the declared MIME type must not contradict the content.
//!
//! Empty and not-yet-loaded files are never SVG.
//!
//! # Examples
//!
//! ```rust
//! use acton_svg::storage::{FileItem, SvgDetector};
//!
//! let detector = SvgDetector::new();
//!
//! let svg = FileItem::new("1", "public://icon.bin", "icon.bin", "image/svg+xml")
//!     .with_content(br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#.to_vec());
//! assert!(detector.is_svg(&svg));
//!
//! // Claims to be SVG, but is a PNG
//! let fake = FileItem::new("2", "public://fake.svg", "fake.svg", "image/svg+xml")
//!     .with_content(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
//! assert!(!detector.is_svg(&fake));
//! ```

use super::types::FileItem;
use quick_xml::events::Event;
use quick_xml::Reader;

/// MIME type registered for SVG documents
pub const SVG_MIME: &str = "image/svg+xml";

/// Declared types that carry no claim about the content
const GENERIC_MIME_TYPES: &[&str] = &[
    "",
    "application/octet-stream",
    "application/xml",
    "text/xml",
    "text/plain",
];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// SVG classifier using content inspection
#[derive(Debug, Clone, Copy)]
pub struct SvgDetector {
    /// Whether the declared MIME type must agree with the content
    strict: bool,
}

impl Default for SvgDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgDetector {
    /// Creates a detector in strict mode
    #[must_use]
    pub const fn new() -> Self {
        Self { strict: true }
    }

    /// Creates a detector that ignores the declared MIME type
    ///
    /// **Warning**: only the content decides; use when upload metadata is
    /// known to be unreliable.
    #[must_use]
    pub const fn permissive() -> Self {
        Self { strict: false }
    }

    /// Detects a binary MIME type from magic numbers
    ///
    /// Returns `None` if no signature matches.
    #[must_use]
    pub fn detect_mime(&self, data: &[u8]) -> Option<&'static str> {
        infer::get(data).map(|kind| kind.mime_type())
    }

    /// Classifies a loaded file
    ///
    /// Fails closed: an unloaded or empty file is not SVG.
    #[must_use]
    pub fn is_svg(&self, file: &FileItem) -> bool {
        let Some(data) = file.content() else {
            return false;
        };
        if data.is_empty() {
            return false;
        }
        if self.strict && !declared_type_allows_svg(&file.content_type) {
            return false;
        }
        if infer::get(data).is_some_and(|kind| kind.matcher_type() != infer::MatcherType::Text) {
            return false;
        }

        root_element_is_svg(data)
    }

    /// Whether the upload metadata claims the file is SVG
    ///
    /// This reads nothing and proves nothing. It is only suitable for
    /// cosmetic decisions (such as sizing an `<img>`), never for deciding
    /// whether markup may be inlined.
    #[must_use]
    pub fn declares_svg(&self, file: &FileItem) -> bool {
        normalize_mime(&file.content_type) == SVG_MIME
            || file
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    }
}

/// Lowercases a MIME type and drops its parameters
fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn declared_type_allows_svg(content_type: &str) -> bool {
    let mime = normalize_mime(content_type);
    mime == SVG_MIME || GENERIC_MIME_TYPES.contains(&mime.as_str())
}

/// Parses up to the first element and checks its local name
fn root_element_is_svg(data: &[u8]) -> bool {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = Reader::from_reader(data);

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem) | Event::Empty(elem)) => {
                return elem.local_name().as_ref() == b"svg";
            }
            Ok(Event::Text(text)) => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return false;
                }
            }
            Ok(Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
            Ok(_) | Err(_) => return false,
        }
    }
}
