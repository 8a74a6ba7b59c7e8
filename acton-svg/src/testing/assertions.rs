//! Assertion helpers for sanitized markup and rendered elements

use crate::render::{ElementKind, ImageDescriptor, ViewElement};
use crate::sanitize::SanitizedMarkup;
use regex::Regex;

/// Assert that markup contains nothing executable
///
/// # Panics
///
/// Panics if the markup contains a script element, an event handler
/// attribute, an entity declaration or a `javascript:` URL
pub fn assert_safe_markup(markup: &SanitizedMarkup) {
    let lowered = markup.as_str().to_ascii_lowercase();
    for needle in ["<script", "<!entity", "<!doctype", "<foreignobject", "javascript:"] {
        assert!(
            !lowered.contains(needle),
            "Sanitized markup contains {needle:?}: {markup}"
        );
    }

    let handler = Regex::new(r#"<[a-z][^\s/>]*(?:\s+[^\s=/>]+="[^"]*")*\s+on[a-z]+="#)
        .expect("Invalid regex");
    assert!(
        !handler.is_match(&lowered),
        "Sanitized markup contains an event handler: {markup}"
    );
}

/// Assert that an element is inline markup (linked or not) and return it
///
/// # Panics
///
/// Panics if the element is an image reference
pub fn assert_inline(element: &ViewElement) -> &SanitizedMarkup {
    let markup = element
        .markup()
        .unwrap_or_else(|| panic!("Expected inline markup, got {:?}", element.kind));
    assert_safe_markup(markup);
    markup
}

/// Assert that an element is an image reference and return its descriptor
///
/// # Panics
///
/// Panics if the element is inline markup
pub fn assert_image_reference(element: &ViewElement) -> &ImageDescriptor {
    match &element.kind {
        ElementKind::ImageReference(image) => image,
        other => panic!("Expected image reference, got {other:?}"),
    }
}
