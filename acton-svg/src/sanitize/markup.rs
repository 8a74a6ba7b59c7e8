//! Trusted markup type and HTML escaping

use serde::Serialize;
use std::fmt;

/// Markup that is safe to embed verbatim in an HTML page
///
/// Values only come from a sanitizer or from [`SanitizedMarkup::from_text`],
/// so holding one is proof that untrusted bytes went through one of them.
/// There is intentionally no `Deserialize` or `From<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SanitizedMarkup(String);

impl SanitizedMarkup {
    /// Wraps markup produced inside this crate
    pub(crate) const fn new(markup: String) -> Self {
        Self(markup)
    }

    /// Escapes plain text so it renders literally
    ///
    /// ```rust
    /// use acton_svg::sanitize::SanitizedMarkup;
    ///
    /// let markup = SanitizedMarkup::from_text("<b>Tom & Jerry</b>");
    /// assert_eq!(markup.as_str(), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
    /// ```
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self(escape_html(text))
    }

    /// Borrows the markup
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the markup is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for SanitizedMarkup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escapes `&`, `<`, `>`, `"` and `'`
///
/// The result is safe both as element text and inside a quoted attribute.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    push_escaped(&mut escaped, input);
    escaped
}

pub(crate) fn push_escaped(out: &mut String, input: &str) {
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html(r#"<a href="x" title='y'>&</a>"#),
            "&lt;a href=&quot;x&quot; title=&#39;y&#39;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_from_text_is_inert() {
        let markup = SanitizedMarkup::from_text("<script>alert(1)</script>");
        assert!(!markup.as_str().contains('<'));
        assert_eq!(markup.to_string(), markup.as_str());
    }

    #[test]
    fn test_serializes_as_string() {
        let markup = SanitizedMarkup::new("<svg/>".to_string());
        assert_eq!(serde_json::to_string(&markup).unwrap(), r#""<svg/>""#);
    }
}
