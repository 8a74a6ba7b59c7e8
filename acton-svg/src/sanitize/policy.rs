//! Allowlists and value checks for SVG sanitization
//!
//! Names are matched case-sensitively, as SVG is XML: `viewBox` is allowed,
//! `VIEWBOX` is not.

use phf::phf_set;

/// SVG namespace URI, the only value accepted for `xmlns`
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// `XLink` namespace URI, the only value accepted for `xmlns:xlink`
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Elements that only contribute to rendering
///
/// Scripting, foreign content and animation elements are absent: animation
/// can rewrite `href` at runtime (`<set attributeName="href" to="javascript:…">`).
static ALLOWED_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "svg", "g", "defs", "symbol", "use", "switch", "view",
    "title", "desc", "style", "a",
    "path", "rect", "circle", "ellipse", "line", "polyline", "polygon",
    "text", "tspan", "textPath",
    "linearGradient", "radialGradient", "stop", "pattern",
    "clipPath", "mask", "marker", "image",
    "filter", "feBlend", "feColorMatrix", "feComponentTransfer", "feComposite",
    "feConvolveMatrix", "feDiffuseLighting", "feDisplacementMap", "feDistantLight",
    "feDropShadow", "feFlood", "feFuncA", "feFuncB", "feFuncG", "feFuncR",
    "feGaussianBlur", "feImage", "feMerge", "feMergeNode", "feMorphology",
    "feOffset", "fePointLight", "feSpecularLighting", "feSpotLight", "feTile",
    "feTurbulence",
};

/// Presentation, geometry and accessibility attributes
///
/// `href`, `xlink:href` and the namespace declarations are handled
/// separately because their values need stricter checks.
static ALLOWED_ATTRIBUTES: phf::Set<&'static str> = phf_set! {
    // core
    "id", "class", "style", "lang", "xml:lang", "xml:space", "version", "baseProfile",
    "role", "aria-label", "aria-labelledby", "aria-describedby", "aria-hidden",
    "systemLanguage", "type", "media",
    // geometry
    "x", "y", "x1", "y1", "x2", "y2", "cx", "cy", "r", "rx", "ry", "fr", "fx", "fy",
    "dx", "dy", "width", "height", "d", "points", "pathLength", "transform",
    "transform-origin", "viewBox", "preserveAspectRatio", "rotate", "z",
    // painting
    "fill", "fill-opacity", "fill-rule", "stroke", "stroke-dasharray",
    "stroke-dashoffset", "stroke-linecap", "stroke-linejoin", "stroke-miterlimit",
    "stroke-opacity", "stroke-width", "opacity", "color", "paint-order",
    "vector-effect", "display", "visibility", "overflow", "clip", "clip-path",
    "clip-rule", "clipPathUnits", "mask", "maskUnits", "maskContentUnits",
    "marker-start", "marker-mid", "marker-end", "markerWidth", "markerHeight",
    "markerUnits", "orient", "refX", "refY", "shape-rendering", "image-rendering",
    "color-interpolation", "color-interpolation-filters", "color-rendering",
    // gradients and patterns
    "gradientTransform", "gradientUnits", "spreadMethod", "offset", "stop-color",
    "stop-opacity", "patternContentUnits", "patternTransform", "patternUnits",
    // text
    "font-family", "font-size", "font-size-adjust", "font-stretch", "font-style",
    "font-variant", "font-weight", "letter-spacing", "word-spacing", "text-anchor",
    "text-decoration", "text-rendering", "textLength", "lengthAdjust", "startOffset",
    "dominant-baseline", "alignment-baseline", "baseline-shift", "direction",
    "writing-mode", "unicode-bidi", "kerning",
    // filters
    "filter", "filterUnits", "primitiveUnits", "in", "in2", "result", "mode",
    "operator", "k1", "k2", "k3", "k4", "values", "stdDeviation", "edgeMode",
    "flood-color", "flood-opacity", "lighting-color", "surfaceScale",
    "diffuseConstant", "specularConstant", "specularExponent", "kernelMatrix",
    "kernelUnitLength", "order", "divisor", "bias", "targetX", "targetY",
    "preserveAlpha", "azimuth", "elevation", "pointsAtX", "pointsAtY", "pointsAtZ",
    "limitingConeAngle", "radius", "scale", "xChannelSelector", "yChannelSelector",
    "baseFrequency", "numOctaves", "seed", "stitchTiles", "tableValues", "slope",
    "intercept", "amplitude", "exponent",
};

/// Fragments that make a value executable or load external resources
const FORBIDDEN_FRAGMENTS: &[&str] = &[
    "javascript:",
    "vbscript:",
    "livescript:",
    "expression(",
    "@import",
    "-moz-binding",
    "behavior:",
    "image-set(",
    "\\",
];

/// Raster formats accepted in `data:` URIs on `<image>`
const DATA_IMAGE_PREFIXES: &[&str] = &[
    "data:image/png;base64,",
    "data:image/jpeg;base64,",
    "data:image/jpg;base64,",
    "data:image/gif;base64,",
    "data:image/webp;base64,",
];

/// Whether an element survives sanitization
#[must_use]
pub fn is_allowed_element(name: &str) -> bool {
    ALLOWED_ELEMENTS.contains(name)
}

/// Whether an attribute name is on the general allowlist
#[must_use]
pub fn is_allowed_attribute(name: &str) -> bool {
    ALLOWED_ATTRIBUTES.contains(name)
}

/// Elements whose `href` may carry an embedded raster image
#[must_use]
pub fn accepts_data_image(element: &str) -> bool {
    matches!(element, "image" | "feImage")
}

/// Lowercases and removes whitespace and control characters
///
/// Browsers ignore embedded tabs and newlines in URL schemes, so
/// `java\tscript:` must be caught as well.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether a reference points inside the same document (`#id`)
#[must_use]
pub fn is_local_reference(value: &str) -> bool {
    let value = value.trim();
    value.starts_with('#') && is_safe_value(value)
}

/// Whether a reference is an inline base64 raster image
#[must_use]
pub fn is_data_image(value: &str) -> bool {
    let normalized = normalize(value);
    DATA_IMAGE_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
        && normalized
            .chars()
            .skip_while(|c| *c != ',')
            .skip(1)
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
}

/// Whether an attribute value or stylesheet is free of script and remote loads
///
/// Every `url(...)` must point at a local fragment.
#[must_use]
pub fn is_safe_value(value: &str) -> bool {
    let normalized = normalize(value);

    if FORBIDDEN_FRAGMENTS
        .iter()
        .any(|fragment| normalized.contains(fragment))
    {
        return false;
    }

    normalized.match_indices("url(").all(|(index, token)| {
        normalized[index + token.len()..]
            .trim_start_matches(['"', '\''])
            .starts_with('#')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_allowlist_is_case_sensitive() {
        assert!(is_allowed_element("linearGradient"));
        assert!(!is_allowed_element("lineargradient"));
        assert!(!is_allowed_element("script"));
        assert!(!is_allowed_element("foreignObject"));
        assert!(!is_allowed_element("set"));
        assert!(!is_allowed_element("animate"));
    }

    #[test]
    fn test_attribute_allowlist() {
        assert!(is_allowed_attribute("viewBox"));
        assert!(is_allowed_attribute("stroke-width"));
        assert!(!is_allowed_attribute("onload"));
        assert!(!is_allowed_attribute("onclick"));
        assert!(!is_allowed_attribute("href"));
        assert!(!is_allowed_attribute("inkscape:label"));
    }

    #[test]
    fn test_local_reference() {
        assert!(is_local_reference("#grad1"));
        assert!(is_local_reference("  #icon "));
        assert!(!is_local_reference("http://evil.example/x.svg#a"));
        assert!(!is_local_reference("javascript:alert(1)"));
        assert!(!is_local_reference("/files/a.svg"));
    }

    #[test]
    fn test_data_image() {
        assert!(is_data_image("data:image/png;base64,iVBORw0KGgo="));
        assert!(is_data_image("DATA:image/JPEG;base64,/9j/4AAQ"));
        assert!(!is_data_image("data:image/svg+xml;base64,PHN2Zz4="));
        assert!(!is_data_image("data:text/html;base64,PHNjcmlwdD4="));
        assert!(!is_data_image("data:image/png;base64,abc\"onload=x"));
    }

    #[test]
    fn test_safe_values() {
        assert!(is_safe_value("fill:red;stroke:#000"));
        assert!(is_safe_value("url(#grad1)"));
        assert!(is_safe_value("url('#grad1') url(\"#b\")"));
        assert!(is_safe_value("translate(10 20) rotate(45)"));
    }

    #[test]
    fn test_unsafe_values() {
        assert!(!is_safe_value("javascript:alert(1)"));
        assert!(!is_safe_value("JaVa\tScRiPt:alert(1)"));
        assert!(!is_safe_value("background:url(http://evil.example/x.png)"));
        assert!(!is_safe_value("fill: url( 'https://evil.example/#a')"));
        assert!(!is_safe_value("width: expression(alert(1))"));
        assert!(!is_safe_value("@import 'https://evil.example/a.css';"));
        assert!(!is_safe_value("\\6a avascript:alert(1)"));
        assert!(!is_safe_value("background-image:image-set('https://evil.example/t.png' 1x)"));
        assert!(!is_safe_value("background-image: -webkit-image-set(\"https://evil.example/u.png\" 1x)"));
    }
}
