//! Synthesized fallback responses
//!
//! When both the network and the cache come up empty the router still has
//! to answer. These constructors produce the three fallback shapes: the
//! offline document for navigations, a structured JSON error for API
//! calls, and an inline SVG placeholder for images.

use crate::router::{ResponseSource, RoutedResponse};

/// Minimal offline document served when the configured fallback page was
/// never cached
const BUILTIN_OFFLINE_HTML: &str = "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Offline</title></head>\n<body><h1>You are offline</h1><p>This page is not available without a network connection.</p></body>\n</html>\n";

/// Placeholder shown in place of images that failed to load, 200x200
const PLACEHOLDER_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"200\" viewBox=\"0 0 200 200\"><rect width=\"200\" height=\"200\" fill=\"#f3f4f6\"/><text x=\"100\" y=\"100\" text-anchor=\"middle\" dy=\".3em\" fill=\"#9ca3af\">Offline</text></svg>";

/// Structured offline error for failed API calls
///
/// Fixed shape so API consumers can branch on it instead of crashing.
pub fn offline_api_error() -> RoutedResponse {
    let body = serde_json::json!({
        "error": "Offline",
        "message": "This content is not available offline",
    });
    RoutedResponse {
        status: 503,
        content_type: Some("application/json".to_string()),
        headers: Vec::new(),
        body: body.to_string().into_bytes(),
        source: ResponseSource::Fallback,
    }
}

/// The built-in offline document, used when nothing was ever cached
pub fn builtin_offline_document() -> RoutedResponse {
    RoutedResponse {
        status: 200,
        content_type: Some("text/html; charset=utf-8".to_string()),
        headers: Vec::new(),
        body: BUILTIN_OFFLINE_HTML.as_bytes().to_vec(),
        source: ResponseSource::Fallback,
    }
}

/// Inline vector placeholder for failed image loads
pub fn placeholder_image() -> RoutedResponse {
    RoutedResponse {
        status: 200,
        content_type: Some("image/svg+xml".to_string()),
        headers: Vec::new(),
        body: PLACEHOLDER_SVG.as_bytes().to_vec(),
        source: ResponseSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_api_error_shape() {
        let response = offline_api_error();
        assert_eq!(response.status, 503);
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "Offline");
        assert!(body["message"].is_string());
    }

    #[test]
    fn test_placeholder_is_svg_with_fixed_dimensions() {
        let response = placeholder_image();
        assert_eq!(response.content_type.as_deref(), Some("image/svg+xml"));
        let svg = String::from_utf8(response.body).unwrap();
        assert!(svg.contains("width=\"200\""));
        assert!(svg.contains("height=\"200\""));
    }

    #[test]
    fn test_builtin_offline_document_is_html() {
        let response = builtin_offline_document();
        assert_eq!(response.status, 200);
        assert!(response
            .content_type
            .as_deref()
            .unwrap()
            .starts_with("text/html"));
    }
}
