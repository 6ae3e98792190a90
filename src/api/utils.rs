//! API utility functions
//!
//! Pure, stateless helpers for HTTP request processing, kept out of
//! services.rs so they can be unit tested.

use axum::http::{HeaderMap, header};

use crate::api::error::ApiError;
use crate::handlers::ParamsMap;

pub const AUTH_KEY_HEADER: &str = "x-auth-key";

/// Parses and validates Content-Type header for application/json
///
/// Accepts:
/// - `application/json`
/// - `application/json; charset=utf-8`
///
/// Rejects:
/// - `application/jsonp`
/// - `application/json-patch+json`
/// - `text/json`
/// - Malformed media types
pub fn parse_content_type(content_type: &str) -> Result<mime::Mime, ApiError> {
    let media_type: mime::Mime = content_type.parse().map_err(|_| {
        ApiError::InvalidPayload(format!("invalid Content-Type: {}", content_type))
    })?;

    if media_type.type_() != mime::APPLICATION || media_type.subtype() != mime::JSON {
        return Err(ApiError::InvalidPayload(format!(
            "Content-Type must be application/json, got: {}/{}",
            media_type.type_(),
            media_type.subtype()
        )));
    }

    Ok(media_type)
}

/// Rejects a request whose declared Content-Length is over the limit
/// before any of the body is read
pub fn validate_content_length(headers: &HeaderMap, max_size: usize) -> Result<(), ApiError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared {
        Some(len) if len > max_size as u64 => Err(ApiError::PayloadTooLarge(max_size)),
        _ => Ok(()),
    }
}

/// Compares the presented key with the shared secret without short-circuiting
pub fn secret_matches(presented: &str, secret: &str) -> bool {
    let (a, b) = (presented.as_bytes(), secret.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Headers forwarded to handlers. The shared secret is never forwarded.
/// Repeated headers are joined with `", "` in arrival order.
pub fn forwarded_headers(headers: &HeaderMap) -> ParamsMap {
    let mut forwarded = ParamsMap::new();
    for (name, value) in headers {
        if name.as_str() == AUTH_KEY_HEADER {
            continue;
        }
        let Ok(value) = value.to_str() else {
            continue;
        };
        forwarded
            .entry(name.as_str().to_string())
            .and_modify(|joined: &mut String| {
                joined.push_str(", ");
                joined.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_content_type_valid() {
        assert!(parse_content_type("application/json").is_ok());
        assert!(parse_content_type("application/json; charset=utf-8").is_ok());
        assert!(parse_content_type("application/json; charset=UTF-8").is_ok());
    }

    #[test]
    fn test_parse_content_type_invalid() {
        assert!(parse_content_type("application/jsonp").is_err());
        assert!(parse_content_type("application/json-patch+json").is_err());
        assert!(parse_content_type("text/json").is_err());
        assert!(parse_content_type("text/plain").is_err());
        assert!(parse_content_type("invalid").is_err());
        assert!(parse_content_type("").is_err());
    }

    #[test]
    fn test_validate_content_length() {
        let mut headers = HeaderMap::new();
        assert!(validate_content_length(&headers, 100).is_ok());

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("1000"));
        assert!(validate_content_length(&headers, 1000).is_ok());

        match validate_content_length(&headers, 999) {
            Err(ApiError::PayloadTooLarge(limit)) => assert_eq!(limit, 999),
            _ => panic!("Expected PayloadTooLarge error"),
        }
    }

    #[test]
    fn test_secret_matches() {
        assert!(secret_matches("link", "link"));
        assert!(!secret_matches("lin", "link"));
        assert!(!secret_matches("lunk", "link"));
        assert!(!secret_matches("", "link"));
    }

    #[test]
    fn test_forwarded_headers_drop_secret() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_KEY_HEADER, HeaderValue::from_static("link"));
        headers.insert("x-request-id", HeaderValue::from_static("abc"));

        let forwarded = forwarded_headers(&headers);
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded["x-request-id"], "abc");
    }

    #[test]
    fn test_forwarded_headers_join_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        headers.append("x-forwarded-for", HeaderValue::from_static("10.0.0.2"));

        let forwarded = forwarded_headers(&headers);
        assert_eq!(forwarded["x-forwarded-for"], "10.0.0.1, 10.0.0.2");
    }
}
