//! Client identification utilities
//!
//! Helpers for reading caller credentials out of HTTP headers.

use axum::http::{HeaderMap, header};

/// Authorization scheme prefix, matched case-insensitively.
const BEARER_PREFIX: &str = "bearer ";

/// Extract the bearer token from the `Authorization` header.
///
/// Returns `None` when the header is absent, not UTF-8, uses another scheme,
/// or carries an empty token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let scheme = value.get(..BEARER_PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    let token = value[BEARER_PREFIX.len()..].trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(extract_bearer_token(&with_auth("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&with_auth("bearer abc")), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_shapes() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(extract_bearer_token(&with_auth("Basic dXNlcjpwdw==")), None);
        assert_eq!(extract_bearer_token(&with_auth("Bearer ")), None);
        assert_eq!(extract_bearer_token(&with_auth("Bearer    ")), None);
        assert_eq!(extract_bearer_token(&with_auth("Bearer")), None);
    }
}
