use axum::http::{HeaderMap, HeaderName};

use super::error::AppError;

/// Header carrying the per-run token printed at startup.
pub(super) const API_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-api-token");

/// Every route except health requires the token; there is no anonymous
/// access to a debuggee's labels.
pub(super) fn check_auth(expected_token: &str, headers: &HeaderMap) -> Result<(), AppError> {
    let presented = headers
        .get(&API_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(token) if token == expected_token => Ok(()),
        Some(_) => Err(AppError::Unauthorized(
            "modlabel API token does not match this session".to_string(),
        )),
        None => Err(AppError::Unauthorized(format!(
            "missing {API_TOKEN_HEADER} header; use the token modlabel printed at startup"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_TOKEN_HEADER,
            HeaderValue::from_str(token).expect("valid header value"),
        );
        headers
    }

    #[test]
    fn matching_token_passes() {
        assert!(check_auth("secret", &headers_with("secret")).is_ok());
    }

    #[test]
    fn wrong_token_is_rejected() {
        assert!(matches!(
            check_auth("secret", &headers_with("guess")),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn missing_header_names_the_header() {
        let Err(AppError::Unauthorized(message)) = check_auth("secret", &HeaderMap::new()) else {
            panic!("missing token must be rejected");
        };
        assert!(message.contains("x-api-token"));
    }
}
