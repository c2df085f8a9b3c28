use serde::Deserialize;
use thiserror::Error;

/// Failures on the rejected channel of the API client.
///
/// Business failures (validation, duplicates, not-found with a message) are
/// not errors; they come back as an envelope with `success: false`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized { message: Option<String> },

    /// `message` is set only when the body carried one; `detail` falls
    /// back to the (truncated) raw body for logs.
    #[error("Access denied: {detail}")]
    AccessDenied { detail: String, message: Option<String> },

    #[error("Resource not found: {detail}")]
    NotFound { detail: String, message: Option<String> },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {detail}")]
    ServerError { detail: String, message: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Deserialize)]
struct MessageOnly {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// The `message` field of an envelope-shaped body, if any.
    fn body_message(body: &str) -> Option<String> {
        serde_json::from_str::<MessageOnly>(body)
            .ok()
            .and_then(|m| m.message)
            .filter(|m| !m.trim().is_empty())
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        let message = Self::body_message(body);
        let detail = message.clone().unwrap_or_else(|| Self::truncate_body(body));
        match status {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied { detail, message },
            404 => ApiError::NotFound { detail, message },
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError { detail, message },
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }

    /// Marker for callers that want to back off and try again.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Rate limits and transport failures; the only errors a retry can fix.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::RateLimited | ApiError::Network(_) | ApiError::Timeout)
    }

    /// The `message` the server put in its response body. Raw bodies
    /// (HTML error pages, proxy text) never count.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::AccessDenied { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::ServerError { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Status error with a server-supplied message, as `from_status`
    /// builds it for envelope bodies.
    pub fn server_error(message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::ServerError {
            detail: message.clone(),
            message: Some(message),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert_eq!(ApiError::from_status(401, ""), ApiError::Unauthorized { message: None });
        assert_eq!(ApiError::from_status(429, "slow down"), ApiError::RateLimited);
        assert!(matches!(ApiError::from_status(403, "nope"), ApiError::AccessDenied { detail, .. } if detail == "nope"));
        assert!(matches!(ApiError::from_status(503, ""), ApiError::ServerError { .. }));
        assert!(matches!(ApiError::from_status(418, "teapot"), ApiError::InvalidResponse(m) if m.contains("418")));
    }

    #[test]
    fn test_from_status_extracts_envelope_message() {
        let err = ApiError::from_status(401, r#"{"success":false,"message":"Invalid credentials"}"#);
        assert_eq!(err.server_message(), Some("Invalid credentials"));

        let err = ApiError::from_status(500, r#"{"success":false,"message":"db down"}"#);
        assert_eq!(err, ApiError::server_error("db down"));
    }

    #[test]
    fn test_raw_body_is_not_a_server_message() {
        let html = "<html><body>Service Unavailable</body></html>";
        let err = ApiError::from_status(503, html);
        assert_eq!(err.server_message(), None);
        assert!(err.to_string().contains("Service Unavailable"));

        assert_eq!(ApiError::from_status(404, "Cannot GET /x").server_message(), None);
        assert_eq!(ApiError::from_status(403, "").server_message(), None);
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let err = ApiError::from_status(502, &body);
        match err {
            ApiError::ServerError { detail, message } => {
                assert!(detail.contains("truncated"));
                assert!(detail.len() < body.len() + 40);
                assert_eq!(message, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::RateLimited.is_transient());
        assert!(ApiError::Timeout.is_transient());
        assert!(ApiError::Network("refused".into()).is_transient());
        assert!(!ApiError::server_error("x").is_transient());
        assert!(!ApiError::Unauthorized { message: None }.is_transient());
        assert!(ApiError::RateLimited.is_rate_limited());
    }
}
