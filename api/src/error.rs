//! Error types for the REST client

use pestaway_sessions::BackendError;
use thiserror::Error;

/// A REST call failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status
    #[error("{message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error payload, or a generic fallback
        message: String,
    },

    /// The request never produced an answer
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape
    #[error("Invalid response payload: {0}")]
    Decode(String),

    /// The auth token could not be decoded
    #[error("Invalid auth token")]
    InvalidToken,
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<ApiError> for BackendError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Status { status, message } => Self::Rejected { status, message },
            other => Self::Network(other.to_string()),
        }
    }
}

/// Pull a human-readable message out of an error response body
///
/// The backend's error payloads carry either a `message` or an `error`
/// string field. Anything else falls back to a generic message with the
/// status code.
#[must_use]
pub fn extract_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.to_owned();
            }
        }
    }
    format!("Request failed with status {status}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_field() {
        assert_eq!(
            extract_message(400, r#"{"message": "Cart is empty"}"#),
            "Cart is empty"
        );
        assert_eq!(
            extract_message(401, r#"{"error": "Invalid credentials"}"#),
            "Invalid credentials"
        );
    }

    #[test]
    fn falls_back_to_generic_message() {
        assert_eq!(
            extract_message(502, "<html>Bad Gateway</html>"),
            "Request failed with status 502"
        );
        assert_eq!(
            extract_message(500, r#"{"detail": 42}"#),
            "Request failed with status 500"
        );
    }

    #[test]
    fn status_errors_become_rejections() {
        let backend: BackendError = ApiError::Status {
            status: 400,
            message: "bad".into(),
        }
        .into();
        assert_eq!(
            backend,
            BackendError::Rejected {
                status: 400,
                message: "bad".into(),
            }
        );

        let backend: BackendError = ApiError::Network("timed out".into()).into();
        assert!(matches!(backend, BackendError::Network(_)));
    }
}
