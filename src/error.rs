//! Error taxonomy for requests against the exercise and video APIs.
//!
//! Classifies HTTP statuses and transport failures into retryable and fatal
//! cases so the retry loop can decide what to do next.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single request or of a whole retry sequence.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Provider answered 429 Too Many Requests
    #[error("rate limited by provider")]
    RateLimited,
    /// Provider rejected the credentials (401)
    #[error("unauthorized: check the API key and host settings")]
    Unauthorized,
    /// Any other non-success status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    /// Connection, timeout or other transport failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// Retry bound reached without a successful response
    #[error("gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl FetchError {
    /// Classify a non-success HTTP status.
    ///
    /// # Arguments
    /// * `status` - Response status code
    /// * `body` - Response body text (may be empty)
    ///
    /// # Returns
    /// * `FetchError` - `RateLimited` for 429, `Unauthorized` for 401, `Status` otherwise
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            other => Self::Status {
                status: other.as_u16(),
                body,
            },
        }
    }

    /// Whether another attempt may succeed after a backoff delay.
    ///
    /// Server errors (5xx) are deliberately fatal: only rate limiting and
    /// transport failures are retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            FetchError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            FetchError::RateLimited
        ));
        assert!(matches!(
            FetchError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            FetchError::Unauthorized
        ));
        match FetchError::from_status(StatusCode::BAD_GATEWAY, "upstream".to_string()) {
            FetchError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn test_only_rate_limit_is_retryable_among_statuses() {
        assert!(FetchError::RateLimited.is_retryable());
        assert!(!FetchError::Unauthorized.is_retryable());
        assert!(
            !FetchError::Status {
                status: 500,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!FetchError::Decode("bad".to_string()).is_retryable());
        assert!(!FetchError::RetriesExhausted { attempts: 3 }.is_retryable());
    }
}
