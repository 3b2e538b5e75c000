//! Canvas API error types.

use thiserror::Error;

/// Errors that can occur when talking to the Canvas REST API.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// The assignment URL could not be understood.
    #[error("invalid assignment URL: {0}")]
    InvalidUrl(String),

    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The access token was rejected.
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The course or assignment does not exist (or is not visible to the token).
    #[error("assignment not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not the JSON we expected.
    #[error("could not parse response: {0}")]
    Decode(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl CanvasError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CanvasError::RateLimited { .. } | CanvasError::Timeout(_) | CanvasError::Network(_) => {
                true
            }
            CanvasError::Api { status, .. } => *status >= 500,
            CanvasError::InvalidUrl(_)
            | CanvasError::Unauthorized(_)
            | CanvasError::NotFound(_)
            | CanvasError::Decode(_) => false,
        }
    }

    /// Server-provided backoff hint.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            CanvasError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(CanvasError::RateLimited { retry_after_ms: 10 }.is_transient());
        assert!(CanvasError::Network("reset".into()).is_transient());
        assert!(CanvasError::Api {
            status: 503,
            message: "busy".into()
        }
        .is_transient());
        assert!(!CanvasError::Api {
            status: 400,
            message: "bad".into()
        }
        .is_transient());
        assert!(!CanvasError::Unauthorized("no".into()).is_transient());
    }

    #[test]
    fn retry_hint() {
        assert_eq!(
            CanvasError::RateLimited { retry_after_ms: 5000 }.retry_after_ms(),
            Some(5000)
        );
        assert_eq!(CanvasError::Timeout(60).retry_after_ms(), None);
    }
}
