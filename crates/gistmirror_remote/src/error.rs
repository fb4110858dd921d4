//! Error types for remote collection access.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur while talking to the remote collection service.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the request can be retried.
        retryable: bool,
    },

    /// Response body could not be decoded.
    #[error("decode error for {url}: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder message.
        message: String,
    },

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl RemoteError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport { retryable, .. } => *retryable,
            RemoteError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        if let Some(status) = err.status() {
            RemoteError::Status {
                url,
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            RemoteError::Decode {
                url,
                message: err.to_string(),
            }
        } else if err.is_timeout() || err.is_connect() {
            RemoteError::transport_retryable(err.to_string())
        } else {
            RemoteError::transport_fatal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(RemoteError::transport_retryable("connection reset").is_retryable());
        assert!(!RemoteError::transport_fatal("bad certificate").is_retryable());
        assert!(RemoteError::Status {
            url: "u".into(),
            status: 503
        }
        .is_retryable());
        assert!(!RemoteError::Status {
            url: "u".into(),
            status: 404
        }
        .is_retryable());
        assert!(!RemoteError::NotFound("u".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = RemoteError::Status {
            url: "https://api.example.com/users/x/gists".into(),
            status: 500,
        };
        assert_eq!(
            err.to_string(),
            "https://api.example.com/users/x/gists returned HTTP 500"
        );
    }
}
