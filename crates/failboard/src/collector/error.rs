//! Collector poll error types.

use thiserror::Error;

/// Errors that can occur while polling the job collector.
#[derive(Error, Debug)]
pub enum PollError {
    /// The collector could not be reached or the request failed in transit.
    #[error("Collector request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collector answered with a non-2xx status.
    #[error("Collector returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a JSON array of jobs.
    #[error("Failed to decode collector response: {0}")]
    Decode(String),

    /// A response arrived after a newer one had already been applied.
    #[error("Discarding stale poll response #{ticket} (latest applied #{latest})")]
    StaleResponse { ticket: u64, latest: u64 },

    /// The HTTP client could not be built.
    #[error("Invalid collector client configuration: {0}")]
    Client(String),
}

impl PollError {
    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PollError::Transport(_) => true,
            PollError::Status { status, .. } => *status >= 500 || *status == 429,
            PollError::Decode(_) | PollError::StaleResponse { .. } | PollError::Client(_) => false,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, PollError::StaleResponse { .. })
    }
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, PollError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let server = PollError::Status {
            status: 503,
            body: String::new(),
        };
        let throttled = PollError::Status {
            status: 429,
            body: String::new(),
        };
        let unauthorized = PollError::Status {
            status: 401,
            body: String::new(),
        };

        assert!(server.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!unauthorized.is_retryable());
        assert!(!PollError::Decode("eof".to_string()).is_retryable());
    }

    #[test]
    fn test_stale_message() {
        let err = PollError::StaleResponse { ticket: 3, latest: 5 };
        assert!(err.is_stale());
        assert_eq!(
            err.to_string(),
            "Discarding stale poll response #3 (latest applied #5)"
        );
    }
}
