//! Runner error types with retry classification.
//!
//! Distinguishes transient errors (retried inside the runner, with backoff)
//! from permanent errors (surfaced immediately). The pipeline layer never
//! retries; whatever escapes this module aborts the run.

use std::time::Duration;

/// Error from the generation boundary.
#[derive(Debug)]
pub struct RunnerError {
    /// The kind of error
    pub kind: RunnerErrorKind,
    /// HTTP status code, if applicable
    pub status_code: Option<u16>,
    /// Error message
    pub message: String,
    /// Suggested retry delay (from Retry-After header when present)
    pub retry_after: Option<Duration>,
}

impl RunnerError {
    /// Create a rate limit error.
    pub fn rate_limited(message: String, retry_after: Option<Duration>) -> Self {
        Self {
            kind: RunnerErrorKind::RateLimited,
            status_code: Some(429),
            message,
            retry_after,
        }
    }

    /// Create a server error.
    pub fn server_error(status_code: u16, message: String) -> Self {
        Self {
            kind: RunnerErrorKind::ServerError,
            status_code: Some(status_code),
            message,
            retry_after: None,
        }
    }

    /// Create a client error (bad request, auth, etc.).
    pub fn client_error(status_code: u16, message: String) -> Self {
        Self {
            kind: RunnerErrorKind::ClientError,
            status_code: Some(status_code),
            message,
            retry_after: None,
        }
    }

    /// Create a network error.
    pub fn network_error(message: String) -> Self {
        Self {
            kind: RunnerErrorKind::NetworkError,
            status_code: None,
            message,
            retry_after: None,
        }
    }

    /// Create a parse error.
    pub fn parse_error(message: String) -> Self {
        Self {
            kind: RunnerErrorKind::ParseError,
            status_code: None,
            message,
            retry_after: None,
        }
    }

    /// Check if this error is transient and should be retried.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    /// Get the suggested delay before retry.
    ///
    /// Returns `retry_after` if set, otherwise an exponential backoff based
    /// on the error kind, capped at 60 seconds.
    pub fn suggested_delay(&self, attempt: u32) -> Duration {
        if let Some(retry_after) = self.retry_after {
            return retry_after;
        }

        let base_delay = match self.kind {
            RunnerErrorKind::RateLimited => Duration::from_secs(5),
            RunnerErrorKind::ServerError => Duration::from_secs(2),
            _ => Duration::from_secs(1),
        };

        let multiplier = 2u64.saturating_pow(attempt);
        let delay_secs = base_delay.as_secs().saturating_mul(multiplier);

        Duration::from_secs(delay_secs.min(60))
    }
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for RunnerError {}

/// Classification of generation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerErrorKind {
    /// Rate limited (429) - transient, retried with backoff
    RateLimited,
    /// Server error (500, 502, 503, 504) - transient, retried
    ServerError,
    /// Client error (400, 401, 403, 404) - permanent, not retried
    ClientError,
    /// Network error (connection failed, timeout) - transient, retried
    NetworkError,
    /// Response parsing error - permanent
    ParseError,
}

impl RunnerErrorKind {
    /// Check if this error kind is transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RunnerErrorKind::RateLimited
                | RunnerErrorKind::ServerError
                | RunnerErrorKind::NetworkError
        )
    }
}

impl std::fmt::Display for RunnerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerErrorKind::RateLimited => write!(f, "Rate limited"),
            RunnerErrorKind::ServerError => write!(f, "Server error"),
            RunnerErrorKind::ClientError => write!(f, "Client error"),
            RunnerErrorKind::NetworkError => write!(f, "Network error"),
            RunnerErrorKind::ParseError => write!(f, "Parse error"),
        }
    }
}

/// Configuration for retry behavior inside the runner.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Maximum total time to spend retrying
    pub max_retry_duration: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_retry_duration: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Check if the given error should be retried under this config.
    pub fn should_retry(&self, error: &RunnerError) -> bool {
        error.is_transient()
    }
}

/// Parse HTTP status code into error kind.
pub fn classify_http_status(status: u16) -> RunnerErrorKind {
    match status {
        429 => RunnerErrorKind::RateLimited,
        500 | 502 | 503 | 504 => RunnerErrorKind::ServerError,
        400..=499 => RunnerErrorKind::ClientError,
        _ => RunnerErrorKind::ServerError,
    }
}
