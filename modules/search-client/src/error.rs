use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Quota exhausted or throttled. Callers must treat this distinctly:
    /// it means "move to the next backend", not "retry here".
    #[error("Rate limited")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else if err.is_decode() {
            SearchError::Parse(err.to_string())
        } else {
            SearchError::Network(err.to_string())
        }
    }
}

impl SearchError {
    /// Whether a second immediate attempt against the same backend could
    /// plausibly succeed. Rate limits and API rejections cannot.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::Timeout | SearchError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_are_not_retryable() {
        assert!(!SearchError::RateLimited.is_retryable());
        assert!(!SearchError::Api {
            status: 500,
            message: String::new()
        }
        .is_retryable());
        assert!(SearchError::Timeout.is_retryable());
        assert!(SearchError::Network("reset".into()).is_retryable());
    }
}
