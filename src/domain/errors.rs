use thiserror::Error;

/// Failure reported by a trade source while fetching fills.
///
/// Individual fills that fail to parse never surface here: they are dropped
/// with a warning and the batch continues.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Rate limit exceeded (status {status}): {body}")]
    RateLimited { status: u16, body: String },

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed payload: {0}")]
    Decode(String),
}

impl SourceError {
    /// Whether retrying the same request later may succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            SourceError::Network(_) | SourceError::Timeout(_) | SourceError::RateLimited { .. } => {
                true
            }
            SourceError::Status { status, .. } => *status >= 500,
            SourceError::Decode(_) => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SourceError::RateLimited { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Timeout(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Timeout(e.to_string())
        } else if e.is_decode() {
            SourceError::Decode(e.to_string())
        } else {
            SourceError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Invalid side: {0}")]
    InvalidSide(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("History window must be at least one day")]
    EmptyHistoryWindow,

    #[error("History window of {0} days is too large")]
    HistoryWindowTooLarge(u32),
}

impl From<ValidationError> for String {
    fn from(error: ValidationError) -> Self {
        error.to_string()
    }
}
