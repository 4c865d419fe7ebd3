use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("http status {0}")]
    Status(u16),

    #[error("bad response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Only transport-level trouble is worth another attempt. A 4xx/5xx is
    /// the backend answering; asking again will not change its mind.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Timeout | ApiError::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
