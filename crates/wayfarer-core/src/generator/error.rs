use thiserror::Error;

/// Failures of the external generator call. All of them are classified as
/// `GenerationFailure` by the agent; none are retried.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator request timed out")]
    Timeout,

    #[error("generator request was cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    Transport(String),

    #[error("generator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generator response could not be read: {0}")]
    InvalidResponse(String),

    #[error("generator response contained no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for GeneratorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}
