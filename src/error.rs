use thiserror::Error;

/// Failures of a single request/response round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, reset, body unreadable and similar.
    #[error("{0}")]
    Transport(String),

    #[error("CSRF verification failed. Please refresh the page and try again.")]
    Forbidden,

    #[error("Server error: {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn from_status(status: u16) -> Self {
        if status == 403 {
            ApiError::Forbidden
        } else {
            ApiError::Status(status)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrfError {
    #[error("CSRF token not found or invalid. Please refresh the page and try again.")]
    Missing,

    #[error("CSRF token not found or invalid. Please refresh the page and try again.")]
    TooShort(usize),
}
