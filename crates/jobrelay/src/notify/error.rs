//! Notification error types.

use thiserror::Error;

/// Errors from a single notification attempt.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// The request never got a response.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("status={status}, body={body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Result type for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Turns a non-2xx response into `NotifyError::Status`.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::Status {
        status: status.as_u16(),
        body,
    })
}
