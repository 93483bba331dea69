//! Publisher error types.

use thiserror::Error;

/// Errors that can occur while publishing a notification.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The channel rejected the notification.
    #[error("Notification channel error: {0}")]
    Channel(String),

    /// The HTTP endpoint could not be reached.
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The HTTP endpoint answered with a non-success status.
    #[error("Webhook rejected notification with status {0}")]
    Rejected(u16),
}

/// Convenience type alias for publisher results.
pub type Result<T> = std::result::Result<T, PublishError>;
