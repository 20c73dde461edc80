//! Common error types.

use thiserror::Error;

/// Errors raised while attaching viewport tracking to an element.
///
/// Every variant is surfaced synchronously by the call that detected it and
/// never affects the tracking of other elements.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewportError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration document: {0}")]
    InvalidDocument(String),
}

pub type ViewportResult<T> = Result<T, ViewportError>;

impl ViewportError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this is an attach-time configuration problem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InvalidDocument(_))
    }
}

impl From<serde_json::Error> for ViewportError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDocument(err.to_string())
    }
}
