use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure categories the UI renders distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Input,
    Timeout,
    Remote,
    Protocol,
    Transport,
    SensorUnavailable,
}

impl ErrorKind {
    /// Whether resubmitting the same input can reasonably succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Timeout | Self::Remote | Self::Transport)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind:?}: {message}")]
pub struct UiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl UiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn sensor_unavailable() -> Self {
        Self::new(
            ErrorKind::SensorUnavailable,
            "Pedometer is not supported on this device.",
        )
    }
}
