use std::time::Duration;

use reqwest::StatusCode;
use shared::error::{ErrorKind, UiError};
use thiserror::Error;

/// Every way a playlist build can end short of success.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("playlist service did not answer within {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("playlist service returned HTTP {status}: {body}")]
    Remote { status: StatusCode, body: String },
    #[error("unexpected playlist service response: {0}")]
    Protocol(String),
    #[error("could not reach playlist service: {0}")]
    Transport(String),
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Remote { .. } => ErrorKind::Remote,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// One-line message suitable for an alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(reason) => format!("Check the playlist form: {reason}."),
            Self::Timeout(budget) => format!(
                "The playlist service took longer than {} seconds. Try again.",
                budget.as_secs_f64()
            ),
            Self::Remote { status, body } if body.trim().is_empty() => {
                format!("The playlist service failed (HTTP {}).", status.as_u16())
            }
            Self::Remote { status, body } => format!(
                "The playlist service failed (HTTP {}): {}",
                status.as_u16(),
                body.trim()
            ),
            Self::Protocol(_) => {
                "The playlist service sent a response this app does not understand.".to_string()
            }
            Self::Transport(_) => {
                "Playlist service unreachable; check the network and try again.".to_string()
            }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<BuildError> for UiError {
    fn from(value: BuildError) -> Self {
        UiError::new(value.kind(), value.user_message())
    }
}
