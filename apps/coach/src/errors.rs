use thiserror::Error;

use crate::gateway::GatewayError;

/// Client-level error type.
/// `user_message` plays the role of a response mapping: each variant becomes
/// the text shown to the user, internal detail goes to the log.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required input missing or malformed; caught before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend answered with an explicit `error` field.
    #[error("Service error: {0}")]
    Service(String),

    /// Network failure or unparseable response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An operation was attempted from a state that does not allow it.
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// An answer arrived for a turn that is already claimed or no longer current.
    #[error("Stale submission: {0}")]
    Stale(String),

    /// No signed-in user where one is required.
    #[error("Session required")]
    SessionRequired,

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Service(msg) => msg.clone(),
            AppError::Transport(msg) => {
                tracing::error!("Transport error: {msg}");
                "Connection error. Please check your network and try again.".to_string()
            }
            AppError::InvalidState { operation, state } => {
                tracing::warn!("Rejected '{operation}' in state {state}");
                format!("That action is not available right now ({state}).")
            }
            AppError::Stale(msg) => {
                tracing::debug!("Stale submission: {msg}");
                "That answer was already submitted.".to_string()
            }
            AppError::SessionRequired => "Session lost. Please login again.".to_string(),
            AppError::Export(msg) => {
                tracing::error!("Export error: {msg}");
                "Export failed.".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred.".to_string()
            }
        }
    }

    pub fn invalid_state(operation: &'static str, state: impl std::fmt::Debug) -> Self {
        AppError::InvalidState {
            operation,
            state: format!("{state:?}"),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Api { message, .. } => AppError::Service(message),
            other => AppError::Transport(other.to_string()),
        }
    }
}
