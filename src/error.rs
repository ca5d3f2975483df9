use reqwest::StatusCode;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Invalid response from backend: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Export failed: {0}")]
    Export(String),
}

pub type AdminResult<T> = Result<T, AdminError>;

impl AdminError {
    /// Text shown to the operator: the backend's own `message` when it sent
    /// one, otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AdminError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            AdminError::Validation(e) => e.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AdminError::Server { status, .. } => Some(*status),
            AdminError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Validation failures never reached the network.
    pub fn is_local(&self) -> bool {
        matches!(self, AdminError::Validation(_) | AdminError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_preferred() {
        let error = AdminError::Server {
            status: StatusCode::BAD_REQUEST,
            message: Some("Order already assigned".to_string()),
        };
        assert_eq!(
            error.user_message("Failed to assign order"),
            "Order already assigned"
        );
    }

    #[test]
    fn test_fallback_when_message_missing() {
        let error = AdminError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(
            error.user_message("Failed to fetch orders"),
            "Failed to fetch orders"
        );
    }

    #[test]
    fn test_fallback_when_message_blank() {
        let error = AdminError::Server {
            status: StatusCode::BAD_GATEWAY,
            message: Some("   ".to_string()),
        };
        assert_eq!(error.user_message("fallback"), "fallback");
    }

    #[test]
    fn test_decode_error_uses_fallback() {
        let error = AdminError::Decode("missing data".to_string());
        assert_eq!(error.user_message("Error fetching products"), "Error fetching products");
    }

    #[test]
    fn test_validation_error_is_local() {
        let error: AdminError = ValidationError::new("shop_id", "must not be empty").into();
        assert!(error.is_local());
        assert_eq!(error.user_message("ignored"), "shop_id: must not be empty");
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_server_error_status() {
        let error = AdminError::Server {
            status: StatusCode::NOT_FOUND,
            message: None,
        };
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
        assert!(!error.is_local());
    }
}
