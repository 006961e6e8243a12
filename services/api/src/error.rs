//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and its mapping
//! onto the uniform `{success, message}` response envelope. Callers branch on
//! `success` only; status codes are carried for well-behaved HTTP clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;
use creator_studio_core::CreationError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No valid caller identity could be resolved at the boundary.
    #[error("Not authenticated")]
    Unauthenticated,

    /// A request failed inside the creation pipeline.
    #[error(transparent)]
    Creation(#[from] CreationError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Creation(CreationError::PremiumRequired) => StatusCode::FORBIDDEN,
            Self::Creation(CreationError::QuotaExceeded) => StatusCode::TOO_MANY_REQUESTS,
            Self::Creation(CreationError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Creation(CreationError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Creation(CreationError::Provider(_)) => StatusCode::BAD_GATEWAY,
            Self::Creation(CreationError::Persistence(_))
            | Self::Config(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message placed in the envelope. Denials and validation failures
    /// carry their own wording; provider and persistence failures are logged
    /// with full detail but reported generically so internal state never
    /// leaks to the client.
    fn client_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Not authenticated".to_string(),
            Self::Creation(CreationError::Provider(_)) => {
                "The generation service is currently unavailable. Please try again.".to_string()
            }
            Self::Creation(
                err @ (CreationError::PremiumRequired
                | CreationError::QuotaExceeded
                | CreationError::Validation(_)
                | CreationError::NotFound(_)),
            ) => err.to_string(),
            Self::Creation(CreationError::Persistence(_))
            | Self::Config(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    fn log(&self) {
        match self {
            Self::Creation(CreationError::Provider(detail)) => {
                error!(%detail, "provider call failed");
            }
            Self::Creation(CreationError::Persistence(detail)) => {
                error!(%detail, "creation could not be stored");
            }
            Self::Database(err) => error!(error = %err, "database error"),
            Self::Internal(detail) => error!(%detail, "internal error"),
            _ => {}
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "message": self.client_message(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_statuses() {
        assert_eq!(
            ApiError::Creation(CreationError::PremiumRequired).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Creation(CreationError::QuotaExceeded).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ApiError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Creation(CreationError::NotFound("Creation not found".into())).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn denial_messages_are_the_user_facing_strings() {
        assert_eq!(
            ApiError::Creation(CreationError::QuotaExceeded).client_message(),
            "Limit reached. Upgrade to continue."
        );
        assert_eq!(
            ApiError::Creation(CreationError::PremiumRequired).client_message(),
            "This feature is only available for premium subscription."
        );
    }

    #[test]
    fn provider_and_persistence_details_are_not_leaked() {
        let provider =
            ApiError::Creation(CreationError::Provider("api key sk-123 rejected".into()));
        assert!(!provider.client_message().contains("sk-123"));

        let persistence =
            ApiError::Creation(CreationError::Persistence("connection to 10.0.0.5 lost".into()));
        assert!(!persistence.client_message().contains("10.0.0.5"));
    }
}
