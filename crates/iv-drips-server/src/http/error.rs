use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use iv_drips_core::auth::AuthError;
use iv_drips_core::registry::RegistryError;
use serde::Serialize;
use tracing::{error, warn};

use crate::log::HTTP;

/// Failure of an API call, mapped onto the status codes clients expect.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Not found")]
    NotFound,

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing: Vec<&'static str>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => match err {
                AuthError::MissingCredentials
                | AuthError::UserExists
                | AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken(_) | AuthError::ExternalTokenRejected => {
                    StatusCode::FORBIDDEN
                }
            },
            ApiError::Registry(err) => match err {
                RegistryError::Validation { .. } => StatusCode::BAD_REQUEST,
                RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, missing) = match self {
            ApiError::Registry(RegistryError::Validation { missing }) => {
                ("Missing required fields".to_string(), missing.clone())
            }
            ApiError::Registry(RegistryError::NotFound(_)) | ApiError::NotFound => {
                ("Not found".to_string(), Vec::new())
            }
            // Store details stay in the log
            ApiError::Registry(RegistryError::Store(_)) | ApiError::Task(_) => {
                ("Internal server error".to_string(), Vec::new())
            }
            ApiError::Auth(AuthError::MissingToken) => ("Unauthorized".to_string(), Vec::new()),
            ApiError::Auth(AuthError::InvalidToken(_) | AuthError::ExternalTokenRejected) => {
                ("Forbidden".to_string(), Vec::new())
            }
            ApiError::Auth(err) => (err.to_string(), Vec::new()),
        };
        ErrorBody { message, missing }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(target: HTTP, error = %self, "request failed");
        } else {
            warn!(target: HTTP, status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
