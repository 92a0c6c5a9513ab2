//! Error type for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

use crate::device::DeviceError;

/// Errors that surface to HTTP clients.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The command body matched no known command.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A call to the receiver failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Something broke inside the relay itself.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Maps the error to its HTTP status.
    ///
    /// Receiver timeouts and transport failures are the receiver being
    /// unreachable, hence 503; a reachable receiver answering garbage is a
    /// 500 like any other internal failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownCommand(_) => StatusCode::BAD_REQUEST,
            Self::Device(DeviceError::Timeout | DeviceError::Transport(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Device(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body returned for every error response.
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        log::warn!("[Api] Request failed ({}): {}", status.as_u16(), self);
        let body = ErrorResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Convenience alias for handler results.
pub type RelayResult<T> = Result<T, RelayError>;
