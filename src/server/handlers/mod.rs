pub mod auth;
pub mod availability;
pub mod reservations;
pub mod settings;
pub mod spaces;
pub mod users;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::booking::{BookingError, ManagerError};
use crate::models::User;

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Standard error response; `reason` carries the machine-readable
/// rejection tag when the error comes from the booking policy.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            reason: None,
        }
    }

    pub fn rejection(err: BookingError) -> Self {
        Self {
            error: err.to_string(),
            reason: Some(err.reason()),
        }
    }
}

/// Map a manager error onto an HTTP response: policy rejections are
/// client-facing (404 for missing targets, 422 otherwise), storage
/// failures collapse to a generic retryable 500.
pub fn manager_error_response(err: ManagerError) -> Response {
    match err {
        ManagerError::Rejected(rejection) => {
            let status = match rejection {
                BookingError::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            (status, Json(ErrorResponse::rejection(rejection))).into_response()
        }
        ManagerError::Storage(e) => {
            tracing::error!("storage error: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("temporarily unavailable, retry")),
            )
                .into_response()
        }
    }
}

/// Admin gate shared by the management handlers
pub fn require_admin(user: &User) -> Result<(), Response> {
    if user.is_admin() {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Administrator access required")),
        )
            .into_response())
    }
}
