use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{require_admin, ErrorResponse};
use crate::models::UpdateSettingsRequest;
use crate::server::middleware::AuthenticatedUser;
use crate::server::AppState;

/// Read the settings singleton
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Response {
    match state.db.get_settings() {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

/// Update the settings singleton (admin). Omitted fields are
/// unchanged; a cap of 0 clears the limit.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let mut settings = match state.db.get_settings() {
        Ok(s) => s,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    };

    settings.apply(req);

    if let Err(e) = state.db.update_settings(&settings) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response();
    }

    Json(settings).into_response()
}
