use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{require_admin, ErrorResponse};
use crate::models::{UpdateUserRequest, UserInfo};
use crate::server::middleware::AuthenticatedUser;
use crate::server::AppState;

/// List all accounts (admin)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    match state.db.list_users() {
        Ok(users) => {
            let infos: Vec<UserInfo> = users.into_iter().map(UserInfo::from).collect();
            Json(serde_json::json!({ "users": infos })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

/// Activate/deactivate an account or change its role (admin).
/// Deactivated accounts fail authentication on their next request.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Response {
    if let Err(resp) = require_admin(&admin) {
        return resp;
    }

    let target = match state.db.get_user(&id) {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("User not found")),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    };

    if let Some(is_active) = req.is_active {
        if let Err(e) = state.db.set_user_active(&target.id, is_active) {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    }

    if let Some(role) = req.role {
        if let Err(e) = state.db.set_user_role(&target.id, role) {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    }

    match state.db.get_user(&id) {
        Ok(Some(updated)) => Json(UserInfo::from(updated)).into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to reload user")),
        )
            .into_response(),
    }
}
