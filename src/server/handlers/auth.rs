use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ErrorResponse;
use crate::booking::time::now_local;
use crate::crypto::{generate_api_key, hash_api_key, hash_password, verify_password};
use crate::models::{LoginRequest, RegisterRequest, Role, User};
use crate::server::AppState;

#[derive(Serialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub api_key: String,
}

/// Register a new account. The API key is returned exactly once; only
/// its hash is stored.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("email and password are required")),
        )
            .into_response();
    }

    match state.db.get_user_by_email(req.email.trim()) {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new("an account with this email already exists")),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    }

    let api_key = generate_api_key();
    let (password_hash, api_key_hash) = match (hash_password(&req.password), hash_api_key(&api_key))
    {
        (Ok(p), Ok(k)) => (p, k),
        _ => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("failed to hash credentials")),
            )
                .into_response();
        }
    };

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email.trim().to_string(),
        identification_number: req.identification_number,
        full_name: req.full_name,
        phone: req.phone,
        role: Role::User,
        password_hash,
        api_key_hash,
        is_active: true,
        created_at: now_local().format("%Y-%m-%dT%H:%M:%S").to_string(),
    };

    if let Err(e) = state.db.create_user(&user) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Failed to create user: {}", e))),
        )
            .into_response();
    }

    Json(AuthResponse {
        user_id: user.id,
        api_key,
    })
    .into_response()
}

/// Log in with email + password. Rotates the API key: the previous key
/// stops working.
pub async fn login(State(state): State<Arc<AppState>>, Json(req): Json<LoginRequest>) -> Response {
    let user = match state.db.get_user_by_email(req.email.trim()) {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("invalid email or password")),
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

    if !user.is_active || !verify_password(&req.password, &user.password_hash) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("invalid email or password")),
        )
            .into_response();
    }

    let api_key = generate_api_key();
    let api_key_hash = match hash_api_key(&api_key) {
        Ok(h) => h,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    };

    if let Err(e) = state.db.update_user_api_key_hash(&user.id, &api_key_hash) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response();
    }

    Json(AuthResponse {
        user_id: user.id,
        api_key,
    })
    .into_response()
}
