use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{manager_error_response, require_admin, ErrorResponse};
use crate::booking::time::{now_local, time_to_minutes};
use crate::models::{CreateSpaceRequest, ReservationView, Space, UpdateSpaceRequest};
use crate::server::middleware::AuthenticatedUser;
use crate::server::AppState;

/// List all spaces
pub async fn list_spaces(State(state): State<Arc<AppState>>) -> Response {
    match state.db.list_spaces() {
        Ok(spaces) => Json(serde_json::json!({ "spaces": spaces })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

/// Get a space by ID
pub async fn get_space(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.db.get_space(&id) {
        Ok(Some(space)) => Json(space).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Space not found")),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

fn validate_operating_hours(start: &str, end: &str) -> Option<Response> {
    match (time_to_minutes(start), time_to_minutes(end)) {
        (Some(opens), Some(closes)) if opens < closes => None,
        _ => Some(
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "operating_hours must be HH:MM with start before end",
                )),
            )
                .into_response(),
        ),
    }
}

/// Create a space (admin)
pub async fn create_space(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(req): Json<CreateSpaceRequest>,
) -> Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }
    if req.capacity == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("capacity must be positive")),
        )
            .into_response();
    }
    if let Some(resp) = validate_operating_hours(&req.operating_hours.start, &req.operating_hours.end)
    {
        return resp;
    }

    let space = Space {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        category: req.category,
        capacity: req.capacity,
        description: req.description,
        operating_hours: req.operating_hours,
        rules: req.rules,
        is_active: req.is_active,
        image_url: req.image_url,
    };

    if let Err(e) = state.db.create_space(&space) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Failed to create space: {}", e))),
        )
            .into_response();
    }

    (StatusCode::CREATED, Json(space)).into_response()
}

/// Partially update a space (admin)
pub async fn update_space(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSpaceRequest>,
) -> Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let mut space = match state.db.get_space(&id) {
        Ok(Some(s)) => s,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Space not found")),
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

    space.apply(req);
    if space.capacity == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("capacity must be positive")),
        )
            .into_response();
    }
    if let Some(resp) =
        validate_operating_hours(&space.operating_hours.start, &space.operating_hours.end)
    {
        return resp;
    }

    if let Err(e) = state.db.update_space(&space) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response();
    }

    Json(space).into_response()
}

/// Delete a space (admin). Existing reservations keep their
/// denormalized space name.
pub async fn delete_space(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    match state.db.delete_space(&id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Space not found")),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub struct ScheduleQuery {
    pub date: String,
}

/// The day's schedule for a space: non-cancelled reservations ordered
/// by start time, the "already taken" feed for the booking UI.
pub async fn space_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ScheduleQuery>,
) -> Response {
    match state.manager.schedule_for_space(&id, &query.date) {
        Ok(reservations) => {
            let now = now_local();
            let views: Vec<ReservationView> = reservations
                .into_iter()
                .map(|r| r.into_view(now))
                .collect();
            Json(serde_json::json!({ "reservations": views })).into_response()
        }
        Err(e) => manager_error_response(e),
    }
}
