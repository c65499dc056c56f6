use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{manager_error_response, require_admin, ErrorResponse};
use crate::booking::time::now_local;
use crate::models::{CreateReservationRequest, ReservationView};
use crate::server::middleware::AuthenticatedUser;
use crate::server::AppState;

/// Create a reservation for the authenticated user
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(req): Json<CreateReservationRequest>,
) -> Response {
    let now = now_local();
    match state.manager.create(&user, &req, now) {
        Ok(reservation) => Json(reservation.into_view(now)).into_response(),
        Err(e) => manager_error_response(e),
    }
}

/// The authenticated user's active reservations, newest first
pub async fn list_my_reservations(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Response {
    match state.manager.reservations_for_user(&user.id) {
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

/// Cancel a reservation. Users may only cancel their own; admins may
/// cancel any (the lockout window still applies).
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Response {
    match state.db.get_reservation(&id) {
        Ok(Some(reservation)) => {
            if reservation.user_id != user.id && !user.is_admin() {
                return (
                    StatusCode::FORBIDDEN,
                    Json(ErrorResponse::new("Not authorized to cancel this reservation")),
                )
                    .into_response();
            }
        }
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Reservation not found")),
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
    }

    match state.manager.cancel(&id, now_local()) {
        Ok(()) => Json(serde_json::json!({ "status": "cancelled" })).into_response(),
        Err(e) => manager_error_response(e),
    }
}

/// All reservations in the system (admin)
pub async fn list_all_reservations(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Response {
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    match state.db.all_reservations() {
        Ok(reservations) => {
            let now = now_local();
            let views: Vec<ReservationView> = reservations
                .into_iter()
                .map(|r| r.into_view(now))
                .collect();
            Json(serde_json::json!({ "reservations": views })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}
