use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::manager_error_response;
use crate::server::AppState;

#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub space_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// Pre-submit availability hint for the booking form. Advisory only:
/// creation re-runs the full policy chain and the authoritative
/// overlap re-check.
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AvailabilityRequest>,
) -> Response {
    match state
        .manager
        .is_slot_available(&req.space_id, &req.date, &req.start_time, &req.end_time)
    {
        Ok(available) => Json(AvailabilityResponse { available }).into_response(),
        Err(e) => manager_error_response(e),
    }
}
