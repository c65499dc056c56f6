use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::auth_middleware;
use super::AppState;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    // Protected routes (require API key)
    let protected_routes = Router::new()
        // Spaces
        .route("/v1/spaces", get(handlers::spaces::list_spaces))
        .route("/v1/spaces", post(handlers::spaces::create_space))
        .route("/v1/spaces/:id", get(handlers::spaces::get_space))
        .route("/v1/spaces/:id", patch(handlers::spaces::update_space))
        .route("/v1/spaces/:id", delete(handlers::spaces::delete_space))
        .route(
            "/v1/spaces/:id/schedule",
            get(handlers::spaces::space_schedule),
        )
        // Availability pre-check
        .route(
            "/v1/availability",
            post(handlers::availability::check_availability),
        )
        // Reservations
        .route(
            "/v1/reservations",
            post(handlers::reservations::create_reservation),
        )
        .route(
            "/v1/reservations",
            get(handlers::reservations::list_my_reservations),
        )
        .route(
            "/v1/reservations/:id/cancel",
            post(handlers::reservations::cancel_reservation),
        )
        // Settings
        .route("/v1/settings", get(handlers::settings::get_settings))
        .route("/v1/settings", patch(handlers::settings::update_settings))
        // Admin
        .route(
            "/v1/admin/reservations",
            get(handlers::reservations::list_all_reservations),
        )
        .route("/v1/admin/users", get(handlers::users::list_users))
        .route("/v1/admin/users/:id", patch(handlers::users::update_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
