mod handlers;
mod middleware;
mod routes;

pub use routes::create_router;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::booking::ReservationManager;
use crate::db::Database;

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub manager: ReservationManager,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let manager = ReservationManager::new(db.clone());
        Self { db, manager }
    }
}

/// Run the API server
pub async fn run_server(addr: SocketAddr, db_path: &str) -> Result<()> {
    let db = Database::open(db_path)?;
    let state = Arc::new(AppState::new(db));
    let app = create_router(state);

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
