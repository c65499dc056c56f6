pub mod booking;
pub mod crypto;
pub mod db;
pub mod models;
pub mod seed;
pub mod server;

pub use models::*;

/// API version prefix
pub const API_VERSION: &str = "v1";

/// Application name
pub const APP_NAME: &str = "reservd";
