//! The booking core: time utilities, the slot availability engine, the
//! booking policy evaluator, and the reservation lifecycle manager.
//!
//! Everything here takes "now" and the settings snapshot as explicit
//! arguments; the ambient clock and the settings store only appear at
//! the server edge.

pub mod availability;
pub mod error;
pub mod manager;
pub mod policy;
pub mod time;

pub use error::BookingError;
pub use manager::{ManagerError, ReservationManager};
