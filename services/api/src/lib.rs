//! SyncStay booking API
//!
//! Landlords register properties and rooms, record pin-gated bookings, and
//! share a read-only calendar of each room with agents.

pub mod calendar;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod settings;
pub mod state;
pub mod validation;

pub use gateway::Gateway;
pub use state::AppState;
