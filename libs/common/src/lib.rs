//! Common library for the SyncStay services
//!
//! This crate provides shared functionality used by the booking service,
//! namely PostgreSQL connectivity and the store-level error type.

pub mod database;
pub mod error;
