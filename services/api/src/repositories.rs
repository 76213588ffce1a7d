//! Repositories for booking data
//!
//! The gateway only ever talks to [`BookingStore`]; which backend sits
//! behind it is decided once at startup.

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::models::{
    Booking, NewBooking, NewProperty, NewRoom, NewUser, Property, Room, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// What a property cascade removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub rooms: u64,
    pub bookings: u64,
}

/// Storage contract for users, properties, rooms and bookings
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Insert a user; a taken username yields `DatabaseError::UniqueViolation`
    async fn create_user(&self, new_user: NewUser) -> DatabaseResult<User>;

    async fn find_user_by_id(&self, id: i64) -> DatabaseResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    async fn create_property(&self, new_property: NewProperty) -> DatabaseResult<Property>;

    async fn find_property(&self, id: i64) -> DatabaseResult<Option<Property>>;

    /// Properties owned by `user_id`, in insertion order
    async fn properties_by_owner(&self, user_id: i64) -> DatabaseResult<Vec<Property>>;

    async fn create_room(&self, new_room: NewRoom) -> DatabaseResult<Room>;

    async fn find_room(&self, id: i64) -> DatabaseResult<Option<Room>>;

    /// Rooms whose property is one of `property_ids`
    async fn rooms_by_properties(&self, property_ids: &[i64]) -> DatabaseResult<Vec<Room>>;

    async fn create_booking(&self, new_booking: NewBooking) -> DatabaseResult<Booking>;

    /// Bookings whose room is one of `room_ids`
    async fn bookings_by_rooms(&self, room_ids: &[i64]) -> DatabaseResult<Vec<Booking>>;

    /// Remove a property together with its rooms and their bookings as one
    /// atomic step. Returns `None` if the property does not exist.
    async fn delete_property_cascade(&self, id: i64) -> DatabaseResult<Option<CascadeSummary>>;

    async fn health_check(&self) -> DatabaseResult<bool>;
}
