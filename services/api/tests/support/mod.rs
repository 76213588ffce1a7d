//! Store wrapper that lets tests interleave work with gateway operations

#![allow(dead_code)]

use async_trait::async_trait;
use common::error::DatabaseResult;
use std::sync::Mutex;

use syncstay_api::{
    models::{Booking, NewBooking, NewProperty, NewRoom, NewUser, Property, Room, User},
    repositories::{BookingStore, CascadeSummary, MemoryStore},
};

/// Delegates to a [`MemoryStore`], with two knobs:
/// a property to delete the next time bookings are listed (that lookup sits
/// between the gateway's pin check and its insert), and the health answer.
#[derive(Default)]
pub struct InterleavedStore {
    pub inner: MemoryStore,
    delete_on_booking_lookup: Mutex<Option<i64>>,
    unhealthy: bool,
}

impl InterleavedStore {
    pub fn unhealthy() -> Self {
        Self {
            unhealthy: true,
            ..Self::default()
        }
    }

    /// Delete `property_id` right before the next `bookings_by_rooms`
    pub fn delete_before_next_booking_lookup(&self, property_id: i64) {
        *self.delete_on_booking_lookup.lock().unwrap() = Some(property_id);
    }
}

#[async_trait]
impl BookingStore for InterleavedStore {
    async fn create_user(&self, new_user: NewUser) -> DatabaseResult<User> {
        self.inner.create_user(new_user).await
    }

    async fn find_user_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        self.inner.find_user_by_id(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        self.inner.find_user_by_username(username).await
    }

    async fn create_property(&self, new_property: NewProperty) -> DatabaseResult<Property> {
        self.inner.create_property(new_property).await
    }

    async fn find_property(&self, id: i64) -> DatabaseResult<Option<Property>> {
        self.inner.find_property(id).await
    }

    async fn properties_by_owner(&self, user_id: i64) -> DatabaseResult<Vec<Property>> {
        self.inner.properties_by_owner(user_id).await
    }

    async fn create_room(&self, new_room: NewRoom) -> DatabaseResult<Room> {
        self.inner.create_room(new_room).await
    }

    async fn find_room(&self, id: i64) -> DatabaseResult<Option<Room>> {
        self.inner.find_room(id).await
    }

    async fn rooms_by_properties(&self, property_ids: &[i64]) -> DatabaseResult<Vec<Room>> {
        self.inner.rooms_by_properties(property_ids).await
    }

    async fn create_booking(&self, new_booking: NewBooking) -> DatabaseResult<Booking> {
        self.inner.create_booking(new_booking).await
    }

    async fn bookings_by_rooms(&self, room_ids: &[i64]) -> DatabaseResult<Vec<Booking>> {
        let pending = self.delete_on_booking_lookup.lock().unwrap().take();
        if let Some(property_id) = pending {
            self.inner.delete_property_cascade(property_id).await?;
        }
        self.inner.bookings_by_rooms(room_ids).await
    }

    async fn delete_property_cascade(&self, id: i64) -> DatabaseResult<Option<CascadeSummary>> {
        self.inner.delete_property_cascade(id).await
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(!self.unhealthy)
    }
}
