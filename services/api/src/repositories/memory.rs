//! In-memory booking store

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{BookingStore, CascadeSummary};
use crate::models::{
    Booking, NewBooking, NewProperty, NewRoom, NewUser, Property, Room, User,
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    properties: Vec<Property>,
    rooms: Vec<Room>,
    bookings: Vec<Booking>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store keeping every table in process memory
///
/// All tables live behind a single lock, so each operation (the property
/// cascade included) is observed either completely or not at all.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> DatabaseResult<User> {
        let mut tables = self.tables.lock().await;

        if tables.users.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::UniqueViolation(format!(
                "username {} already exists",
                new_user.username
            )));
        }

        let user = User {
            id: tables.allocate_id(),
            username: new_user.username,
            password_hash: new_user.password_hash,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_property(&self, new_property: NewProperty) -> DatabaseResult<Property> {
        let mut tables = self.tables.lock().await;

        if !tables.users.iter().any(|u| u.id == new_property.user_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "user {} does not exist",
                new_property.user_id
            )));
        }

        let property = Property {
            id: tables.allocate_id(),
            user_id: new_property.user_id,
            name: new_property.name,
            location: new_property.location,
            pin: new_property.pin,
        };
        tables.properties.push(property.clone());

        Ok(property)
    }

    async fn find_property(&self, id: i64) -> DatabaseResult<Option<Property>> {
        let tables = self.tables.lock().await;
        Ok(tables.properties.iter().find(|p| p.id == id).cloned())
    }

    async fn properties_by_owner(&self, user_id: i64) -> DatabaseResult<Vec<Property>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .properties
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_room(&self, new_room: NewRoom) -> DatabaseResult<Room> {
        let mut tables = self.tables.lock().await;

        if !tables.properties.iter().any(|p| p.id == new_room.property_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "property {} does not exist",
                new_room.property_id
            )));
        }

        let room = Room {
            id: tables.allocate_id(),
            property_id: new_room.property_id,
            name: new_room.name,
            price: new_room.price,
        };
        tables.rooms.push(room.clone());

        Ok(room)
    }

    async fn find_room(&self, id: i64) -> DatabaseResult<Option<Room>> {
        let tables = self.tables.lock().await;
        Ok(tables.rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn rooms_by_properties(&self, property_ids: &[i64]) -> DatabaseResult<Vec<Room>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .rooms
            .iter()
            .filter(|r| property_ids.contains(&r.property_id))
            .cloned()
            .collect())
    }

    async fn create_booking(&self, new_booking: NewBooking) -> DatabaseResult<Booking> {
        let mut tables = self.tables.lock().await;

        // Checked under the same lock as the cascade, so a booking can never
        // land on a room that was just deleted
        if !tables.rooms.iter().any(|r| r.id == new_booking.room_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "room {} does not exist",
                new_booking.room_id
            )));
        }

        let booking = Booking {
            id: tables.allocate_id(),
            room_id: new_booking.room_id,
            start: new_booking.start,
            end: new_booking.end,
            source: new_booking.source,
            label: new_booking.label,
        };
        tables.bookings.push(booking.clone());

        Ok(booking)
    }

    async fn bookings_by_rooms(&self, room_ids: &[i64]) -> DatabaseResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bookings
            .iter()
            .filter(|b| room_ids.contains(&b.room_id))
            .cloned()
            .collect())
    }

    async fn delete_property_cascade(&self, id: i64) -> DatabaseResult<Option<CascadeSummary>> {
        let mut tables = self.tables.lock().await;

        if !tables.properties.iter().any(|p| p.id == id) {
            return Ok(None);
        }

        let room_ids: Vec<i64> = tables
            .rooms
            .iter()
            .filter(|r| r.property_id == id)
            .map(|r| r.id)
            .collect();

        let bookings_before = tables.bookings.len();
        tables.bookings.retain(|b| !room_ids.contains(&b.room_id));
        let bookings_removed = bookings_before - tables.bookings.len();

        tables.rooms.retain(|r| r.property_id != id);
        tables.properties.retain(|p| p.id != id);

        Ok(Some(CascadeSummary {
            rooms: room_ids.len() as u64,
            bookings: bookings_removed as u64,
        }))
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingSource;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    async fn seed_user(store: &MemoryStore, username: &str) -> User {
        store
            .create_user(NewUser {
                username: username.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    async fn seed_property(store: &MemoryStore, user_id: i64, name: &str) -> (Property, Room) {
        let property = store
            .create_property(NewProperty {
                user_id,
                name: name.to_string(),
                location: "Lekki".to_string(),
                pin: "1234".to_string(),
            })
            .await
            .unwrap();
        let room = store
            .create_room(NewRoom {
                property_id: property.id,
                name: "Master Bedroom".to_string(),
                price: "₦65,000".to_string(),
            })
            .await
            .unwrap();
        store
            .create_booking(NewBooking {
                room_id: room.id,
                start: day(1),
                end: day(3),
                source: BookingSource::Manual,
                label: "Guest".to_string(),
            })
            .await
            .unwrap();
        (property, room)
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        let new_user = NewUser {
            username: "ada".to_string(),
            password_hash: "hash".to_string(),
        };

        store.create_user(new_user.clone()).await.unwrap();
        let err = store.create_user(new_user).await.unwrap_err();

        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_ids_are_unique_across_tables() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "ada").await;
        let (property, room) = seed_property(&store, owner.id, "A").await;
        assert_ne!(property.id, room.id);
    }

    #[tokio::test]
    async fn test_cascade_only_touches_the_deleted_property() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "ada").await;
        let (doomed, doomed_room) = seed_property(&store, owner.id, "Doomed").await;
        let (kept, kept_room) = seed_property(&store, owner.id, "Kept").await;

        let summary = store.delete_property_cascade(doomed.id).await.unwrap();
        assert_eq!(
            summary,
            Some(CascadeSummary {
                rooms: 1,
                bookings: 1
            })
        );

        assert!(store.find_property(doomed.id).await.unwrap().is_none());
        assert!(store.find_room(doomed_room.id).await.unwrap().is_none());
        assert!(
            store
                .bookings_by_rooms(&[doomed_room.id])
                .await
                .unwrap()
                .is_empty()
        );

        assert!(store.find_property(kept.id).await.unwrap().is_some());
        assert_eq!(store.bookings_by_rooms(&[kept_room.id]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_children_of_deleted_parents_are_rejected() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "ada").await;
        let (property, room) = seed_property(&store, owner.id, "Doomed").await;

        store.delete_property_cascade(property.id).await.unwrap();

        let err = store
            .create_booking(NewBooking {
                room_id: room.id,
                start: day(5),
                end: day(6),
                source: BookingSource::Manual,
                label: "Late".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKeyViolation(_)));
        assert!(store.bookings_by_rooms(&[room.id]).await.unwrap().is_empty());

        let err = store
            .create_room(NewRoom {
                property_id: property.id,
                name: "Annex".to_string(),
                price: "₦10,000".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKeyViolation(_)));

        let err = store
            .create_property(NewProperty {
                user_id: 9999,
                name: "Orphan".to_string(),
                location: "Nowhere".to_string(),
                pin: "1234".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_cascade_on_missing_property() {
        let store = MemoryStore::new();
        assert_eq!(store.delete_property_cascade(42).await.unwrap(), None);
    }
}
