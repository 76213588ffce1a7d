//! Booking gateway: the operations behind every endpoint
//!
//! Ownership filtering and pin checks happen here, before anything reaches
//! the store.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::NaiveDate;
use common::error::DatabaseError;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::{
    calendar::{self, CalendarFeed, NoFeed},
    error::{ApiError, ApiResult},
    models::{
        Booking, NewBooking, NewProperty, NewRoom, NewUser, Property, Room, User,
        calendar::{ExternalEvent, RoomCalendar},
        payloads::{
            CreateBookingRequest, CreatePropertyRequest, CreateRoomRequest, DataResponse,
            LoginRequest, SignupRequest,
        },
    },
    repositories::{BookingStore, CascadeSummary},
    validation::{validate_password, validate_required, validate_username},
};

/// Pin applied to properties created without one
pub const DEFAULT_PROPERTY_PIN: &str = "0000";

/// Label given to bookings created without one
pub const DEFAULT_BOOKING_LABEL: &str = "Manual Block";

/// Stateless request handler over an injected store
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn BookingStore>,
    feed: Arc<dyn CalendarFeed>,
    default_pin: String,
}

impl Gateway {
    /// Create a gateway with no external calendar feed
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self {
            store,
            feed: Arc::new(NoFeed),
            default_pin: DEFAULT_PROPERTY_PIN.to_string(),
        }
    }

    /// Use `feed` for events merged into the calendar view
    pub fn with_feed(mut self, feed: Arc<dyn CalendarFeed>) -> Self {
        self.feed = feed;
        self
    }

    /// Override the fallback pin for properties created without one
    pub fn with_default_pin(mut self, pin: impl Into<String>) -> Self {
        self.default_pin = pin.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /// Register a new user
    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<User> {
        validate_username(&request.username).map_err(ApiError::BadRequest)?;
        validate_password(&request.password).map_err(ApiError::BadRequest)?;

        if self
            .store
            .find_user_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }

        let password_hash = hash_password(&request.password)?;

        let user = self
            .store
            .create_user(NewUser {
                username: request.username.clone(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => {
                    ApiError::Conflict("Username already exists".to_string())
                }
                other => ApiError::Database(other),
            })?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials and return the matching user
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<User> {
        let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

        let Some(user) = self
            .store
            .find_user_by_username(&request.username)
            .await?
        else {
            // Same Argon2 cost as a real check, so unknown names answer no faster
            let _ = verify_password(dummy_hash(), &request.password);
            return Err(invalid());
        };

        if !verify_password(&user.password_hash, &request.password)? {
            warn!("Failed login for user {}", user.username);
            return Err(invalid());
        }

        info!("User {} logged in", user.username);
        Ok(user)
    }

    /// Everything `user_id` owns: properties, their rooms, and those rooms' bookings
    pub async fn list_data(&self, user_id: i64) -> ApiResult<DataResponse> {
        let properties = self.store.properties_by_owner(user_id).await?;
        let property_ids: Vec<i64> = properties.iter().map(|p| p.id).collect();

        let rooms = self.store.rooms_by_properties(&property_ids).await?;
        let room_ids: Vec<i64> = rooms.iter().map(|r| r.id).collect();

        let bookings = self.store.bookings_by_rooms(&room_ids).await?;

        Ok(DataResponse {
            properties,
            rooms,
            bookings,
        })
    }

    /// Create a property owned by `request.user_id`
    pub async fn create_property(&self, request: &CreatePropertyRequest) -> ApiResult<Property> {
        validate_required("Name", &request.name).map_err(ApiError::BadRequest)?;
        validate_required("Location", &request.location).map_err(ApiError::BadRequest)?;

        self.store
            .find_user_by_id(request.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let pin = match request.pin.as_deref().map(str::trim) {
            Some(pin) if !pin.is_empty() => pin.to_string(),
            _ => {
                warn!(
                    "Property {} created without a pin, falling back to the default pin",
                    request.name
                );
                self.default_pin.clone()
            }
        };

        let property = self
            .store
            .create_property(NewProperty {
                user_id: request.user_id,
                name: request.name.trim().to_string(),
                location: request.location.trim().to_string(),
                pin,
            })
            .await
            .map_err(|e| missing_parent(e, "User not found"))?;

        info!(
            "Created property {} ({}) for user {}",
            property.name, property.id, property.user_id
        );
        Ok(property)
    }

    /// Add a room to an existing property
    pub async fn create_room(&self, request: &CreateRoomRequest) -> ApiResult<Room> {
        validate_required("Name", &request.name).map_err(ApiError::BadRequest)?;

        self.store
            .find_property(request.property_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

        let room = self
            .store
            .create_room(NewRoom {
                property_id: request.property_id,
                name: request.name.trim().to_string(),
                price: request.price.trim().to_string(),
            })
            .await
            .map_err(|e| missing_parent(e, "Property not found"))?;

        info!("Created room {} ({}) in property {}", room.name, room.id, room.property_id);
        Ok(room)
    }

    /// Record a booking, gated on the pin of the room's property
    ///
    /// Overlapping bookings are accepted; the overlap is only logged.
    pub async fn create_booking(&self, request: &CreateBookingRequest) -> ApiResult<Booking> {
        if request.start > request.end {
            return Err(ApiError::BadRequest(
                "Start date must not be after end date".to_string(),
            ));
        }

        let room = self
            .store
            .find_room(request.room_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

        let property = self
            .store
            .find_property(room.property_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

        if !pin_matches(&property.pin, &request.pin) {
            warn!("Rejected booking on room {}: pin mismatch", room.id);
            return Err(ApiError::Unauthorized("Invalid pin".to_string()));
        }

        let existing = self.store.bookings_by_rooms(&[room.id]).await?;
        if let Some(clash) = existing
            .iter()
            .find(|b| b.overlaps(request.start, request.end))
        {
            warn!(
                "Booking on room {} for {}..{} overlaps booking {}",
                room.id, request.start, request.end, clash.id
            );
        }

        let label = match request.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => DEFAULT_BOOKING_LABEL.to_string(),
        };

        let booking = self
            .store
            .create_booking(NewBooking {
                room_id: room.id,
                start: request.start,
                end: request.end,
                source: request.source.unwrap_or_default(),
                label,
            })
            .await
            .map_err(|e| missing_parent(e, "Room not found"))?;

        info!(
            "Created booking {} on room {} ({}..{})",
            booking.id, booking.room_id, booking.start, booking.end
        );
        Ok(booking)
    }

    /// Delete a property and everything under it, gated on its pin
    pub async fn delete_property(&self, property_id: i64, pin: &str) -> ApiResult<CascadeSummary> {
        let property = self
            .store
            .find_property(property_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

        if !pin_matches(&property.pin, pin) {
            warn!("Rejected deletion of property {}: pin mismatch", property.id);
            return Err(ApiError::Unauthorized("Invalid pin".to_string()));
        }

        let summary = self
            .store
            .delete_property_cascade(property.id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

        info!(
            "Deleted property {} with {} rooms and {} bookings",
            property.id, summary.rooms, summary.bookings
        );
        Ok(summary)
    }

    /// Read-only month view of one room, merging stored and external bookings
    pub async fn room_calendar(&self, room_id: i64, month: NaiveDate) -> ApiResult<RoomCalendar> {
        let room = self
            .store
            .find_room(room_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

        let property = self
            .store
            .find_property(room.property_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

        let mut entries: Vec<ExternalEvent> = self
            .store
            .bookings_by_rooms(&[room.id])
            .await?
            .iter()
            .map(ExternalEvent::from)
            .collect();

        match self.feed.events_for_room(&room).await {
            Ok(external) => entries.extend(external),
            Err(e) => warn!("External calendar unavailable for room {}: {}", room.id, e),
        }

        Ok(calendar::render_month(&room, &property, month, &entries))
    }

    pub async fn health_check(&self) -> ApiResult<bool> {
        Ok(self.store.health_check().await?)
    }
}

/// Stored pins are trimmed on creation, so supplied ones are compared trimmed too
fn pin_matches(stored: &str, supplied: &str) -> bool {
    stored == supplied.trim()
}

/// The parent row vanished between the gateway's lookup and the insert
fn missing_parent(err: DatabaseError, message: &str) -> ApiError {
    match err {
        DatabaseError::ForeignKeyViolation(_) => ApiError::NotFound(message.to_string()),
        other => ApiError::Database(other),
    }
}

/// Hash checked against when the username is unknown
fn dummy_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| hash_password("syncstay-unknown-user").unwrap_or_default())
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            ApiError::InternalServerError
        })
}

fn verify_password(password_hash: &str, password: &str) -> ApiResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
        tracing::error!("Failed to parse password hash: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert_ne!(hash, "s3cret");
        assert!(verify_password(&hash, "s3cret").unwrap());
        assert!(!verify_password(&hash, "S3cret").unwrap());
    }

    #[test]
    fn test_dummy_hash_is_a_real_hash() {
        assert!(PasswordHash::new(dummy_hash()).is_ok());
        assert!(!verify_password(dummy_hash(), "hunter2").unwrap());
    }

    #[test]
    fn test_pin_comparison_ignores_surrounding_whitespace() {
        assert!(pin_matches("1234", " 1234 "));
        assert!(pin_matches("1234", "1234"));
        assert!(!pin_matches("1234", "12 34"));
        assert!(!pin_matches("1234", "0000"));
    }

    #[test]
    fn test_missing_parent_maps_to_not_found() {
        let err = missing_parent(
            DatabaseError::ForeignKeyViolation("room 3".to_string()),
            "Room not found",
        );
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "Room not found"));

        let err = missing_parent(DatabaseError::Migration("boom".to_string()), "Room not found");
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[test]
    fn test_corrupt_hash_is_an_internal_error() {
        let err = verify_password("not-a-phc-string", "anything").unwrap_err();
        assert!(matches!(err, ApiError::InternalServerError));
    }
}
