//! API models for request and response payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Booking, BookingSource, Property, Room, User};

/// Request for user registration
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Request for user login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Response for signup and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
}

/// Query parameters for the dashboard data listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    pub user_id: i64,
}

/// Everything one user owns, flattened per record type
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataResponse {
    pub properties: Vec<Property>,
    pub rooms: Vec<Room>,
    pub bookings: Vec<Booking>,
}

/// Request for property creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub pin: Option<String>,
    pub user_id: i64,
}

/// Request for room creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub property_id: i64,
    pub name: String,
    pub price: String,
}

/// Request for booking creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub room_id: i64,
    #[serde(deserialize_with = "super::dates::deserialize")]
    pub start: NaiveDate,
    #[serde(deserialize_with = "super::dates::deserialize")]
    pub end: NaiveDate,
    #[serde(default)]
    pub label: Option<String>,
    pub pin: String,
    #[serde(default)]
    pub source: Option<BookingSource>,
}

/// Request for property deletion
#[derive(Debug, Clone, Deserialize)]
pub struct DeletePropertyRequest {
    pub pin: String,
}

/// Bare acknowledgement
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response for property creation
#[derive(Debug, Serialize)]
pub struct PropertyCreated {
    pub success: bool,
    pub property: Property,
}

/// Response for room creation
#[derive(Debug, Serialize)]
pub struct RoomCreated {
    pub success: bool,
    pub room: Room,
}

/// Response for booking creation
#[derive(Debug, Serialize)]
pub struct BookingCreated {
    pub success: bool,
    pub booking: Booking,
}
