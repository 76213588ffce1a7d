//! Booking records shared by the store, the gateway and the routes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod calendar;
pub mod dates;
pub mod payloads;

/// Registered landlord account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// New user creation payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// A building or unit owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub location: String,
    #[serde(skip_serializing)]
    pub pin: String,
}

/// New property creation payload
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub user_id: i64,
    pub name: String,
    pub location: String,
    pub pin: String,
}

/// A bookable unit within a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub property_id: i64,
    pub name: String,
    pub price: String,
}

/// New room creation payload
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub property_id: i64,
    pub name: String,
    pub price: String,
}

/// Where a booking originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingSource {
    #[default]
    Manual,
    Airbnb,
    Booking,
}

impl BookingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSource::Manual => "manual",
            BookingSource::Airbnb => "airbnb",
            BookingSource::Booking => "booking",
        }
    }
}

impl fmt::Display for BookingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(BookingSource::Manual),
            "airbnb" => Ok(BookingSource::Airbnb),
            "booking" => Ok(BookingSource::Booking),
            other => Err(format!("Unknown booking source: {}", other)),
        }
    }
}

/// A reserved, inclusive date range on a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub room_id: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub source: BookingSource,
    pub label: String,
}

impl Booking {
    /// Whether two inclusive ranges share at least one day
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && start <= self.end
    }
}

/// New booking creation payload
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub room_id: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub source: BookingSource,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(start: &str, end: &str) -> Booking {
        Booking {
            id: 1,
            room_id: 1,
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            source: BookingSource::Manual,
            label: "Guest".to_string(),
        }
    }

    #[test]
    fn test_booking_source_parsing() {
        assert_eq!("airbnb".parse::<BookingSource>(), Ok(BookingSource::Airbnb));
        assert_eq!(BookingSource::Booking.to_string(), "booking");
        assert!("vrbo".parse::<BookingSource>().is_err());
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let existing = booking("2024-01-01", "2024-01-03");
        let d = |s: &str| s.parse::<NaiveDate>().unwrap();

        assert!(existing.overlaps(d("2024-01-03"), d("2024-01-05")));
        assert!(existing.overlaps(d("2023-12-30"), d("2024-01-01")));
        assert!(!existing.overlaps(d("2024-01-04"), d("2024-01-06")));
    }

    #[test]
    fn test_property_pin_is_not_serialized() {
        let property = Property {
            id: 7,
            user_id: 2,
            name: "Blue Water Duplex".to_string(),
            location: "Lekki Phase 1".to_string(),
            pin: "1234".to_string(),
        };

        let json = serde_json::to_value(&property).unwrap();
        assert_eq!(json["userId"], 2);
        assert!(json.get("pin").is_none());
    }
}
