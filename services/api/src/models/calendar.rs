//! Calendar view models for the read-only agent page

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Booking, BookingSource};

/// An event pulled from an external calendar (Airbnb, Booking.com, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEvent {
    pub id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub source: BookingSource,
    pub label: String,
}

impl From<&Booking> for ExternalEvent {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            start: booking.start,
            end: booking.end,
            source: booking.source,
            label: booking.label.clone(),
        }
    }
}

/// Query parameters for the calendar view
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    /// Month to render as `YYYY-MM`; defaults to the current month
    pub month: Option<String>,
}

/// What a single day cell shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBooking {
    pub id: String,
    pub source: BookingSource,
    pub text: String,
}

/// One cell of the month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub booking: Option<DayBooking>,
}

/// Rendered month of one room
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCalendar {
    pub room_id: i64,
    pub room_name: String,
    pub price: String,
    pub property_name: String,
    pub property_location: String,
    pub title: String,
    pub days: Vec<CalendarDay>,
}
