//! Month calendar rendering for the read-only agent view
//!
//! Stored bookings and events pulled from external calendars are treated the
//! same way: a day shows the first entry whose inclusive range contains it.

use async_trait::async_trait;
use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::models::{
    BookingSource, Property, Room,
    calendar::{CalendarDay, DayBooking, ExternalEvent, RoomCalendar},
};

/// Source of events from calendars the service does not own (iCal exports
/// of Airbnb, Booking.com, ...). Read-only: nothing is ever written back.
#[async_trait]
pub trait CalendarFeed: Send + Sync {
    async fn events_for_room(&self, room: &Room) -> anyhow::Result<Vec<ExternalEvent>>;
}

/// Feed used when no external calendars are connected
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeed;

#[async_trait]
impl CalendarFeed for NoFeed {
    async fn events_for_room(&self, _room: &Room) -> anyhow::Result<Vec<ExternalEvent>> {
        Ok(Vec::new())
    }
}

/// Parse a `YYYY-MM` month into its first day
pub fn parse_month(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| format!("Invalid month: {} (expected YYYY-MM)", value))
}

/// First day of the month containing `day`
pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Every day shown for a month: whole weeks, Sunday through Saturday
pub fn month_grid(month: NaiveDate) -> Vec<NaiveDate> {
    let first = month_start(month);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);

    let grid_start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    let grid_end = last + Duration::days(i64::from(6 - last.weekday().num_days_from_sunday()));

    grid_start
        .iter_days()
        .take_while(|day| *day <= grid_end)
        .collect()
}

/// First entry whose inclusive `[start, end]` range contains `day`
pub fn entry_for_day(day: NaiveDate, entries: &[ExternalEvent]) -> Option<&ExternalEvent> {
    entries
        .iter()
        .find(|entry| entry.start <= day && day <= entry.end)
}

/// Manual blocks show their label, imported ones the channel they came from
pub fn display_text(entry: &ExternalEvent) -> String {
    match entry.source {
        BookingSource::Manual => entry.label.clone(),
        other => other.to_string(),
    }
}

/// Render one month of a room's calendar
pub fn render_month(
    room: &Room,
    property: &Property,
    month: NaiveDate,
    entries: &[ExternalEvent],
) -> RoomCalendar {
    let first = month_start(month);

    let days = month_grid(first)
        .into_iter()
        .map(|date| CalendarDay {
            date,
            in_month: date.month() == first.month() && date.year() == first.year(),
            booking: entry_for_day(date, entries).map(|entry| DayBooking {
                id: entry.id.clone(),
                source: entry.source,
                text: display_text(entry),
            }),
        })
        .collect();

    RoomCalendar {
        room_id: room.id,
        room_name: room.name.clone(),
        price: room.price.clone(),
        property_name: property.name.clone(),
        property_location: property.location.clone(),
        title: first.format("%B %Y").to_string(),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: &str, start: NaiveDate, end: NaiveDate, source: BookingSource) -> ExternalEvent {
        ExternalEvent {
            id: id.to_string(),
            start,
            end,
            source,
            label: "Mr. Okafor".to_string(),
        }
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-01"), Ok(date(2024, 1, 1)));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("January").is_err());
    }

    #[test]
    fn test_grid_covers_whole_weeks() {
        // January 2024 starts on a Monday and ends on a Wednesday
        let grid = month_grid(date(2024, 1, 15));

        assert_eq!(grid.len(), 35);
        assert_eq!(grid[0], date(2023, 12, 31));
        assert_eq!(grid[0].weekday(), Weekday::Sun);
        assert_eq!(*grid.last().unwrap(), date(2024, 2, 3));
        assert_eq!(grid.last().unwrap().weekday(), Weekday::Sat);
    }

    #[test]
    fn test_grid_for_month_starting_on_sunday() {
        // September 2024 starts on a Sunday
        let grid = month_grid(date(2024, 9, 1));
        assert_eq!(grid[0], date(2024, 9, 1));
        assert_eq!(grid.len() % 7, 0);
    }

    #[test]
    fn test_containment_is_inclusive_and_first_match_wins() {
        let entries = vec![
            event("1", date(2024, 1, 1), date(2024, 1, 3), BookingSource::Manual),
            event("2", date(2024, 1, 3), date(2024, 1, 5), BookingSource::Airbnb),
        ];

        assert_eq!(entry_for_day(date(2024, 1, 1), &entries).unwrap().id, "1");
        assert_eq!(entry_for_day(date(2024, 1, 3), &entries).unwrap().id, "1");
        assert_eq!(entry_for_day(date(2024, 1, 5), &entries).unwrap().id, "2");
        assert!(entry_for_day(date(2024, 1, 6), &entries).is_none());
    }

    #[test]
    fn test_display_text() {
        let manual = event("1", date(2024, 1, 1), date(2024, 1, 1), BookingSource::Manual);
        let imported = event("2", date(2024, 1, 1), date(2024, 1, 1), BookingSource::Booking);

        assert_eq!(display_text(&manual), "Mr. Okafor");
        assert_eq!(display_text(&imported), "booking");
    }

    #[test]
    fn test_render_month_marks_days() {
        let room = Room {
            id: 101,
            property_id: 1,
            name: "Whole Apartment".to_string(),
            price: "₦200,000".to_string(),
        };
        let property = Property {
            id: 1,
            user_id: 1,
            name: "Blue Water Duplex".to_string(),
            location: "Lekki Phase 1".to_string(),
            pin: "1234".to_string(),
        };
        let entries = vec![event(
            "9",
            date(2024, 1, 30),
            date(2024, 2, 2),
            BookingSource::Airbnb,
        )];

        let calendar = render_month(&room, &property, date(2024, 1, 1), &entries);

        assert_eq!(calendar.title, "January 2024");
        assert_eq!(calendar.property_name, "Blue Water Duplex");

        let booked: Vec<_> = calendar
            .days
            .iter()
            .filter(|d| d.booking.is_some())
            .map(|d| d.date)
            .collect();
        assert_eq!(
            booked,
            vec![
                date(2024, 1, 30),
                date(2024, 1, 31),
                date(2024, 2, 1),
                date(2024, 2, 2)
            ]
        );

        let feb_first = calendar
            .days
            .iter()
            .find(|d| d.date == date(2024, 2, 1))
            .unwrap();
        assert!(!feb_first.in_month);
        assert_eq!(feb_first.booking.as_ref().unwrap().text, "airbnb");
    }
}
