//! Lenient date parsing for request bodies
//!
//! Clients send either `YYYY-MM-DD` or a full ISO-8601 timestamp; only the
//! calendar date is kept.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de::Error};

/// Parse the leading `YYYY-MM-DD` of a date or timestamp string
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date: {}", value))
}

/// Serde adapter for [`parse_date`]
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(D::Error::custom)
}
