//! Serde adapter for the fixed `YYYY-MM-DD hh:mm:ss` timestamp text.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

/// The only date-time pattern the engine reads or writes.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serializes a timestamp as `YYYY-MM-DD hh:mm:ss`.
pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(DATE_TIME_FORMAT))
}

/// Deserializes a timestamp from `YYYY-MM-DD hh:mm:ss`.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&text, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
}
