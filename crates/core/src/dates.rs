//! Calendar-date normalization.
//!
//! The remote API sends dates in several shapes: bare `YYYY-MM-DD`
//! strings, offset-less timestamps (`2025-10-02T00:00:00`) and RFC 3339
//! instants (`2025-10-02T00:00:00Z`, `...+02:00`). All of them collapse to
//! a [`DateKey`], the calendar day an operator would see for that value.
//!
//! Bare dates and offset-less timestamps already name a wall-clock day and
//! are taken as-is. Instants carry a zone and are decomposed in the local
//! zone, never read back as UTC fields; reading UTC fields is what shifts
//! assignments by one day around midnight.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Canonical textual form of a [`DateKey`].
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Offset-less timestamp layouts accepted from the wire.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A time-zone independent calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a key from year/month/day, `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Normalize any wire date representation using the local zone.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::parse_in(raw, &Local)
    }

    /// Normalize any wire date representation, decomposing zoned instants
    /// in `tz`.
    pub fn parse_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT) {
            return Some(Self(date));
        }

        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(instant.with_timezone(tz).date_naive()));
        }

        NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|dt| Self(dt.date()))
    }

    /// Midnight-UTC timestamp carrying this key's fields, the form the
    /// assignment upsert endpoint expects. The day never shifts.
    pub fn to_api_timestamp(&self) -> String {
        format!("{}T00:00:00Z", self)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::Validation(format!("Invalid date '{s}'")))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateKey::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
    }
}

/// Every day from `start` to `end` inclusive, ascending. Empty when the
/// range is inverted.
pub fn date_range(start: DateKey, end: DateKey) -> Vec<DateKey> {
    if end < start {
        return Vec::new();
    }
    start
        .0
        .iter_days()
        .take_while(|d| *d <= end.0)
        .map(DateKey)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    fn key(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn bare_date_is_taken_verbatim() {
        assert_eq!(DateKey::parse("2025-10-02"), Some(key(2025, 10, 2)));
    }

    #[test]
    fn offsetless_timestamp_keeps_its_day() {
        assert_eq!(DateKey::parse("2025-10-02T00:00:00"), Some(key(2025, 10, 2)));
        assert_eq!(DateKey::parse("2025-10-02T23:59:59.999"), Some(key(2025, 10, 2)));
        assert_eq!(DateKey::parse("2025-10-02 08:30:00"), Some(key(2025, 10, 2)));
    }

    #[test]
    fn instant_is_decomposed_in_target_zone() {
        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        let east = FixedOffset::east_opt(9 * 3600).unwrap();

        // 02:00Z is still the previous evening five hours west of UTC.
        assert_eq!(
            DateKey::parse_in("2025-10-02T02:00:00Z", &west),
            Some(key(2025, 10, 1))
        );
        // 20:00Z is already the next morning nine hours east of UTC.
        assert_eq!(
            DateKey::parse_in("2025-10-02T20:00:00Z", &east),
            Some(key(2025, 10, 3))
        );
        assert_eq!(
            DateKey::parse_in("2025-10-02T20:00:00+02:00", &Utc),
            Some(key(2025, 10, 2))
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(DateKey::parse(""), None);
        assert_eq!(DateKey::parse("   "), None);
        assert_eq!(DateKey::parse("not-a-date"), None);
        assert_eq!(DateKey::parse("2025-02-30"), None);
        assert!("yesterday".parse::<DateKey>().is_err());
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(key(2025, 3, 7).to_string(), "2025-03-07");
        assert_eq!(key(2025, 3, 7).to_api_timestamp(), "2025-03-07T00:00:00Z");
    }

    #[test]
    fn serde_uses_canonical_string() {
        let json = serde_json::to_string(&key(2025, 10, 2)).unwrap();
        assert_eq!(json, "\"2025-10-02\"");
        let back: DateKey = serde_json::from_str("\"2025-10-02T00:00:00\"").unwrap();
        assert_eq!(back, key(2025, 10, 2));
    }

    #[test]
    fn range_is_inclusive_and_gapless() {
        let days = date_range(key(2025, 10, 30), key(2025, 11, 2));
        let rendered: Vec<String> = days.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["2025-10-30", "2025-10-31", "2025-11-01", "2025-11-02"]
        );
    }

    #[test]
    fn range_of_one_day() {
        assert_eq!(date_range(key(2025, 1, 1), key(2025, 1, 1)), vec![key(2025, 1, 1)]);
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(date_range(key(2025, 1, 2), key(2025, 1, 1)).is_empty());
    }

    #[test]
    fn range_crosses_leap_day() {
        let days = date_range(key(2024, 2, 27), key(2024, 3, 1));
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], key(2024, 2, 29));
    }
}
