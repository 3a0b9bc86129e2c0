//! Day keys and instant comparison.
//!
//! The lookup cache buckets remote items by the UTC calendar date of their
//! creation time. [`DayKey`] is that date as a plain value type, so two
//! timestamps land in the same bucket exactly when their UTC dates agree,
//! whatever offset they were written in.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, TimeZone, Utc};

/// A calendar date in UTC, used as the cache bucketing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Derive the day key of an instant, normalizing it to UTC first.
    ///
    /// # Examples
    ///
    /// ```
    /// use armpup::library::DayKey;
    /// use chrono::DateTime;
    ///
    /// let t = DateTime::parse_from_rfc3339("2021-03-04T23:30:00-05:00").unwrap();
    /// assert_eq!(DayKey::from_instant(&t), DayKey::from_ymd(2021, 3, 5).unwrap());
    /// ```
    #[must_use]
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.with_timezone(&Utc).date_naive())
    }

    /// Build a day key from its calendar components.
    ///
    /// Returns `None` for dates that do not exist.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The underlying calendar date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Canonical text form used to decide whether two timestamps are the same
/// instant: UTC, RFC 3339, `Z` suffix. Fractional seconds are kept, so
/// `10:00:00.750Z` and `10:00:00Z` differ.
#[must_use]
pub fn instant_key<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
