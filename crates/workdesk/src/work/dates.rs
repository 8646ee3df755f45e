//! Calendar-day normalization shared by every date comparison in the engine.
//!
//! All matching happens on [`NaiveDate`] values taken from the date *as written*: the
//! time-of-day and any UTC offset are dropped, never applied.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Anything that can name a calendar day.
///
/// Returns `None` when the value cannot be read as a date; callers treat that as
/// "matches nothing" rather than an error.
pub trait CalendarDay {
    fn calendar_day(&self) -> Option<NaiveDate>;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> Option<NaiveDate> {
        Some(*self)
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> Option<NaiveDate> {
        Some(self.date())
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> Option<NaiveDate> {
        Some(self.date_naive())
    }
}

impl CalendarDay for str {
    fn calendar_day(&self) -> Option<NaiveDate> {
        normalize_day(self)
    }
}

impl CalendarDay for String {
    fn calendar_day(&self) -> Option<NaiveDate> {
        normalize_day(self)
    }
}

impl<T: CalendarDay + ?Sized> CalendarDay for &T {
    fn calendar_day(&self) -> Option<NaiveDate> {
        (**self).calendar_day()
    }
}

impl<T: CalendarDay> CalendarDay for Option<T> {
    fn calendar_day(&self) -> Option<NaiveDate> {
        self.as_ref().and_then(CalendarDay::calendar_day)
    }
}

/// Reads the calendar day out of an ISO-8601 date or date-time string.
pub fn normalize_day(raw: &str) -> Option<NaiveDate> {
    normalize_moment(raw).map(|moment| moment.date())
}

/// Reads a wall-clock timestamp as written; plain dates read as midnight.
pub fn normalize_moment(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Reads an absolute point in time. Offsets are applied; values without one read as UTC.
pub fn normalize_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    normalize_moment(trimmed).map(|moment| moment.and_utc())
}

/// Long display form used for history headings, e.g. `Wednesday, January 10, 2024`.
pub fn display_long(day: NaiveDate) -> String {
    day.format("%A, %B %-d, %Y").to_string()
}

/// A date field as delivered by the API: the raw text plus the day it names, if any.
///
/// A blank string deserializes to an absent field so fallbacks (`workDate` to
/// `submittedAt`) still apply. A non-blank string that fails to parse is kept with no
/// day, so the record stays in place but matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDate {
    raw: String,
    day: Option<NaiveDate>,
}

impl CalendarDate {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let day = normalize_day(&raw);
        Self { raw, day }
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.day
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The absolute time this value names, for ordering timestamps across offsets.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        normalize_instant(&self.raw)
    }
}

impl CalendarDay for CalendarDate {
    fn calendar_day(&self) -> Option<NaiveDate> {
        self.day
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(day: NaiveDate) -> Self {
        Self {
            raw: day.format("%Y-%m-%d").to_string(),
            day: Some(day),
        }
    }
}

impl From<&str> for CalendarDate {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for CalendarDate
where
    Tz::Offset: fmt::Display,
{
    fn from(value: DateTime<Tz>) -> Self {
        Self {
            raw: value.to_rfc3339(),
            day: Some(value.date_naive()),
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(raw))
    }
}

/// `deserialize_with` helper treating `null` and blank strings as an absent date.
pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<CalendarDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .filter(|value| !value.trim().is_empty())
        .map(CalendarDate::parse))
}
