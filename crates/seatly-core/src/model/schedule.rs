use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use serde::Serialize;
use strum::{EnumIter, EnumString, IntoEnumIterator};

use crate::error::CoreError;

/// Day of the week a user is allowed to reserve on.
///
/// Parses full English names and three-letter abbreviations,
/// case-insensitively (`"Monday"`, `"mon"`, `"MON"`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    strum::Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum DayOfWeek {
    #[strum(to_string = "Monday", serialize = "Mon")]
    Monday,
    #[strum(to_string = "Tuesday", serialize = "Tue")]
    Tuesday,
    #[strum(to_string = "Wednesday", serialize = "Wed")]
    Wednesday,
    #[strum(to_string = "Thursday", serialize = "Thu")]
    Thursday,
    #[strum(to_string = "Friday", serialize = "Fri")]
    Friday,
    #[strum(to_string = "Saturday", serialize = "Sat")]
    Saturday,
    #[strum(to_string = "Sunday", serialize = "Sun")]
    Sunday,
}

impl DayOfWeek {
    /// Parse a configured weekday name.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::from_str(value.trim()).map_err(|_| CoreError::InvalidWeekday {
            value: value.to_owned(),
        })
    }

    /// Every weekday, Monday first.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// A bookable period within one day, e.g. `08:00-10:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::InvalidTimeSlot {
                value: format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
                reason: "start must be before end".into(),
            });
        }
        Ok(Self { start, end })
    }

    /// Build a slot from separate `HH:MM` bounds.
    pub fn from_bounds(start: &str, end: &str) -> Result<Self, CoreError> {
        let value = format!("{start}-{end}");
        let start = parse_clock_time(start, &value)?;
        let end = parse_clock_time(end, &value)?;
        Self::new(start, end)
    }

    /// Slot start as the site expects it (`HH:MM`).
    pub fn start_hhmm(&self) -> String {
        self.start.format("%H:%M").to_string()
    }

    /// Slot end as the site expects it (`HH:MM`).
    pub fn end_hhmm(&self) -> String {
        self.end.format("%H:%M").to_string()
    }
}

impl FromStr for TimeSlot {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (start, end) = value
            .split_once('-')
            .ok_or_else(|| CoreError::InvalidTimeSlot {
                value: value.to_owned(),
                reason: "expected HH:MM-HH:MM".into(),
            })?;
        Self::from_bounds(start.trim(), end.trim())
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_hhmm(), self.end_hhmm())
    }
}

fn parse_clock_time(raw: &str, slot: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| CoreError::InvalidTimeSlot {
        value: slot.to_owned(),
        reason: format!("'{raw}' is not HH:MM ({e})"),
    })
}
