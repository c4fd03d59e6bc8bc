//! Schedule value objects — start time of day and active weekdays.
//!
//! Both are parsed once from their wire formats (`"HH:MM"` and `"1-3-5"`) so
//! the scheduler never works on unparsed strings.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::LocalDateTime;

/// A wall-clock minute of the day, 24-hour, local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build from hour and minute, rejecting out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidStartTime`] when `hour > 23` or
    /// `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidStartTime);
        }
        Ok(Self { hour, minute })
    }

    /// The minute `at` falls in, seconds discarded.
    #[must_use]
    pub fn of(at: LocalDateTime) -> Self {
        // chrono guarantees hour < 24 and minute < 60.
        Self {
            hour: u8::try_from(at.hour()).unwrap_or_default(),
            minute: u8::try_from(at.minute()).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Seconds from local midnight to the start of this minute.
    #[must_use]
    pub fn seconds_from_midnight(self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Accepts exactly `HH:MM`, two digits each.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s.split_once(':').ok_or(ValidationError::InvalidStartTime)?;
        let two_digits = |part: &str| {
            if part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse::<u8>().map_err(|_| ValidationError::InvalidStartTime)
            } else {
                Err(ValidationError::InvalidStartTime)
            }
        };
        Self::new(two_digits(hour)?, two_digits(minute)?)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// A non-empty set of weekdays, numbered 0 (Monday) to 6 (Sunday).
///
/// Wire format is the day numbers joined by `-`, e.g. `"1-3-5"`. The days are
/// kept as listed, so a set prints back exactly as it was given; matching
/// goes through the mask.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekdaySet {
    listed: Vec<u8>,
    mask: u8,
}

impl WeekdaySet {
    /// Build from day numbers (0 = Monday), keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidActiveDay`] when `days` is empty or
    /// contains a number above 6.
    pub fn from_days(days: impl IntoIterator<Item = u8>) -> Result<Self, ValidationError> {
        let listed: Vec<u8> = days.into_iter().collect();
        let mut mask = 0u8;
        for day in &listed {
            if *day > 6 {
                return Err(ValidationError::InvalidActiveDay);
            }
            mask |= 1 << day;
        }
        if mask == 0 {
            return Err(ValidationError::InvalidActiveDay);
        }
        Ok(Self { listed, mask })
    }

    /// Whether the set contains `weekday`.
    #[must_use]
    pub fn contains(&self, weekday: Weekday) -> bool {
        u8::try_from(weekday.num_days_from_monday()).is_ok_and(|day| self.contains_day(day))
    }

    /// Whether the set contains the day number `day` (0 = Monday).
    #[must_use]
    pub fn contains_day(&self, day: u8) -> bool {
        day <= 6 && self.mask & (1 << day) != 0
    }

    /// Whether the date of `at` falls on one of the days.
    #[must_use]
    pub fn includes(&self, at: LocalDateTime) -> bool {
        self.contains(at.weekday())
    }

    /// Distinct day numbers in ascending order.
    pub fn days(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=6).filter(move |day| self.contains_day(*day))
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, day) in self.listed.iter().enumerate() {
            if idx > 0 {
                f.write_str("-")?;
            }
            write!(f, "{day}")?;
        }
        Ok(())
    }
}

impl FromStr for WeekdaySet {
    type Err = ValidationError;

    /// Accepts `^[0-6](-[0-6])*$`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .split('-')
            .map(|part| match part.as_bytes() {
                [digit @ b'0'..=b'6'] => Ok(digit - b'0'),
                _ => Err(ValidationError::InvalidActiveDay),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_days(days)
    }
}

impl TryFrom<String> for WeekdaySet {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekdaySet> for String {
    fn from(days: WeekdaySet) -> Self {
        days.to_string()
    }
}
