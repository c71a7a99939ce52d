//! Time-of-day parsing and daily windows
//!
//! Rules store their window as two `HH:MM` strings. Everything here works
//! on minutes since midnight, so a window is a plain integer range and the
//! date part of the caller's clock is ignored.

use std::fmt;
use std::str::FromStr;

use chrono::Timelike;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Error produced when a `HH:MM` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    #[error("expected HH:MM, got {0:?}")]
    Format(String),
    #[error("hour out of range: {0}")]
    HourOutOfRange(u32),
    #[error("minute out of range: {0}")]
    MinuteOutOfRange(u32),
}

// =============================================================================
// TimeOfDay
// =============================================================================

/// A wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build from components, rejecting out-of-range values.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeParseError> {
        if hour > 23 {
            return Err(TimeParseError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TimeParseError::MinuteOutOfRange(minute));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Take hour and minute from any chrono time value. Seconds are dropped.
    pub fn from_timelike<T: Timelike>(now: &T) -> Self {
        Self {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
        }
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// `hour * 60 + minute`
    pub fn minutes_since_midnight(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    /// Parse `H:MM` or `HH:MM`. Components must be plain ASCII digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || TimeParseError::Format(s.to_string());

        let (hour_part, minute_part) = s.split_once(':').ok_or_else(format_err)?;
        if !(1..=2).contains(&hour_part.len()) || minute_part.len() != 2 {
            return Err(format_err());
        }
        if !hour_part.bytes().chain(minute_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(format_err());
        }

        let hour: u32 = hour_part.parse().map_err(|_| format_err())?;
        let minute: u32 = minute_part.parse().map_err(|_| format_err())?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

// =============================================================================
// DailyWindow
// =============================================================================

/// A recurring daily interval `[start, end)`.
///
/// Windows with `start >= end` are empty. A window that would cross
/// midnight (22:00-06:00) therefore never contains any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DailyWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DailyWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Parse both ends from their stored `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeParseError> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// Half-open containment on minutes since midnight.
    #[inline]
    pub fn contains(&self, now: TimeOfDay) -> bool {
        let now = now.minutes_since_midnight();
        self.start.minutes_since_midnight() <= now && now < self.end.minutes_since_midnight()
    }

    /// True when no time of day can fall inside the window.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Length in minutes. Zero for empty windows.
    pub fn duration_minutes(&self) -> u16 {
        self.end
            .minutes_since_midnight()
            .saturating_sub(self.start.minutes_since_midnight())
    }
}

impl fmt::Display for DailyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
