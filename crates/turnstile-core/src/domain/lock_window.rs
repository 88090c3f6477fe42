//! Time-of-day lock window.
//!
//! Facilities have hours during which *nobody* gets in, no matter what
//! the roster says: a recurring daily interval called the lock window.
//! The window is a pair of wall-clock times with minute resolution and
//! may wrap past midnight (a night lock from 22:00 to 05:00 is the
//! canonical example).
//!
//! The math in this module is pure.  Sampling the actual wall clock is
//! the caller's job; [`TimeOfDay`] converts from a [`chrono::NaiveTime`]
//! so the authority can pass in `Local::now().time()`.

use std::fmt;
use std::str::FromStr;

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a [`TimeOfDay`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    /// Hour component outside `0..24`.
    #[error("hour {0} is out of range (expected 0-23)")]
    HourOutOfRange(u32),

    /// Minute component outside `0..60`.
    #[error("minute {0} is out of range (expected 0-59)")]
    MinuteOutOfRange(u32),

    /// A textual time did not look like `HH:MM`.
    #[error("malformed time of day {0:?} (expected HH:MM)")]
    Malformed(String),
}

/// A wall-clock time with minute resolution, e.g. `22:00`.
///
/// Ordering is chronological within one day (derived field order:
/// hour, then minute).  Serialises as the string `HH:MM` so config
/// files can write `lock_start = "22:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Creates a time of day from hour and minute components.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::HourOutOfRange`] or
    /// [`ClockError::MinuteOutOfRange`] for invalid components.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ClockError> {
        if hour >= 24 {
            return Err(ClockError::HourOutOfRange(hour));
        }
        if minute >= 60 {
            return Err(ClockError::MinuteOutOfRange(minute));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// The hour component (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// The minute component (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl From<chrono::NaiveTime> for TimeOfDay {
    /// Converts a clock reading, discarding seconds.
    ///
    /// The components of a valid `NaiveTime` are always in range, so no
    /// error path exists here.
    fn from(t: chrono::NaiveTime) -> Self {
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ClockError;

    /// Parses `HH:MM` (a single-digit hour like `8:05` is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| ClockError::Malformed(s.to_string()))?;
        let hour: u32 = h
            .trim()
            .parse()
            .map_err(|_| ClockError::Malformed(s.to_string()))?;
        let minute: u32 = m
            .trim()
            .parse()
            .map_err(|_| ClockError::Malformed(s.to_string()))?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// A recurring daily interval during which all access is denied.
///
/// Both bounds are inclusive.  When `start > end` the window wraps past
/// midnight: it is active from `start` through 24:00 and again from
/// 00:00 through `end`.
///
/// # Examples
///
/// ```rust
/// use turnstile_core::{LockWindow, TimeOfDay};
///
/// let night = LockWindow::new(
///     TimeOfDay::new(22, 0).unwrap(),
///     TimeOfDay::new(5, 0).unwrap(),
/// );
/// assert!(night.contains(TimeOfDay::new(23, 30).unwrap()));
/// assert!(night.contains(TimeOfDay::new(4, 0).unwrap()));
/// assert!(!night.contains(TimeOfDay::new(12, 0).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl LockWindow {
    /// Creates a window from its two bounds.  `start > end` is valid and
    /// means the window wraps past midnight.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// The start bound.
    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    /// The end bound.
    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    /// Whether this window wraps past midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Returns `true` if `t` falls inside the window, bounds inclusive.
    pub fn contains(&self, t: TimeOfDay) -> bool {
        if self.start <= self.end {
            self.start <= t && t <= self.end
        } else {
            // Wrapping interval: start..24:00 plus 00:00..=end.
            t >= self.start || t <= self.end
        }
    }
}

impl fmt::Display for LockWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
