use std::fmt;

use jiff::civil::Time;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Wall-clock format used for every stored time of day.
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid time '{value}', expected HH:MM")]
pub struct TimeParseError {
    pub value: String,
}

/// Parse an `HH:MM` wall-clock string into a time of day
pub fn parse_time(value: &str) -> Result<Time, TimeParseError> {
    Time::strptime(TIME_FORMAT, value).map_err(|_| TimeParseError {
        value: value.to_string(),
    })
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkTimeError {
    #[error("Invalid start time: {0}")]
    InvalidStart(TimeParseError),

    #[error("Invalid end time: {0}")]
    InvalidEnd(TimeParseError),

    #[error("Time window {start}-{end} is empty (start must be before end)")]
    Empty { start: String, end: String },
}

/// A start/end pair as entered by the user and stored on disk
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct WorkTime {
    /// Start of the window, `HH:MM`
    pub start: String,
    /// End of the window, `HH:MM`
    pub end: String,
}

impl WorkTime {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse both ends and reject windows that do not move forward in time
    pub fn window(&self) -> Result<TimeWindow, WorkTimeError> {
        let start = parse_time(&self.start).map_err(WorkTimeError::InvalidStart)?;
        let end = parse_time(&self.end).map_err(WorkTimeError::InvalidEnd)?;

        if start >= end {
            return Err(WorkTimeError::Empty {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }

        Ok(TimeWindow { start, end })
    }
}

impl fmt::Display for WorkTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Half-open `[start, end)` interval on a single nominal day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Time,
    pub end: Time,
}

impl TimeWindow {
    /// Touching windows (one ends when the other starts) do not overlap
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.strftime(TIME_FORMAT),
            self.end.strftime(TIME_FORMAT)
        )
    }
}

impl Serialize for TimeWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
