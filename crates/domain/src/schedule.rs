//! Schedule — a time-of-day trigger bound to an ON/OFF intent for all devices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::intent::Intent;
use crate::time::{TimeOfDay, Timestamp};

/// Days tag stored when the caller does not give one. It is kept verbatim
/// and not interpreted.
pub const DEFAULT_DAYS: &str = "daily";

/// Store-generated identifier of a [`Schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(i64);

impl ScheduleId {
    #[must_use]
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ScheduleId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(Self)
            .map_err(|_| ValidationError::InvalidScheduleId(s.to_string()))
    }
}

/// A persisted schedule row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    #[serde(rename = "time")]
    pub time_of_day: TimeOfDay,
    pub action: Intent,
    pub enabled: bool,
    pub days: String,
    pub created_at: Timestamp,
}

impl Schedule {
    /// Whether this schedule should fire during the given minute.
    #[must_use]
    pub fn is_due(&self, minute: TimeOfDay) -> bool {
        self.enabled && self.time_of_day == minute
    }
}

/// A validated request to create a schedule; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub time_of_day: TimeOfDay,
    pub action: Intent,
    pub days: String,
}

impl NewSchedule {
    /// Validate raw user input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimeOfDay`] when `time` is not a
    /// valid `HH:MM`, or [`ValidationError::InvalidAction`] when `action` is
    /// neither `ON` nor `OFF`.
    pub fn parse(time: &str, action: &str, days: Option<&str>) -> Result<Self, ValidationError> {
        let time_of_day = time.trim().parse()?;
        let action = action.trim().parse()?;
        let days = days
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DAYS)
            .to_string();
        Ok(Self {
            time_of_day,
            action,
            days,
        })
    }
}
