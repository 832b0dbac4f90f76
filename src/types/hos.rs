//! Duty status, segment and stop types

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Driver duty status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    Driving,
    OnDutyNotDriving,
    OffDuty,
    SleeperBerth,
}

impl DutyStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            DutyStatus::Driving => "driving",
            DutyStatus::OnDutyNotDriving => "on_duty_not_driving",
            DutyStatus::OffDuty => "off_duty",
            DutyStatus::SleeperBerth => "sleeper_berth",
        }
    }

    /// Counts toward the 14-hour window and the 70-hour cycle
    pub const fn is_on_duty(self) -> bool {
        matches!(self, DutyStatus::Driving | DutyStatus::OnDutyNotDriving)
    }
}

/// One contiguous interval of a single duty status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutySegment {
    /// Simulator day counter (not the calendar day, see `daily_log`)
    pub day: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: DutyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DutySegment {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn hours(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 3_600_000.0
    }

    pub fn reason_or_empty(&self) -> &str {
        self.reason.as_deref().unwrap_or("")
    }
}

/// Kind of point of interest along the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopType {
    Pickup,
    Rest,
    Fuel,
    Restart,
    Dropoff,
}

/// A stop listed for map rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    #[serde(rename = "type")]
    pub stop_type: StopType,
    pub location: Coordinates,
    pub duration_hours: f64,
    pub reason: String,
}
