//! Assembled plan types (the caller-facing contract)

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Coordinates, DutyStatus, Stop};

/// One formatted block on a daily log, clock times only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub start: String,
    pub end: String,
    pub status: DutyStatus,
    pub reason: String,
}

/// Hours per duty status, rounded to 2 decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyTotals {
    pub driving: f64,
    pub on_duty: f64,
    pub off_duty: f64,
    pub sleeper: f64,
}

impl DutyTotals {
    pub fn add(&mut self, status: DutyStatus, hours: f64) {
        match status {
            DutyStatus::Driving => self.driving += hours,
            DutyStatus::OnDutyNotDriving => self.on_duty += hours,
            DutyStatus::OffDuty => self.off_duty += hours,
            DutyStatus::SleeperBerth => self.sleeper += hours,
        }
    }

    pub fn sum(&self) -> f64 {
        self.driving + self.on_duty + self.off_duty + self.sleeper
    }
}

/// Per-calendar-day log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    /// 1-based position among the dates the trip touches
    pub day: u32,
    pub date: NaiveDate,
    pub time_blocks: Vec<TimeBlock>,
    pub totals: DutyTotals,
    pub remarks: String,
}

/// Trip-level totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub total_distance_miles: f64,
    pub total_driving_hours: f64,
    /// Driving plus the fixed pickup and dropoff service hours
    pub total_trip_hours: f64,
    pub estimated_arrival: NaiveDateTime,
}

/// Caller-facing timeline row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub day: u32,
    pub start: String,
    pub end: String,
    pub status: DutyStatus,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRoute {
    pub path: Vec<Coordinates>,
    pub stops: Vec<Stop>,
}

/// Complete plan returned to collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub route: PlanRoute,
    pub timeline: Vec<TimelineEntry>,
    pub logs: Vec<DailyLog>,
    pub summary: TripSummary,
}

impl Plan {
    /// Log for a 1-based day number
    #[cfg(test)]
    pub(crate) fn log_for_day(&self, day: u32) -> Option<&DailyLog> {
        self.logs.iter().find(|log| log.day == day)
    }
}
