//! Per-day log records built from the duty timeline.
//!
//! Segments are grouped by the calendar date of their start; a rest that
//! runs past midnight stays on the day it began. The log `day` is the
//! position in the sorted date list, independent of the simulator's own
//! day counter.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{round_to, CLOCK_FORMAT};
use crate::types::{DailyLog, DutySegment, DutyTotals, TimeBlock};

/// Build one `DailyLog` per date touched by `segments`, in date order
pub fn build_logs(
    segments: &[DutySegment],
    current_label: &str,
    pickup_label: &str,
    dropoff_label: &str,
) -> Vec<DailyLog> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&DutySegment>> = BTreeMap::new();
    for segment in segments {
        by_date.entry(segment.start.date()).or_default().push(segment);
    }

    by_date
        .into_iter()
        .enumerate()
        .map(|(i, (date, entries))| {
            let day = i as u32 + 1;
            let mut totals = DutyTotals::default();
            let mut time_blocks = Vec::with_capacity(entries.len());

            for segment in entries {
                totals.add(segment.status, segment.hours());
                time_blocks.push(TimeBlock {
                    start: segment.start.format(CLOCK_FORMAT).to_string(),
                    end: segment.end.format(CLOCK_FORMAT).to_string(),
                    status: segment.status,
                    reason: segment.reason_or_empty().to_string(),
                });
            }

            DailyLog {
                day,
                date,
                time_blocks,
                totals: DutyTotals {
                    driving: round_to(totals.driving, 2),
                    on_duty: round_to(totals.on_duty, 2),
                    off_duty: round_to(totals.off_duty, 2),
                    sleeper: round_to(totals.sleeper, 2),
                },
                remarks: format!(
                    "Trip Day {}: {} → {} → {}",
                    day, current_label, pickup_label, dropoff_label
                ),
            }
        })
        .collect()
}
