//! Weekly schedules and the operations performed on them.
//!
//! A schedule is the list the scheduling service returns:
//! `[{day: 0-6, schedule: "HOLIDAY" | [{shift, workers: [name, ...]}]}]`.
//! Workers are referenced by display name, not id.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{ShiftError, ShiftResult};
use crate::models::day::DayOfWeek;
use crate::models::shop::Shift;

pub const DAYS_PER_WEEK: usize = 7;

/// Names shown per grid cell before collapsing into an overflow count.
pub const MAX_VISIBLE_NAMES: usize = 2;

const HOLIDAY_MARKER: &str = "HOLIDAY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub shift: usize,
    #[serde(default)]
    pub workers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayPlan {
    Holiday,
    Shifts(Vec<ShiftAssignment>),
}

impl Serialize for DayPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DayPlan::Holiday => serializer.serialize_str(HOLIDAY_MARKER),
            DayPlan::Shifts(assignments) => assignments.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for DayPlan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Marker(String),
            Shifts(Vec<ShiftAssignment>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Marker(marker) if marker.eq_ignore_ascii_case(HOLIDAY_MARKER) => {
                Ok(DayPlan::Holiday)
            }
            Raw::Marker(other) => Err(serde::de::Error::custom(format!(
                "unexpected day schedule marker '{}'",
                other
            ))),
            Raw::Shifts(assignments) => Ok(DayPlan::Shifts(assignments)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: usize,
    pub schedule: DayPlan,
}

impl DaySchedule {
    pub fn is_holiday(&self) -> bool {
        self.schedule == DayPlan::Holiday
    }
}

pub type WeekSchedule = Vec<DaySchedule>;

/// `grid[day][shift]` holds the names assigned to that slot.
pub type WorkerGrid = Vec<Vec<Vec<String>>>;

fn day_entry(schedule: &[DaySchedule], day: usize) -> Option<&DaySchedule> {
    schedule.iter().find(|entry| entry.day == day)
}

/// Flattens a schedule into a `7 x shift_count` grid. Holiday days and slots
/// the schedule does not mention are empty; out-of-range entries are dropped.
pub fn flatten(schedule: &[DaySchedule], shift_count: usize) -> WorkerGrid {
    let mut grid = vec![vec![Vec::new(); shift_count]; DAYS_PER_WEEK];
    for entry in schedule {
        let DayPlan::Shifts(assignments) = &entry.schedule else {
            continue;
        };
        let Some(row) = grid.get_mut(entry.day) else {
            continue;
        };
        for assignment in assignments {
            if let Some(slot) = row.get_mut(assignment.shift) {
                slot.extend(assignment.workers.iter().cloned());
            }
        }
    }
    grid
}

/// Counts how many slots each worker fills across the grid.
pub fn grid_counts(grid: &WorkerGrid) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for name in grid.iter().flatten().flatten() {
        *counts.entry(name.clone()).or_insert(0) += 1;
    }
    counts
}

/// Counts how many slots each worker fills in the schedule.
pub fn shift_counts(schedule: &[DaySchedule]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in schedule {
        if let DayPlan::Shifts(assignments) = &entry.schedule {
            for name in assignments.iter().flat_map(|a| &a.workers) {
                *counts.entry(name.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Rebuilds a schedule from a grid, keeping the holiday days of `template`.
///
/// The grid must be exactly `7 x shift_count`.
pub fn rebuild(
    template: &[DaySchedule],
    grid: WorkerGrid,
    shift_count: usize,
) -> ShiftResult<WeekSchedule> {
    if grid.len() != DAYS_PER_WEEK {
        return Err(ShiftError::External(format!(
            "Expected {} days in the optimized schedule, got {}",
            DAYS_PER_WEEK,
            grid.len()
        )));
    }
    if let Some((day, row)) = grid
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != shift_count)
    {
        return Err(ShiftError::External(format!(
            "Expected {} shifts on day {}, got {}",
            shift_count,
            day,
            row.len()
        )));
    }

    Ok(grid
        .into_iter()
        .enumerate()
        .map(|(day, row)| {
            let holiday = day_entry(template, day).is_some_and(DaySchedule::is_holiday);
            let schedule = if holiday {
                DayPlan::Holiday
            } else {
                DayPlan::Shifts(
                    row.into_iter()
                        .enumerate()
                        .map(|(shift, workers)| ShiftAssignment { shift, workers })
                        .collect(),
                )
            };
            DaySchedule { day, schedule }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountViolation {
    pub worker: String,
    pub expected: usize,
    pub actual: usize,
}

/// Lists every worker whose shift count differs between `before` and `after`.
pub fn verify_counts(
    before: &BTreeMap<String, usize>,
    after: &BTreeMap<String, usize>,
) -> Vec<CountViolation> {
    let mut names: Vec<&String> = before.keys().chain(after.keys()).collect();
    names.sort();
    names.dedup();

    names
        .into_iter()
        .filter_map(|name| {
            let expected = before.get(name).copied().unwrap_or(0);
            let actual = after.get(name).copied().unwrap_or(0);
            (expected != actual).then(|| CountViolation {
                worker: name.clone(),
                expected,
                actual,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub shift_id: String,
    pub shift_name: String,
    pub names: Vec<String>,
    pub overflow: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDay {
    pub day: DayOfWeek,
    pub holiday: bool,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleGrid {
    pub source: ScheduleSource,
    pub updated_at: Option<DateTime<Utc>>,
    pub days: Vec<GridDay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleSource {
    #[default]
    Current,
    Optimized,
}

/// Lays the schedule out as a day x shift grid for display.
///
/// A holiday day has no cells. Each cell shows at most
/// [`MAX_VISIBLE_NAMES`] names and counts the rest in `overflow`.
pub fn render_grid(schedule: &[DaySchedule], shifts: &[Shift]) -> Vec<GridDay> {
    let grid = flatten(schedule, shifts.len());

    DayOfWeek::ALL
        .iter()
        .zip(grid)
        .map(|(&day, row)| {
            let holiday = day_entry(schedule, day.index()).is_some_and(DaySchedule::is_holiday);
            let cells = if holiday {
                Vec::new()
            } else {
                shifts
                    .iter()
                    .zip(row)
                    .map(|(shift, mut names)| {
                        let overflow = names.len().saturating_sub(MAX_VISIBLE_NAMES);
                        names.truncate(MAX_VISIBLE_NAMES);
                        GridCell {
                            shift_id: shift.id.clone(),
                            shift_name: shift.name.clone(),
                            names,
                            overflow,
                        }
                    })
                    .collect()
            };
            GridDay {
                day,
                holiday,
                cells,
            }
        })
        .collect()
}

/// Compact per-person text summary, one line per scheduled day:
///
/// ```text
/// Lavanya:
/// D0: S0
/// D1: S0,S1
/// DAY 2: HOLIDAY
/// D3: OFF
/// ```
///
/// Names are compared trimmed and case-insensitively.
pub fn person_summary(schedule: &[DaySchedule], person: &str) -> String {
    let wanted = person.trim().to_lowercase();
    let mut days: Vec<&DaySchedule> = schedule.iter().collect();
    days.sort_by_key(|entry| entry.day);

    let mut lines = vec![format!("{}:", person.trim())];
    for entry in days {
        match &entry.schedule {
            DayPlan::Holiday => lines.push(format!("DAY {}: HOLIDAY", entry.day)),
            DayPlan::Shifts(assignments) => {
                let worked: Vec<String> = assignments
                    .iter()
                    .filter(|a| a.workers.iter().any(|w| w.trim().to_lowercase() == wanted))
                    .map(|a| format!("S{}", a.shift))
                    .collect();
                if worked.is_empty() {
                    lines.push(format!("D{}: OFF", entry.day));
                } else {
                    lines.push(format!("D{}: {}", entry.day, worked.join(",")));
                }
            }
        }
    }
    lines.join("\n")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleQuery {
    #[serde(default)]
    pub source: ScheduleSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryQuery {
    pub person: Option<String>,
    #[serde(default)]
    pub source: ScheduleSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub person: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoScheduleResponse {
    pub schedule: WeekSchedule,
    pub last_scheduled: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub constraints: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub saved: bool,
    pub schedule: WeekSchedule,
    pub violations: Vec<CountViolation>,
    pub message: String,
}
