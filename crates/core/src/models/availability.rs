//! Worker availability matrices.
//!
//! A matrix holds one entry per day of the week, each with a 0/1 flag per
//! shop shift, index-aligned to the shop's shift list. Stored matrices are
//! not trusted: days may be missing and shift arrays may be shorter or longer
//! than the shop's current shift count, so every read goes through
//! [`complete_matrix`] first.

use serde::{Deserialize, Serialize};

use crate::errors::{ShiftError, ShiftResult};
use crate::models::day::DayOfWeek;
use crate::models::user::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub day: DayOfWeek,
    pub shifts: Vec<u8>,
}

/// Rebuilds a full 7-day matrix sized to `shift_count`.
///
/// Missing days become all-zero rows, short rows are zero-padded, long rows
/// are truncated, and any non-zero flag is normalised to 1. When the stored
/// list names a day twice the first entry wins.
pub fn complete_matrix(stored: &[DayAvailability], shift_count: usize) -> Vec<DayAvailability> {
    DayOfWeek::ALL
        .iter()
        .map(|&day| {
            let mut shifts: Vec<u8> = stored
                .iter()
                .find(|entry| entry.day == day)
                .map(|entry| entry.shifts.iter().map(|&flag| u8::from(flag != 0)).collect())
                .unwrap_or_default();
            shifts.resize(shift_count, 0);
            DayAvailability { day, shifts }
        })
        .collect()
}

/// Result of flipping a single availability cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub previous: u8,
    pub current: u8,
    pub matrix: Vec<DayAvailability>,
}

/// Repairs `stored` to `shift_count` columns and flips `[day][shift_index]`.
pub fn toggle_cell(
    stored: &[DayAvailability],
    shift_count: usize,
    day: DayOfWeek,
    shift_index: usize,
) -> ShiftResult<ToggleOutcome> {
    if shift_index >= shift_count {
        return Err(ShiftError::Validation(format!(
            "Shift index {} is out of range for a shop with {} shifts",
            shift_index, shift_count
        )));
    }

    let mut matrix = complete_matrix(stored, shift_count);
    let cell = &mut matrix[day.index()].shifts[shift_index];
    let previous = *cell;
    let current = if previous == 1 { 0 } else { 1 };
    *cell = current;

    Ok(ToggleOutcome {
        previous,
        current,
        matrix,
    })
}

/// Whether the (already completed) matrix marks `day`/`shift_index` as available.
pub fn is_available(matrix: &[DayAvailability], day: DayOfWeek, shift_index: usize) -> bool {
    matrix
        .iter()
        .find(|entry| entry.day == day)
        .and_then(|entry| entry.shifts.get(shift_index))
        .is_some_and(|&flag| flag == 1)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToggleShiftRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub shift: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggledUser {
    pub id: uuid::Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleSummary {
    pub previous: u8,
    pub current: u8,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleShiftResponse {
    pub success: bool,
    pub message: String,
    pub user: ToggledUser,
    pub availability: ToggleSummary,
    pub updated_availability: Vec<DayAvailability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub shift_availability: Vec<DayAvailability>,
    pub max_shifts_per_week: i32,
    pub availability_version: i32,
    pub shift_version: i32,
    /// True when the stored matrix was written against an older shift list.
    pub stale: bool,
}

impl AvailabilityResponse {
    pub fn for_worker(worker: &User, shift_count: usize, shift_version: i32) -> Self {
        Self {
            shift_availability: complete_matrix(&worker.shift_availability, shift_count),
            max_shifts_per_week: worker.max_shifts_per_week,
            availability_version: worker.availability_version,
            shift_version,
            stale: worker.availability_version != shift_version,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub shift_availability: Vec<DayAvailability>,
    pub max_shifts_per_week: Option<i32>,
}
