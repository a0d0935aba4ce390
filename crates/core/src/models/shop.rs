use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ShiftError, ShiftResult};
use crate::models::schedule::WeekSchedule;

/// A named time window with a headcount limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Caller-assigned id of the form `shift-<index>`; unique only within a shop.
    pub id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub max_employees: u32,
}

impl Shift {
    /// Whether `other` describes the same time window under the same name.
    fn same_slot(&self, other: &Shift) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }
}

/// One shop per owner, keyed by the owner's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub owner_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub work_types: Vec<String>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    /// Bumped whenever the shift list changes shape.
    pub shift_version: i32,
    pub current_schedule: Option<WeekSchedule>,
    pub optimized_schedule: Option<WeekSchedule>,
    pub last_scheduled: Option<DateTime<Utc>>,
    pub last_optimized: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Shop {
    pub fn new(owner_id: Uuid, name: String, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            name,
            work_types: Vec::new(),
            shifts: Vec::new(),
            shift_version: 0,
            current_schedule: None,
            optimized_schedule: None,
            last_scheduled: None,
            last_optimized: None,
            created_at: now,
        }
    }

    pub fn shift_count(&self) -> usize {
        self.shifts.len()
    }

    /// Finds a shift by case-insensitive name.
    pub fn find_shift_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.shifts
            .iter()
            .position(|shift| shift.name.to_lowercase() == wanted)
    }

    /// Replaces the shift list, bumping `shift_version` when any position now
    /// holds a different shift. Only a headcount change keeps the version.
    pub fn replace_shifts(&mut self, shifts: Vec<Shift>) {
        let changed = self.shifts.len() != shifts.len()
            || self
                .shifts
                .iter()
                .zip(&shifts)
                .any(|(old, new)| !old.same_slot(new));
        if changed {
            self.shift_version += 1;
        }
        self.shifts = shifts;
    }

    /// Appends a work type unless an equal one (ignoring case) is present.
    pub fn add_work_type(&mut self, work_type: &str) {
        let trimmed = work_type.trim();
        if trimmed.is_empty() {
            return;
        }
        if !self
            .work_types
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(trimmed))
        {
            self.work_types.push(trimmed.to_string());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftInput {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub max_employees: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertShopRequest {
    pub name: String,
    #[serde(default)]
    pub shifts: Vec<ShiftInput>,
    pub work_types: Option<Vec<String>>,
}

/// Validates shift inputs and assigns ids.
///
/// A shift keeps the id of the existing shift at the same position; new
/// positions get `shift-<index>`.
pub fn assign_shift_ids(existing: &[Shift], inputs: Vec<ShiftInput>) -> ShiftResult<Vec<Shift>> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let name = input.name.trim().to_string();
            if name.is_empty() {
                return Err(ShiftError::Validation(format!(
                    "Shift {} must have a name",
                    index
                )));
            }
            if input.max_employees < 1 {
                return Err(ShiftError::Validation(format!(
                    "Shift '{}' must allow at least one employee",
                    name
                )));
            }
            let start_time = parse_clock(&input.start_time)?;
            let end_time = parse_clock(&input.end_time)?;
            let id = existing
                .get(index)
                .map(|shift| shift.id.clone())
                .unwrap_or_else(|| format!("shift-{}", index));

            Ok(Shift {
                id,
                name,
                start_time,
                end_time,
                max_employees: input.max_employees,
            })
        })
        .collect()
}

fn parse_clock(value: &str) -> ShiftResult<String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map(|time| time.format("%H:%M").to_string())
        .map_err(|_| ShiftError::Validation(format!("Invalid time '{}', expected HH:MM", value)))
}
