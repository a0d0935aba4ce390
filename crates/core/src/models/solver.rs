//! Request and response shapes for the external scheduling service.
//!
//! The service receives `POST /schedule` with the body built by
//! [`build_solve_request`] and answers `{status, schedule}` or
//! `{status: "error", message}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::availability::{complete_matrix, is_available};
use crate::models::day::DayOfWeek;
use crate::models::schedule::{DAYS_PER_WEEK, WeekSchedule};
use crate::models::shop::Shop;
use crate::models::user::User;

/// Weekly cap sent for every worker under the legacy policy.
pub const LEGACY_MAX_SHIFTS: u32 = 10;

/// `(employee name, day index, shift index)`.
pub type AvailabilitySlot = (String, usize, usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub employees: Vec<String>,
    pub days: usize,
    pub shifts: usize,
    pub availability: Vec<AvailabilitySlot>,
    pub max_shifts: BTreeMap<String, u32>,
    pub coverage: Vec<u32>,
    pub holidays: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub status: Option<String>,
    pub schedule: Option<WeekSchedule>,
    pub message: Option<String>,
}

/// How the solver request is assembled.
///
/// The default reproduces the deployed behaviour: every worker is offered as
/// available on every day and shift with a flat cap of [`LEGACY_MAX_SHIFTS`],
/// ignoring stored availability. `use_stored_availability` switches to the
/// workers' own matrices and `max_shifts_per_week`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePolicy {
    pub use_stored_availability: bool,
    pub holidays: Vec<usize>,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            use_stored_availability: false,
            holidays: vec![DayOfWeek::Sunday.index()],
        }
    }
}

pub fn build_solve_request(shop: &Shop, workers: &[User], policy: &SchedulePolicy) -> SolveRequest {
    let shift_count = shop.shift_count();
    let employees: Vec<String> = workers.iter().map(|w| w.name.clone()).collect();

    let mut availability = Vec::new();
    let mut max_shifts = BTreeMap::new();
    for worker in workers {
        if policy.use_stored_availability {
            let matrix = complete_matrix(&worker.shift_availability, shift_count);
            for day in DayOfWeek::ALL {
                for shift in 0..shift_count {
                    if is_available(&matrix, day, shift) {
                        availability.push((worker.name.clone(), day.index(), shift));
                    }
                }
            }
            max_shifts.insert(
                worker.name.clone(),
                u32::try_from(worker.max_shifts_per_week).unwrap_or(0),
            );
        } else {
            for day in 0..DAYS_PER_WEEK {
                for shift in 0..shift_count {
                    availability.push((worker.name.clone(), day, shift));
                }
            }
            max_shifts.insert(worker.name.clone(), LEGACY_MAX_SHIFTS);
        }
    }

    SolveRequest {
        employees,
        days: DAYS_PER_WEEK,
        shifts: shift_count,
        availability,
        max_shifts,
        coverage: shop.shifts.iter().map(|s| s.max_employees).collect(),
        holidays: policy.holidays.clone(),
    }
}
