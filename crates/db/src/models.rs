use chrono::{DateTime, NaiveDate, Utc};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use shiftsync_core::models::{
    attendance::{AttendanceQr, AttendanceRecord},
    availability::DayAvailability,
    schedule::WeekSchedule,
    shop::{Shift, Shop},
    user::User,
};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub user_type: String,
    pub owner_id: Option<Uuid>,
    pub shift_availability: Json<Vec<DayAvailability>>,
    pub availability_version: i32,
    pub max_shifts_per_week: i32,
    pub shift_preferences: Json<Vec<String>>,
    pub work_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = eyre::Report;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        let user_type = row
            .user_type
            .parse()
            .map_err(|e| eyre!("Corrupt user row {}: {}", row.id, e))?;

        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            user_type,
            owner_id: row.owner_id,
            shift_availability: row.shift_availability.0,
            availability_version: row.availability_version,
            max_shifts_per_week: row.max_shifts_per_week,
            shift_preferences: row.shift_preferences.0,
            work_type: row.work_type,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbShop {
    pub owner_id: Uuid,
    pub name: String,
    pub work_types: Json<Vec<String>>,
    pub shifts: Json<Vec<Shift>>,
    pub shift_version: i32,
    pub current_schedule: Option<Json<WeekSchedule>>,
    pub optimized_schedule: Option<Json<WeekSchedule>>,
    pub last_scheduled: Option<DateTime<Utc>>,
    pub last_optimized: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<DbShop> for Shop {
    fn from(row: DbShop) -> Self {
        Shop {
            owner_id: row.owner_id,
            name: row.name,
            work_types: row.work_types.0,
            shifts: row.shifts.0,
            shift_version: row.shift_version,
            current_schedule: row.current_schedule.map(|s| s.0),
            optimized_schedule: row.optimized_schedule.map(|s| s.0),
            last_scheduled: row.last_scheduled,
            last_optimized: row.last_optimized,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAttendanceQr {
    pub owner_id: Uuid,
    pub token: String,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<DbAttendanceQr> for AttendanceQr {
    fn from(row: DbAttendanceQr) -> Self {
        AttendanceQr {
            owner_id: row.owner_id,
            token: row.token,
            generated_at: row.generated_at,
            expires_at: row.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAttendanceRecord {
    pub worker_id: Uuid,
    pub date: NaiveDate,
    pub worker_name: String,
    pub owner_id: Uuid,
    pub token: String,
    pub recorded_at: DateTime<Utc>,
}

impl From<DbAttendanceRecord> for AttendanceRecord {
    fn from(row: DbAttendanceRecord) -> Self {
        AttendanceRecord {
            worker_id: row.worker_id,
            worker_name: row.worker_name,
            owner_id: row.owner_id,
            date: row.date,
            token: row.token,
            recorded_at: row.recorded_at,
        }
    }
}
