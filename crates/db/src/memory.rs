//! In-memory implementation of [`ShiftStore`].
//!
//! Backs tests and local runs without PostgreSQL. State lives in `HashMap`s
//! behind `tokio::sync::RwLock` and is lost on restart. Writes follow the
//! same overwrite semantics as the Postgres store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, eyre};
use shiftsync_core::models::{
    attendance::{AttendanceQr, AttendanceRecord},
    availability::DayAvailability,
    schedule::WeekSchedule,
    shop::Shop,
    user::{DEFAULT_MAX_SHIFTS_PER_WEEK, User},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{NewUser, ShiftStore};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, StoredUser>>,
    shops: RwLock<HashMap<Uuid, Shop>>,
    qr_tokens: RwLock<HashMap<Uuid, AttendanceQr>>,
    attendance: RwLock<HashMap<(Uuid, NaiveDate), AttendanceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShiftStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.user.email == new_user.email) {
            return Err(eyre!("duplicate email: {}", new_user.email));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            user_type: new_user.user_type,
            owner_id: None,
            shift_availability: Vec::new(),
            availability_version: 0,
            max_shifts_per_week: DEFAULT_MAX_SHIFTS_PER_WEEK,
            shift_preferences: Vec::new(),
            work_type: None,
            created_at: Utc::now(),
        };
        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );
        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).map(|s| s.user.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|s| s.user.email == email)
            .map(|s| s.user.clone()))
    }

    async fn get_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|s| s.user.email == email)
            .map(|s| (s.user.clone(), s.password_hash.clone())))
    }

    async fn list_workers(&self, owner_id: Uuid) -> Result<Vec<User>> {
        let mut workers: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|s| s.user.is_worker() && s.user.owner_id == Some(owner_id))
            .map(|s| s.user.clone())
            .collect();
        workers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(workers)
    }

    async fn update_availability(
        &self,
        user_id: Uuid,
        availability: Vec<DayAvailability>,
        availability_version: i32,
        max_shifts_per_week: Option<i32>,
    ) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(stored) = users.get_mut(&user_id) {
            stored.user.shift_availability = availability;
            stored.user.availability_version = availability_version;
            if let Some(max) = max_shifts_per_week {
                stored.user.max_shifts_per_week = max;
            }
        }
        Ok(())
    }

    async fn assign_owner(
        &self,
        worker_id: Uuid,
        owner_id: Uuid,
        work_type: Option<String>,
    ) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(stored) = users.get_mut(&worker_id) {
            stored.user.owner_id = Some(owner_id);
            if work_type.is_some() {
                stored.user.work_type = work_type;
            }
        }
        Ok(())
    }

    async fn get_shop(&self, owner_id: Uuid) -> Result<Option<Shop>> {
        Ok(self.shops.read().await.get(&owner_id).cloned())
    }

    async fn save_shop(&self, shop: Shop) -> Result<Shop> {
        let mut shops = self.shops.write().await;
        let saved = match shops.get(&shop.owner_id) {
            // Configuration updates never touch stored schedules.
            Some(existing) => Shop {
                current_schedule: existing.current_schedule.clone(),
                optimized_schedule: existing.optimized_schedule.clone(),
                last_scheduled: existing.last_scheduled,
                last_optimized: existing.last_optimized,
                created_at: existing.created_at,
                ..shop
            },
            None => shop,
        };
        shops.insert(saved.owner_id, saved.clone());
        Ok(saved)
    }

    async fn save_current_schedule(
        &self,
        owner_id: Uuid,
        schedule: WeekSchedule,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(shop) = self.shops.write().await.get_mut(&owner_id) {
            shop.current_schedule = Some(schedule);
            shop.last_scheduled = Some(at);
        }
        Ok(())
    }

    async fn save_optimized_schedule(
        &self,
        owner_id: Uuid,
        schedule: WeekSchedule,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(shop) = self.shops.write().await.get_mut(&owner_id) {
            shop.optimized_schedule = Some(schedule);
            shop.last_optimized = Some(at);
        }
        Ok(())
    }

    async fn save_attendance_qr(&self, qr: AttendanceQr) -> Result<()> {
        self.qr_tokens.write().await.insert(qr.owner_id, qr);
        Ok(())
    }

    async fn get_attendance_qr(&self, owner_id: Uuid) -> Result<Option<AttendanceQr>> {
        Ok(self.qr_tokens.read().await.get(&owner_id).cloned())
    }

    async fn record_attendance(&self, record: AttendanceRecord) -> Result<bool> {
        let mut attendance = self.attendance.write().await;
        let key = (record.worker_id, record.date);
        if attendance.contains_key(&key) {
            return Ok(false);
        }
        attendance.insert(key, record);
        Ok(true)
    }

    async fn list_attendance(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .attendance
            .read()
            .await
            .values()
            .filter(|r| r.owner_id == owner_id && r.date == date)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.recorded_at);
        Ok(records)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
