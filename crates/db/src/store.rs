use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use mockall::automock;
use shiftsync_core::models::{
    attendance::{AttendanceQr, AttendanceRecord},
    availability::DayAvailability,
    schedule::WeekSchedule,
    shop::Shop,
    user::{User, UserType},
};
use uuid::Uuid;

use crate::{DbPool, repositories};

/// Data needed to register an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub user_type: UserType,
}

/// Persistence operations used by the API.
///
/// Every write is a plain overwrite with no optimistic-concurrency token, so
/// concurrent read-modify-write cycles on the same document lose updates.
/// The one exception is [`ShiftStore::record_attendance`], which refuses to
/// overwrite an existing record.
#[automock]
#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Returns the user together with its password hash.
    async fn get_credentials(&self, email: &str) -> Result<Option<(User, String)>>;
    async fn list_workers(&self, owner_id: Uuid) -> Result<Vec<User>>;
    async fn update_availability(
        &self,
        user_id: Uuid,
        availability: Vec<DayAvailability>,
        availability_version: i32,
        max_shifts_per_week: Option<i32>,
    ) -> Result<()>;
    async fn assign_owner(
        &self,
        worker_id: Uuid,
        owner_id: Uuid,
        work_type: Option<String>,
    ) -> Result<()>;

    async fn get_shop(&self, owner_id: Uuid) -> Result<Option<Shop>>;
    async fn save_shop(&self, shop: Shop) -> Result<Shop>;
    async fn save_current_schedule(
        &self,
        owner_id: Uuid,
        schedule: WeekSchedule,
        at: DateTime<Utc>,
    ) -> Result<()>;
    async fn save_optimized_schedule(
        &self,
        owner_id: Uuid,
        schedule: WeekSchedule,
        at: DateTime<Utc>,
    ) -> Result<()>;

    async fn save_attendance_qr(&self, qr: AttendanceQr) -> Result<()>;
    async fn get_attendance_qr(&self, owner_id: Uuid) -> Result<Option<AttendanceQr>>;
    /// Returns `false` when the worker already has a record for that date.
    async fn record_attendance(&self, record: AttendanceRecord) -> Result<bool>;
    async fn list_attendance(&self, owner_id: Uuid, date: NaiveDate)
    -> Result<Vec<AttendanceRecord>>;

    async fn health_check(&self) -> Result<()>;
    fn backend_name(&self) -> &'static str;
}

/// [`ShiftStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ShiftStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let row = repositories::users::create_user(
            &self.pool,
            &new_user.email,
            &new_user.name,
            &new_user.password_hash,
            new_user.user_type,
        )
        .await?;
        row.try_into()
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        repositories::users::get_user_by_id(&self.pool, id)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        repositories::users::get_user_by_email(&self.pool, email)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        let Some(row) = repositories::users::get_user_by_email(&self.pool, email).await? else {
            return Ok(None);
        };
        let hash = row.password_hash.clone();
        Ok(Some((row.try_into()?, hash)))
    }

    async fn list_workers(&self, owner_id: Uuid) -> Result<Vec<User>> {
        repositories::users::list_workers_by_owner(&self.pool, owner_id)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn update_availability(
        &self,
        user_id: Uuid,
        availability: Vec<DayAvailability>,
        availability_version: i32,
        max_shifts_per_week: Option<i32>,
    ) -> Result<()> {
        repositories::users::update_availability(
            &self.pool,
            user_id,
            &availability,
            availability_version,
            max_shifts_per_week,
        )
        .await
    }

    async fn assign_owner(
        &self,
        worker_id: Uuid,
        owner_id: Uuid,
        work_type: Option<String>,
    ) -> Result<()> {
        repositories::users::assign_owner(&self.pool, worker_id, owner_id, work_type.as_deref())
            .await
    }

    async fn get_shop(&self, owner_id: Uuid) -> Result<Option<Shop>> {
        Ok(repositories::shops::get_shop_by_owner(&self.pool, owner_id)
            .await?
            .map(Shop::from))
    }

    async fn save_shop(&self, shop: Shop) -> Result<Shop> {
        Ok(repositories::shops::upsert_shop(&self.pool, &shop).await?.into())
    }

    async fn save_current_schedule(
        &self,
        owner_id: Uuid,
        schedule: WeekSchedule,
        at: DateTime<Utc>,
    ) -> Result<()> {
        repositories::shops::save_current_schedule(&self.pool, owner_id, &schedule, at).await
    }

    async fn save_optimized_schedule(
        &self,
        owner_id: Uuid,
        schedule: WeekSchedule,
        at: DateTime<Utc>,
    ) -> Result<()> {
        repositories::shops::save_optimized_schedule(&self.pool, owner_id, &schedule, at).await
    }

    async fn save_attendance_qr(&self, qr: AttendanceQr) -> Result<()> {
        repositories::attendance::upsert_qr(&self.pool, &qr).await
    }

    async fn get_attendance_qr(&self, owner_id: Uuid) -> Result<Option<AttendanceQr>> {
        Ok(repositories::attendance::get_qr_by_owner(&self.pool, owner_id)
            .await?
            .map(AttendanceQr::from))
    }

    async fn record_attendance(&self, record: AttendanceRecord) -> Result<bool> {
        repositories::attendance::insert_attendance(&self.pool, &record).await
    }

    async fn list_attendance(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        Ok(repositories::attendance::list_attendance(&self.pool, owner_id, date)
            .await?
            .into_iter()
            .map(AttendanceRecord::from)
            .collect())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
