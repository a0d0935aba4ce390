use crate::models::DbUser;
use chrono::Utc;
use eyre::Result;
use shiftsync_core::models::{
    availability::DayAvailability,
    user::{DEFAULT_MAX_SHIFTS_PER_WEEK, UserType},
};
use sqlx::{Pool, Postgres, types::Json};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, name, password_hash, user_type, owner_id, \
    shift_availability, availability_version, max_shifts_per_week, shift_preferences, \
    work_type, created_at";

pub async fn create_user(
    pool: &Pool<Postgres>,
    email: &str,
    name: &str,
    password_hash: &str,
    user_type: UserType,
) -> Result<DbUser> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, email={}, type={}", id, email, user_type);

    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        INSERT INTO users (id, email, name, password_hash, user_type, max_shifts_per_week, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(user_type.as_str())
    .bind(DEFAULT_MAX_SHIFTS_PER_WEEK)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1 LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn list_workers_by_owner(pool: &Pool<Postgres>, owner_id: Uuid) -> Result<Vec<DbUser>> {
    let workers = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE user_type = 'worker' AND owner_id = $1
        ORDER BY name ASC
        "#
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(workers)
}

/// Overwrites the whole availability matrix. No version check: last write wins.
pub async fn update_availability(
    pool: &Pool<Postgres>,
    id: Uuid,
    availability: &[DayAvailability],
    availability_version: i32,
    max_shifts_per_week: Option<i32>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET shift_availability = $2,
            availability_version = $3,
            max_shifts_per_week = COALESCE($4, max_shifts_per_week)
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(Json(availability))
    .bind(availability_version)
    .bind(max_shifts_per_week)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn assign_owner(
    pool: &Pool<Postgres>,
    worker_id: Uuid,
    owner_id: Uuid,
    work_type: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET owner_id = $2, work_type = COALESCE($3, work_type)
        WHERE id = $1
        "#,
    )
    .bind(worker_id)
    .bind(owner_id)
    .bind(work_type)
    .execute(pool)
    .await?;

    Ok(())
}
