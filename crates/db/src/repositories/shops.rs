use crate::models::DbShop;
use chrono::{DateTime, Utc};
use eyre::Result;
use shiftsync_core::models::{schedule::WeekSchedule, shop::Shop};
use sqlx::{Pool, Postgres, types::Json};
use uuid::Uuid;

const SHOP_COLUMNS: &str = "owner_id, name, work_types, shifts, shift_version, \
    current_schedule, optimized_schedule, last_scheduled, last_optimized, created_at";

pub async fn get_shop_by_owner(pool: &Pool<Postgres>, owner_id: Uuid) -> Result<Option<DbShop>> {
    let shop = sqlx::query_as::<_, DbShop>(&format!(
        "SELECT {SHOP_COLUMNS} FROM shops WHERE owner_id = $1"
    ))
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(shop)
}

/// Inserts or updates the shop configuration. Stored schedules are left untouched.
pub async fn upsert_shop(pool: &Pool<Postgres>, shop: &Shop) -> Result<DbShop> {
    tracing::debug!(
        "Saving shop: owner_id={}, shifts={}, shift_version={}",
        shop.owner_id,
        shop.shifts.len(),
        shop.shift_version
    );

    let saved = sqlx::query_as::<_, DbShop>(&format!(
        r#"
        INSERT INTO shops (owner_id, name, work_types, shifts, shift_version, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (owner_id)
        DO UPDATE SET name = $2, work_types = $3, shifts = $4, shift_version = $5
        RETURNING {SHOP_COLUMNS}
        "#
    ))
    .bind(shop.owner_id)
    .bind(&shop.name)
    .bind(Json(&shop.work_types))
    .bind(Json(&shop.shifts))
    .bind(shop.shift_version)
    .bind(shop.created_at)
    .fetch_one(pool)
    .await?;

    Ok(saved)
}

pub async fn save_current_schedule(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    schedule: &WeekSchedule,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE shops
        SET current_schedule = $2, last_scheduled = $3
        WHERE owner_id = $1
        "#,
    )
    .bind(owner_id)
    .bind(Json(schedule))
    .bind(at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn save_optimized_schedule(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    schedule: &WeekSchedule,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE shops
        SET optimized_schedule = $2, last_optimized = $3
        WHERE owner_id = $1
        "#,
    )
    .bind(owner_id)
    .bind(Json(schedule))
    .bind(at)
    .execute(pool)
    .await?;

    Ok(())
}
