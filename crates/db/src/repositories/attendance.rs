use crate::models::{DbAttendanceQr, DbAttendanceRecord};
use chrono::NaiveDate;
use eyre::Result;
use shiftsync_core::models::attendance::{AttendanceQr, AttendanceRecord};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Replaces the owner's live token.
pub async fn upsert_qr(pool: &Pool<Postgres>, qr: &AttendanceQr) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO attendance_qr (owner_id, token, generated_at, expires_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (owner_id)
        DO UPDATE SET token = $2, generated_at = $3, expires_at = $4
        "#,
    )
    .bind(qr.owner_id)
    .bind(&qr.token)
    .bind(qr.generated_at)
    .bind(qr.expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_qr_by_owner(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
) -> Result<Option<DbAttendanceQr>> {
    let qr = sqlx::query_as::<_, DbAttendanceQr>(
        r#"
        SELECT owner_id, token, generated_at, expires_at
        FROM attendance_qr
        WHERE owner_id = $1
        "#,
    )
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(qr)
}

/// Inserts the record unless one already exists for that worker and date.
/// Returns whether a row was written.
pub async fn insert_attendance(pool: &Pool<Postgres>, record: &AttendanceRecord) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (worker_id, date, worker_name, owner_id, token, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (worker_id, date) DO NOTHING
        "#,
    )
    .bind(record.worker_id)
    .bind(record.date)
    .bind(&record.worker_name)
    .bind(record.owner_id)
    .bind(&record.token)
    .bind(record.recorded_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn list_attendance(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<DbAttendanceRecord>> {
    let records = sqlx::query_as::<_, DbAttendanceRecord>(
        r#"
        SELECT worker_id, date, worker_name, owner_id, token, recorded_at
        FROM attendance
        WHERE owner_id = $1 AND date = $2
        ORDER BY recorded_at ASC
        "#,
    )
    .bind(owner_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(records)
}
