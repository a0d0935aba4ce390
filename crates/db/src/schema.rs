use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email VARCHAR(255) NOT NULL UNIQUE,
            name VARCHAR(255) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            user_type VARCHAR(16) NOT NULL CHECK (user_type IN ('owner', 'worker')),
            owner_id UUID NULL REFERENCES users(id),
            shift_availability JSONB NOT NULL DEFAULT '[]'::jsonb,
            availability_version INTEGER NOT NULL DEFAULT 0,
            max_shifts_per_week INTEGER NOT NULL DEFAULT 5,
            shift_preferences JSONB NOT NULL DEFAULT '[]'::jsonb,
            work_type VARCHAR(255) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create shops table, one row per owner
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shops (
            owner_id UUID PRIMARY KEY REFERENCES users(id),
            name VARCHAR(255) NOT NULL,
            work_types JSONB NOT NULL DEFAULT '[]'::jsonb,
            shifts JSONB NOT NULL DEFAULT '[]'::jsonb,
            shift_version INTEGER NOT NULL DEFAULT 0,
            current_schedule JSONB NULL,
            optimized_schedule JSONB NULL,
            last_scheduled TIMESTAMP WITH TIME ZONE NULL,
            last_optimized TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create attendance_qr table, one live token per owner
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_qr (
            owner_id UUID PRIMARY KEY REFERENCES users(id),
            token VARCHAR(64) NOT NULL,
            generated_at TIMESTAMP WITH TIME ZONE NOT NULL,
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create attendance table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            worker_id UUID NOT NULL REFERENCES users(id),
            date DATE NOT NULL,
            worker_name VARCHAR(255) NOT NULL,
            owner_id UUID NOT NULL REFERENCES users(id),
            token VARCHAR(64) NOT NULL,
            recorded_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (worker_id, date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes, one statement per query
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_users_owner_id ON users(owner_id)",
        "CREATE INDEX IF NOT EXISTS idx_attendance_owner_date ON attendance(owner_id, date)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
