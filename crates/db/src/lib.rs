//! # ShiftSync DB
//!
//! PostgreSQL persistence for users, shops, attendance tokens and attendance
//! records. The free functions in [`repositories`] hold the SQL; handlers go
//! through the [`store::ShiftStore`] trait so the backend can be swapped for
//! the in-memory one in tests and local runs.

pub mod memory;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod store;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
