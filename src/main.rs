use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use shiftsync_api::config::ApiConfig;
use shiftsync_db::{
    create_pool,
    memory::MemoryStore,
    schema::initialize_database,
    store::{PgStore, ShiftStore},
};

/// `DATABASE_URL` value that selects the in-memory store.
const MEMORY_STORE_URL: &str = "memory";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    let store: Arc<dyn ShiftStore> = if config.database_url == MEMORY_STORE_URL {
        Arc::new(MemoryStore::new())
    } else {
        // Create database connection pool
        let db_pool = create_pool(&config.database_url).await?;

        // Initialize database schema
        initialize_database(&db_pool).await?;

        Arc::new(PgStore::new(db_pool))
    };

    // Start API server
    shiftsync_api::start_server(config, store).await?;

    Ok(())
}
