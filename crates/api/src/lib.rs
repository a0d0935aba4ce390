//! # ShiftSync API
//!
//! The API crate provides the web server for the ShiftSync shift-scheduling
//! service: accounts, worker availability, shop configuration, attendance QR
//! codes, and weekly schedule generation.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Sessions, password hashing and error mapping
//! - **Clients**: Outbound calls to the scheduling service and the language model
//! - **Config**: Handle environment and application configuration
//!
//! Persistence goes through the [`ShiftStore`] trait, so the same router runs
//! against PostgreSQL or the in-memory store.

/// Outbound service clients
pub mod clients;
/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Sessions, password hashing and error mapping
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eyre::{Result, WrapErr};
use shiftsync_core::models::solver::SchedulePolicy;
use shiftsync_db::store::ShiftStore;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use clients::{
    optimizer::{GeminiOptimizer, ScheduleOptimizer},
    solver::{HttpSolver, ScheduleSolver},
};
use middleware::auth::SessionKeys;

/// Shared application state that is accessible to all request handlers
///
/// Every outbound dependency sits behind a trait object so tests can swap in
/// the in-memory store and mocked clients.
///
/// # Example
///
/// ```rust,ignore
/// let state = Arc::new(ApiState::new(&config, Arc::new(MemoryStore::new())));
/// let app = build_router(state);
/// ```
pub struct ApiState {
    /// Users, shops, schedules and attendance
    pub store: Arc<dyn ShiftStore>,
    /// External schedule solver
    pub solver: Arc<dyn ScheduleSolver>,
    /// Language model used by the optimize pass
    pub optimizer: Arc<dyn ScheduleOptimizer>,
    /// Session signing keys
    pub sessions: SessionKeys,
    /// Secret mixed into attendance QR tokens
    pub qr_secret: String,
    /// How auto-schedule requests are assembled
    pub schedule_policy: SchedulePolicy,
}

impl ApiState {
    /// Builds state with the HTTP clients described by `config`.
    pub fn new(config: &config::ApiConfig, store: Arc<dyn ShiftStore>) -> Self {
        Self {
            store,
            solver: Arc::new(HttpSolver::new(config.scheduler_url.clone())),
            optimizer: Arc::new(GeminiOptimizer::new(config.llm.clone())),
            sessions: SessionKeys::new(&config.jwt_secret, config.session_ttl_hours),
            qr_secret: config.qr_secret.clone(),
            schedule_policy: config.schedule_policy.clone(),
        }
    }
}

/// Builds the application router with every route attached.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Signup, login and session lookup
        .merge(routes::auth::routes())
        // Availability toggle and worker self-service
        .merge(routes::availability::routes())
        // Shop configuration and worker roster
        .merge(routes::shop::routes())
        // Attendance QR codes
        .merge(routes::attendance::routes())
        // Auto-schedule, optimize and rendering
        .merge(routes::schedule::routes())
        .layer(TraceLayer::new_for_http())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server with the provided configuration and store
///
/// This function initializes logging, builds the router, applies CORS and
/// timeout layers, and serves until the process is stopped.
///
/// # Example
///
/// ```rust,ignore
/// let config = ApiConfig::from_env()?;
/// let store = Arc::new(PgStore::new(create_pool(&config.database_url).await?));
/// start_server(config, store).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn ShiftStore>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Using {} store", store.backend_name());
    if config.llm.api_key.is_none() {
        info!("LLM_API_KEY not set; schedule optimization will be unavailable");
    }

    let state = Arc::new(ApiState::new(&config, store));
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .wrap_err_with(|| format!("Invalid CORS origin '{}'", origin))
            })
            .collect::<Result<Vec<_>>>()?;

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)))
            .into_inner(),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
