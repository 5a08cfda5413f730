//! # Clinic API
//!
//! HTTP front end for the clinic scheduling engine. Doctors publish daily
//! availability, patients book fifteen-minute slots, and either party may
//! cancel an appointment.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Resolve identity, check roles, call the engine
//! - **Middleware**: Identity tokens and error-to-status mapping
//! - **Config**: Environment configuration
//!
//! Scheduling rules live in `clinic-core`; this crate only translates HTTP
//! requests into engine calls.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Identity tokens and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use clinic_core::{
    clock::{ReferenceClock, SystemClock},
    storage::Storage,
    AppointmentService,
};
use clinic_db::{create_pool, schema::initialize_database, MemoryStorage, PgStorage};
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{ApiConfig, StorageBackend};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Scheduling engine
    pub service: AppointmentService,
    /// Reference clock, shared with the engine
    pub clock: Arc<dyn ReferenceClock>,
}

impl ApiState {
    /// Wires the engine to `storage` and `clock`.
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn ReferenceClock>) -> Self {
        Self {
            service: AppointmentService::new(storage, clock.clone()),
            clock,
        }
    }
}

/// Builds the storage selected by `config`.
pub async fn connect_storage(config: &ApiConfig) -> Result<Arc<dyn Storage>> {
    match &config.storage {
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = create_pool(database_url, *max_connections)
                .await
                .wrap_err("Failed to connect to database")?;
            initialize_database(&pool).await?;
            Ok(Arc::new(PgStorage::new(pool)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

/// Builds the application router with all routes and shared state attached.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Signup, schedule and appointment endpoints
        .merge(routes::appointment::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the API server with the provided configuration and storage
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = clinic_api::config::ApiConfig::from_env()?;
/// let storage = clinic_api::connect_storage(&config).await?;
/// clinic_api::start_server(config, storage).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: ApiConfig, storage: Arc<dyn Storage>) -> Result<()> {
    let state = Arc::new(ApiState::new(storage, Arc::new(SystemClock)));
    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse())
            .collect::<Result<Vec<axum::http::HeaderValue>, _>>()
            .wrap_err("Invalid API_CORS_ORIGINS value")?;
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(
                |_: tower::BoxError| async { axum::http::StatusCode::REQUEST_TIMEOUT },
            ))
            .timeout(std::time::Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
