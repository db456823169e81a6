//! Librarium - Library Management Core
//!
//! Catalog, membership and circulation management over a relational store.
//! The crate is embedded by a front end (console menu, service, ...) that
//! drives the services; all persistent state lives in Postgres and every
//! statement goes through bound parameters.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod presenter;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// One operator session: configuration plus the services bound to a single
/// store handle, acquired at startup and released on drop. Passed
/// explicitly to callers instead of living in process globals.
#[derive(Clone)]
pub struct Library {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl Library {
    /// Connect to the store, run pending migrations and build the services.
    pub async fn connect(config: AppConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect(&config.database.url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

        tracing::info!("connected to store");

        let repository = repository::Repository::new(pool);
        let services = services::Services::new(repository);

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}

/// Initialize tracing with an env-filter; `default_level` applies when
/// RUST_LOG is unset. Safe to call more than once.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("librarium={}", default_level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
