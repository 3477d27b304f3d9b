//! Database module for relay statistics.
//!
//! Provides read-only async PostgreSQL access using SQLx against the tables
//! nostream maintains:
//! - `events` for per-kind event counts
//! - `users` for admission and paid balance totals

mod events;
mod users;

pub use events::EventRepository;
pub use users::UserRepository;

use crate::config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("query returned no rows: {0}")]
    EmptyResult(&'static str),
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connection acquire timeout - a dead database fails the scrape instead of hanging it.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Scrapes run their queries sequentially, so two connections cover overlapping scrapes.
    const MAX_CONNECTIONS: u32 = 2;

    /// Create a database handle.
    ///
    /// No connection is opened here; the pool connects on first use, so an
    /// unreachable database surfaces as a failed scrape rather than a failed startup.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password)
            .application_name(env!("CARGO_PKG_NAME"));

        let pool = PgPoolOptions::new()
            .max_connections(Self::MAX_CONNECTIONS)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .idle_timeout(Some(Self::IDLE_TIMEOUT))
            .test_before_acquire(true)
            .connect_lazy_with(options);

        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            "Database pool configured"
        );

        Self { pool }
    }

    /// Get event repository.
    pub fn events(&self) -> EventRepository<'_> {
        EventRepository::new(&self.pool)
    }

    /// Get user repository.
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
