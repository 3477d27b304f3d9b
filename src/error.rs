//! Unified error handling for nostream-exporter.
//!
//! Startup errors live in `config::ConfigError`; database errors stay in
//! `db/mod.rs` next to sqlx. This module holds the per-scrape error that the
//! HTTP layer turns into a failed response.

use crate::db::DbError;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a single scrape. No metrics are emitted for that scrape.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("queries did not finish within {0:?}")]
    Timeout(Duration),

    #[error("failed to build metrics: {0}")]
    Encode(#[from] prometheus::Error),
}

impl ScrapeError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Database(DbError::Sqlx(_)) => "database",
            Self::Database(DbError::EmptyResult(_)) => "empty_result",
            Self::Timeout(_) => "timeout",
            Self::Encode(_) => "encode",
        }
    }
}

/// Result type for a scrape.
pub type ScrapeResult<T> = Result<T, ScrapeError>;
