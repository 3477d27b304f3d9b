//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("collector.tracked_kinds must not be empty")]
    NoTrackedKinds,
    #[error("collector.tracked_kinds contains negative kind {0}")]
    NegativeKind(i32),
    #[error("collector.tracked_kinds lists kind {0} more than once")]
    DuplicateKind(i32),
    #[error("collector.top_kinds must be at least 1")]
    ZeroTopKinds,
    #[error("collector.query_timeout_secs must be at least 1")]
    ZeroQueryTimeout,
    #[error("METRICS_PORT must not be 0")]
    ZeroMetricsPort,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let collector = &config.collector;

    if collector.tracked_kinds.is_empty() {
        errors.push(ValidationError::NoTrackedKinds);
    }
    for (i, &kind) in collector.tracked_kinds.iter().enumerate() {
        if kind < 0 {
            errors.push(ValidationError::NegativeKind(kind));
        }
        if collector.tracked_kinds[..i].contains(&kind) {
            errors.push(ValidationError::DuplicateKind(kind));
        }
    }

    if collector.top_kinds == 0 {
        errors.push(ValidationError::ZeroTopKinds);
    }
    if collector.query_timeout_secs == 0 {
        errors.push(ValidationError::ZeroQueryTimeout);
    }
    if config.listen.port == 0 {
        errors.push(ValidationError::ZeroMetricsPort);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
