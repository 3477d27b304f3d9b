//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and environment/file loading
//! - [`defaults`]: Default value functions shared by serde and the env loader
//! - [`validation`]: Startup checks that report every problem at once

mod defaults;
mod types;
mod validation;

pub use types::{CollectorConfig, Config, DatabaseConfig, SatsRounding};
