//! Core configuration types and loading.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_bind, default_db_port, default_metrics_port, default_query_timeout_secs,
    default_top_kinds, default_tracked_kinds, default_true,
};
use super::validation::{self, ValidationError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: '{value}' ({reason})")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {}", format_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Exporter configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Relay database credentials.
    pub database: DatabaseConfig,
    /// HTTP listener for the scrape endpoint.
    pub listen: ListenConfig,
    /// Which statistics are collected and how.
    pub collector: CollectorConfig,
}

/// PostgreSQL connection settings.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Scrape endpoint listener configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenConfig {
    /// Address to bind to (default: 127.0.0.1).
    pub bind: IpAddr,
    /// Port to bind to (default: 9101).
    pub port: u16,
}

impl ListenConfig {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_metrics_port(),
        }
    }
}

/// How the balance total is converted from msats to sats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatsRounding {
    /// Fractional sats are kept (`1500` msats -> `1.5`).
    #[default]
    Exact,
    /// Fractional sats are dropped (`1500` msats -> `1`).
    Floor,
}

/// Collector tuning, read from the `[collector]` section of the optional config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    /// Event kinds reported individually. Everything else is folded into `other`.
    ///
    /// Kept short on purpose: every kind is a separate time series.
    #[serde(default = "default_tracked_kinds")]
    pub tracked_kinds: Vec<i32>,
    /// How many tracked kinds are reported, busiest first.
    #[serde(default = "default_top_kinds")]
    pub top_kinds: u32,
    /// Collect `admitted_users` and `sats`.
    #[serde(default = "default_true")]
    pub user_stats: bool,
    /// Upper bound on the query phase of a single scrape.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    #[serde(default)]
    pub sats_rounding: SatsRounding,
}

impl CollectorConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            tracked_kinds: default_tracked_kinds(),
            top_kinds: default_top_kinds(),
            user_stats: true,
            query_timeout_secs: default_query_timeout_secs(),
            sats_rounding: SatsRounding::default(),
        }
    }
}

/// On-disk layout of the optional TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    collector: CollectorConfig,
}

impl Config {
    /// Load configuration from the process environment and an optional TOML file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_lookup(path, |key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve environment variables.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingVar(key));

        let database = DatabaseConfig {
            host: require("DB_HOST")?,
            name: require("DB_NAME")?,
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
            port: parse_var("DB_PORT", get("DB_PORT"))?.unwrap_or_else(default_db_port),
        };

        let listen = ListenConfig {
            bind: parse_var("METRICS_BIND", get("METRICS_BIND"))?.unwrap_or_else(default_bind),
            port: parse_var("METRICS_PORT", get("METRICS_PORT"))?
                .unwrap_or_else(default_metrics_port),
        };

        let mut collector = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str::<FileConfig>(&content)?.collector
            }
            None => CollectorConfig::default(),
        };
        if let Some(user_stats) = get("COLLECT_USER_STATS") {
            collector.user_stats = parse_bool("COLLECT_USER_STATS", &user_stats)?;
        }

        let config = Config {
            database,
            listen,
            collector,
        };
        validation::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

fn parse_var<T>(name: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
                name,
                reason: e.to_string(),
                value: v,
            })
        })
        .transpose()
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidVar {
            name,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
