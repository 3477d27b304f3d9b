//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::{IpAddr, Ipv4Addr};

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Database Defaults
// =============================================================================

pub fn default_db_port() -> u16 {
    5432
}

// =============================================================================
// Listener Defaults
// =============================================================================

pub fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

pub fn default_metrics_port() -> u16 {
    9101
}

// =============================================================================
// Collector Defaults
// =============================================================================

/// Event kinds reported individually.
pub fn default_tracked_kinds() -> Vec<i32> {
    vec![
        7,    // reaction (NIP-25)
        1,    // short text note
        6,    // repost (NIP-18)
        1984, // report (NIP-56)
        4,    // encrypted direct message (NIP-04)
        3,    // contacts (NIP-02)
        9735, // zap receipt (NIP-57)
    ]
}

pub fn default_top_kinds() -> u32 {
    5
}

pub fn default_query_timeout_secs() -> u64 {
    10
}
