//! Integration test common infrastructure.
//!
//! Provides utilities for spawning the exporter binary and scraping it.

pub mod exporter;

#[allow(unused_imports)]
pub use exporter::TestExporter;
