//! Prometheus metrics for nostream-exporter itself.
//!
//! Relay statistics are produced fresh per scrape by [`crate::collector`].
//! This module owns the exporter's self-observability metrics, registered on
//! a [`Registry`] constructed at startup:
//!
//! - `request_processing_seconds` - time spent collecting per scrape
//! - `scrape_errors_total{error}` - failed scrapes by error code

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Exporter self-metrics and the registry they live in.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    scrape_duration: Histogram,
    scrape_errors: IntCounterVec,
}

impl ExporterMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Default buckets, 5ms to 10s.
        let opts = HistogramOpts::new(
            "request_processing_seconds",
            "Time spent processing request",
        );
        let scrape_duration = Histogram::with_opts(opts)?;
        registry.register(Box::new(scrape_duration.clone()))?;

        let scrape_errors = IntCounterVec::new(
            Opts::new("scrape_errors_total", "Scrapes that failed, by error"),
            &["error"],
        )?;
        registry.register(Box::new(scrape_errors.clone()))?;

        Ok(Self {
            registry,
            scrape_duration,
            scrape_errors,
        })
    }

    /// Record how long one scrape took.
    #[inline]
    pub fn observe_scrape(&self, duration_secs: f64) {
        self.scrape_duration.observe(duration_secs);
    }

    /// Record a failed scrape.
    #[inline]
    pub fn record_scrape_error(&self, error: &str) {
        self.scrape_errors.with_label_values(&[error]).inc();
    }

    /// Current self-metric families.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

/// Encode metric families in Prometheus text format.
pub fn encode_text(families: &[MetricFamily]) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
