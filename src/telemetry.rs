//! Telemetry utilities for scrape timing and tracing spans.

use crate::metrics::ExporterMetrics;
use std::time::Instant;

/// Guard for timing a scrape and recording metrics.
///
/// Records scrape latency when dropped, so failed and cancelled scrapes are
/// counted as well.
pub struct ScrapeTimer<'a> {
    metrics: &'a ExporterMetrics,
    start: Instant,
}

impl<'a> ScrapeTimer<'a> {
    /// Start timing a scrape.
    pub fn new(metrics: &'a ExporterMetrics) -> Self {
        Self {
            metrics,
            start: Instant::now(),
        }
    }
}

impl Drop for ScrapeTimer<'_> {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.metrics.observe_scrape(duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for one scrape's database reads.
    pub fn scrape() -> Span {
        info_span!("scrape")
    }

    /// Create a span for an inbound scrape request.
    pub fn request(path: &str) -> Span {
        info_span!("request", path = %path)
    }
}
