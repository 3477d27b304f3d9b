//! Relay statistics collector.
//!
//! On every scrape the collector runs a fixed set of aggregate queries and
//! turns the rows into gauges:
//!
//! - `events{kind}` - stored events per tracked kind, plus `kind="other"`
//! - `admitted_users` - admitted users (when user stats are enabled)
//! - `sats` - admitted users' balance in sats (when user stats are enabled)
//!
//! A scrape is all-or-nothing: any failure returns an error and no families.

mod snapshot;
mod source;

pub use snapshot::{EventCount, KindLabel, Snapshot};
pub use source::StatsSource;

use crate::config::CollectorConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::telemetry::spans;
use prometheus::proto::MetricFamily;
use std::sync::Arc;
use tracing::{Instrument, debug};

/// Collects relay statistics from a [`StatsSource`].
pub struct RelayCollector {
    source: Arc<dyn StatsSource>,
    config: CollectorConfig,
}

impl RelayCollector {
    pub fn new(source: Arc<dyn StatsSource>, config: CollectorConfig) -> Self {
        Self { source, config }
    }

    /// Run one scrape and return the resulting metric families.
    pub async fn collect(&self) -> ScrapeResult<Vec<MetricFamily>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.into_families(self.config.sats_rounding)?)
    }

    /// Read the current statistics, bounded by the configured query timeout.
    pub async fn snapshot(&self) -> ScrapeResult<Snapshot> {
        let timeout = self.config.query_timeout();
        let read = self.read().instrument(spans::scrape());
        tokio::time::timeout(timeout, read)
            .await
            .map_err(|_| ScrapeError::Timeout(timeout))?
    }

    async fn read(&self) -> ScrapeResult<Snapshot> {
        let kinds = &self.config.tracked_kinds;

        let mut events: Vec<EventCount> = self
            .source
            .count_by_kind(kinds, self.config.top_kinds)
            .await?
            .into_iter()
            .map(|(kind, n)| EventCount::new(KindLabel::Kind(kind), n))
            .collect();

        let other = self.source.count_excluding(kinds).await?;
        events.push(EventCount::new(KindLabel::Other, other));

        let (admitted_users, balance_msats) = if self.config.user_stats {
            let admitted = self.source.admitted_users().await?;
            let balance = self.source.admitted_balance_msats().await?;
            (Some(admitted), Some(balance))
        } else {
            (None, None)
        };

        debug!(
            kinds = events.len() - 1,
            other,
            admitted_users = ?admitted_users,
            "Relay statistics read"
        );

        Ok(Snapshot {
            events,
            admitted_users,
            balance_msats,
        })
    }
}
