//! Scrape results and their translation into Prometheus metric families.

use crate::config::SatsRounding;
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, IntGauge, IntGaugeVec, Opts, Registry};
use std::fmt;

/// msats per sat.
pub const MSATS_PER_SAT: i64 = 1000;

/// The `kind` label of an `events` sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindLabel {
    Kind(i32),
    /// Everything outside the tracked kinds.
    Other,
}

impl fmt::Display for KindLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => write!(f, "{kind}"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// Stored event count for one kind label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCount {
    pub kind: KindLabel,
    pub count: i64,
}

impl EventCount {
    pub fn new(kind: KindLabel, count: i64) -> Self {
        Self { kind, count }
    }
}

/// Everything one scrape read from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Tracked kinds (busiest first) followed by `other`.
    pub events: Vec<EventCount>,
    /// `None` when user statistics are disabled.
    pub admitted_users: Option<i64>,
    /// `None` when user statistics are disabled.
    pub balance_msats: Option<i64>,
}

impl Snapshot {
    /// Balance in sats, or `None` when user statistics are disabled.
    pub fn sats(&self, rounding: SatsRounding) -> Option<f64> {
        self.balance_msats
            .map(|msats| msats_to_sats(msats, rounding))
    }

    /// Render the snapshot as metric families.
    ///
    /// Uses a registry local to this call so every scrape reports exactly the
    /// series it read, with nothing left over from earlier scrapes.
    pub fn into_families(
        self,
        rounding: SatsRounding,
    ) -> Result<Vec<MetricFamily>, prometheus::Error> {
        let registry = Registry::new();

        let events = IntGaugeVec::new(Opts::new("events", "Count of events by kind"), &["kind"])?;
        registry.register(Box::new(events.clone()))?;
        for row in &self.events {
            events
                .with_label_values(&[&row.kind.to_string()])
                .set(row.count);
        }

        if let Some(admitted) = self.admitted_users {
            let gauge = IntGauge::new("admitted_users", "Count of admitted users")?;
            gauge.set(admitted);
            registry.register(Box::new(gauge))?;
        }

        if let Some(sats) = self.sats(rounding) {
            let gauge = Gauge::new("sats", "Total balance of admitted users in sats")?;
            gauge.set(sats);
            registry.register(Box::new(gauge))?;
        }

        Ok(registry.gather())
    }
}

/// Convert a msat amount to sats.
pub fn msats_to_sats(msats: i64, rounding: SatsRounding) -> f64 {
    match rounding {
        SatsRounding::Exact => msats as f64 / MSATS_PER_SAT as f64,
        SatsRounding::Floor => msats.div_euclid(MSATS_PER_SAT) as f64,
    }
}
