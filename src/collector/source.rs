//! Data source abstraction for the collector.

use crate::db::{Database, DbError};
use async_trait::async_trait;

/// Read-only aggregate queries the collector needs per scrape.
///
/// Each call is an independent read; callers must not assume the results of
/// two calls describe the same database state.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Per-kind counts restricted to `kinds`, busiest first, at most `limit` rows.
    async fn count_by_kind(&self, kinds: &[i32], limit: u32) -> Result<Vec<(i32, i64)>, DbError>;

    /// Count of events whose kind is not in `kinds`.
    async fn count_excluding(&self, kinds: &[i32]) -> Result<i64, DbError>;

    /// Number of admitted users.
    async fn admitted_users(&self) -> Result<i64, DbError>;

    /// Balance of admitted users in msats.
    async fn admitted_balance_msats(&self) -> Result<i64, DbError>;
}

#[async_trait]
impl StatsSource for Database {
    async fn count_by_kind(&self, kinds: &[i32], limit: u32) -> Result<Vec<(i32, i64)>, DbError> {
        self.events().count_by_kind(kinds, limit).await
    }

    async fn count_excluding(&self, kinds: &[i32]) -> Result<i64, DbError> {
        self.events().count_excluding(kinds).await
    }

    async fn admitted_users(&self) -> Result<i64, DbError> {
        self.users().admitted_count().await
    }

    async fn admitted_balance_msats(&self) -> Result<i64, DbError> {
        self.users().admitted_balance_msats().await
    }
}
