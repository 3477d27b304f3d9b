//! Event repository.
//!
//! Per-kind counts over the relay's `events` table. Kinds are bound as an
//! array parameter so the tracked list never gets spliced into SQL text.

use super::DbError;
use sqlx::PgPool;

/// Repository for event aggregate queries.
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    /// Create a new event repository.
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count events for each of `kinds`, busiest first, keeping at most `limit` kinds.
    ///
    /// Kinds with no stored events do not appear in the result.
    pub async fn count_by_kind(
        &self,
        kinds: &[i32],
        limit: u32,
    ) -> Result<Vec<(i32, i64)>, DbError> {
        let rows = sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT event_kind, COUNT(id) AS count
            FROM events
            WHERE event_kind = ANY($1)
            GROUP BY event_kind
            ORDER BY COUNT(id) DESC, event_kind ASC
            LIMIT $2
            "#,
        )
        .bind(kinds)
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Count events whose kind is not in `kinds`.
    pub async fn count_excluding(&self, kinds: &[i32]) -> Result<i64, DbError> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT COUNT(id)
            FROM events
            WHERE NOT (event_kind = ANY($1))
            "#,
        )
        .bind(kinds)
        .fetch_optional(self.pool)
        .await?;

        count.ok_or(DbError::EmptyResult("count of untracked event kinds"))
    }
}
