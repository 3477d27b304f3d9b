//! User repository.
//!
//! Admission and balance totals from the relay's `users` table. Balances are
//! stored in msats.

use super::DbError;
use sqlx::PgPool;

/// Repository for user aggregate queries.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Number of admitted users.
    pub async fn admitted_count(&self) -> Result<i64, DbError> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE is_admitted = TRUE
            "#,
        )
        .fetch_optional(self.pool)
        .await?;

        count.ok_or(DbError::EmptyResult("count of admitted users"))
    }

    /// Sum of admitted users' balances in msats. Zero when nobody is admitted.
    pub async fn admitted_balance_msats(&self) -> Result<i64, DbError> {
        // SUM(bigint) is numeric in PostgreSQL; cast back so it decodes as i64.
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(balance), 0)::BIGINT
            FROM users
            WHERE is_admitted = TRUE
            "#,
        )
        .fetch_optional(self.pool)
        .await?;

        total.ok_or(DbError::EmptyResult("sum of admitted user balances"))
    }
}
