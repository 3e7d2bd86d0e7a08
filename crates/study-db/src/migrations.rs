//! Database migration runner for the local backend.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::backend::local::LocalBackend;
use crate::error::DatabaseError;

/// Initial schema: 10 tables, 12 indexes.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl LocalBackend {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn()
            .await
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
