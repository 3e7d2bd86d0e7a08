//! Query backends.
//!
//! A [`QueryBackend`] is the table-scoped query interface the repositories
//! sit on: filtered selects with embeds, exact counts, bulk insert, and
//! update/delete by predicate. Two implementations ship:
//!
//! - [`postgrest::PostgrestBackend`]: the hosted REST API over HTTP.
//! - [`local::LocalBackend`]: an embedded libSQL database, used for tests and
//!   offline work.

pub mod local;
pub mod postgrest;

use async_trait::async_trait;
use thiserror::Error;

use crate::query::{Predicate, Query, Row};

/// Errors raised by a backend round trip.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A single-row call matched zero rows.
    #[error("no rows returned")]
    NoRows,

    /// A single-row call matched more than one row.
    #[error("expected a single row, got {0}")]
    MultipleRows(usize),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        /// Postgres SQLSTATE or PostgREST error code, when reported.
        code: Option<String>,
        message: String,
    },

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// A response could not be decoded into rows.
    #[error("decode error: {0}")]
    Decode(String),

    /// The query cannot be expressed by this backend.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Short backend name for log fields.
    fn name(&self) -> &'static str;

    async fn select(&self, query: &Query) -> Result<Vec<Row>, BackendError>;

    /// Fetch exactly one row.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NoRows`] when nothing matches and
    /// [`BackendError::MultipleRows`] when more than one row does.
    async fn select_single(&self, query: &Query) -> Result<Row, BackendError> {
        exactly_one(self.select(query).await?)
    }

    /// Exact number of matching rows, without fetching them.
    async fn count(&self, query: &Query) -> Result<u64, BackendError>;

    /// Insert all rows in one call. Either every row is written or none is.
    async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<Vec<Row>, BackendError>;

    /// Apply `values` to every row matching `predicates`; returns the updated rows.
    async fn update(
        &self,
        table: &'static str,
        predicates: &[Predicate],
        values: Row,
    ) -> Result<Vec<Row>, BackendError>;

    /// Update exactly one row.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NoRows`] when nothing matched.
    async fn update_single(
        &self,
        table: &'static str,
        predicates: &[Predicate],
        values: Row,
    ) -> Result<Row, BackendError> {
        exactly_one(self.update(table, predicates, values).await?)
    }

    /// Delete every row matching `predicates`; returns the deleted rows.
    async fn delete(
        &self,
        table: &'static str,
        predicates: &[Predicate],
    ) -> Result<Vec<Row>, BackendError>;
}

fn exactly_one(mut rows: Vec<Row>) -> Result<Row, BackendError> {
    match rows.len() {
        0 => Err(BackendError::NoRows),
        1 => Ok(rows.swap_remove(0)),
        n => Err(BackendError::MultipleRows(n)),
    }
}
