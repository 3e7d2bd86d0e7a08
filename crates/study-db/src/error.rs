//! Database error types for study-db.

use study_config::ConfigError;
use thiserror::Error;

use crate::backend::BackendError;

/// Postgres SQLSTATE for a unique violation.
pub const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for a foreign key violation.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors from repository and aggregator operations.
///
/// A missing row is never an error: single-row lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A backend round trip failed. Carries the attempted operation and table.
    #[error("{operation} on '{table}' failed: {source}")]
    Backend {
        operation: &'static str,
        table: &'static str,
        #[source]
        source: BackendError,
    },

    /// A returned row could not be converted into its entity.
    #[error("Failed to decode '{table}' row: {message}")]
    Decode {
        table: &'static str,
        message: String,
    },

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A compare-and-set write found the row changed since it was read.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A multi-step write failed and its compensating step failed too.
    #[error("Partial failure: {0}")]
    PartialFailure(String),

    /// Invalid state encountered (e.g., a write returned no row).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Store could not be built from configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Wrap a backend error with the operation and table it came from.
    pub(crate) fn backend(
        operation: &'static str,
        table: &'static str,
    ) -> impl FnOnce(BackendError) -> Self {
        move |source| Self::Backend {
            operation,
            table,
            source,
        }
    }

    /// The constraint code behind a failed write, if any.
    ///
    /// Remote errors report the Postgres SQLSTATE directly. Local libSQL
    /// errors are mapped onto the same codes from their message, so callers
    /// can match on [`UNIQUE_VIOLATION`] and [`FOREIGN_KEY_VIOLATION`]
    /// regardless of backend.
    #[must_use]
    pub fn constraint_code(&self) -> Option<&str> {
        let Self::Backend { source, .. } = self else {
            return None;
        };
        match source {
            BackendError::Api { code, .. } => code.as_deref(),
            BackendError::LibSql(e) => {
                let msg = e.to_string();
                if msg.contains("UNIQUE constraint failed") {
                    Some(UNIQUE_VIOLATION)
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    Some(FOREIGN_KEY_VIOLATION)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        self.constraint_code() == Some(UNIQUE_VIOLATION)
    }

    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        self.constraint_code() == Some(FOREIGN_KEY_VIOLATION)
    }
}
