//! Errors raised by the core data shapes.
//!
//! Storage errors (`DatabaseError`, `BackendError`) live in `study-db`;
//! configuration errors live in `study-config`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A payload failed shape, format or enum checks.
    #[error("Validation error: {0}")]
    Validation(String),
}
