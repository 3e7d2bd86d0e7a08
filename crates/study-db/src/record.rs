//! The binding between an entity type and its table.

use serde::Serialize;

use crate::error::DatabaseError;
use crate::query::{Column, Row};

/// An entity persisted in one table.
///
/// `from_row` is the single place a backend row becomes a typed entity;
/// `Create` and `Update` are serialized as-is into insert and update payloads.
pub trait Record: Sized + Send + Sync + 'static {
    /// Table name, taken from the column enum so the two cannot disagree.
    const TABLE: &'static str = <Self::Column as Column>::TABLE;

    type Column: Column;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    /// Decode one row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if a column is missing or malformed.
    fn from_row(row: &Row) -> Result<Self, DatabaseError>;

    fn id(&self) -> &str;
}

/// Serialize a create or update payload into a row.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if the payload does not serialize to
/// a JSON object.
pub fn to_row<T: Serialize>(table: &'static str, payload: &T) -> Result<Row, DatabaseError> {
    match serde_json::to_value(payload).map_err(|e| DatabaseError::Other(e.into()))? {
        serde_json::Value::Object(row) => Ok(row),
        other => Err(DatabaseError::InvalidState(format!(
            "payload for '{table}' is not an object: {other}"
        ))),
    }
}
