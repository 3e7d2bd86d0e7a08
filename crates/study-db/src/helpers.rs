//! Row-to-entity parsing helpers.
//!
//! Every record converts a backend [`Row`] (a JSON object keyed by column)
//! into its typed entity. These helpers isolate the parsing logic and absorb
//! the differences between backends: booleans arrive as `true`/`false` from
//! PostgREST but as `0`/`1` from libSQL, and timestamps may be RFC 3339 or
//! `SQLite`'s `"YYYY-MM-DD HH:MM:SS"`.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::error::DatabaseError;
use crate::query::Row;
use crate::record::Record;

/// Parse a timestamp as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns a message if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("Failed to parse datetime '{s}': {e}"))
}

/// Parse a calendar date. Accepts a bare `YYYY-MM-DD` or a full timestamp,
/// in which case the date part is taken.
///
/// # Errors
///
/// Returns a message if the string is neither.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| parse_datetime(s).map(|dt| dt.date_naive()))
        .map_err(|e| format!("Failed to parse date '{s}': {e}"))
}

/// Parse a text value into a serde-deserializable enum.
///
/// # Errors
///
/// Returns a message if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(s.to_string()))
        .map_err(|e| format!("Failed to parse enum from '{s}': {e}"))
}

/// Typed accessors over one row, reporting failures against the row's table.
pub struct RowReader<'a> {
    table: &'static str,
    row: &'a Row,
}

impl<'a> RowReader<'a> {
    #[must_use]
    pub const fn new(table: &'static str, row: &'a Row) -> Self {
        Self { table, row }
    }

    fn error(&self, message: String) -> DatabaseError {
        DatabaseError::Decode {
            table: self.table,
            message,
        }
    }

    fn value(&self, column: &str) -> Option<&'a Value> {
        self.row.get(column).filter(|v| !v.is_null())
    }

    fn required(&self, column: &str) -> Result<&'a Value, DatabaseError> {
        self.value(column)
            .ok_or_else(|| self.error(format!("missing column '{column}'")))
    }

    /// Read a required text column.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the column is missing, null, or not text.
    pub fn string(&self, column: &str) -> Result<String, DatabaseError> {
        self.required(column)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.error(format!("column '{column}' is not text")))
    }

    /// Read a nullable text column. Only null or an absent column is `None`;
    /// an empty string comes back as `Some("")`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the value is present but not text.
    pub fn opt_string(&self, column: &str) -> Result<Option<String>, DatabaseError> {
        match self.value(column) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.error(format!("column '{column}' is not text"))),
        }
    }

    /// Read a boolean column stored either as a JSON bool or as `0`/`1`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the column is missing or not boolean-like.
    pub fn bool(&self, column: &str) -> Result<bool, DatabaseError> {
        match self.required(column)? {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) if n.as_i64() == Some(0) => Ok(false),
            Value::Number(n) if n.as_i64() == Some(1) => Ok(true),
            other => Err(self.error(format!("column '{column}' is not boolean: {other}"))),
        }
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the column is missing or not numeric.
    pub fn f64(&self, column: &str) -> Result<f64, DatabaseError> {
        self.required(column)?
            .as_f64()
            .ok_or_else(|| self.error(format!("column '{column}' is not numeric")))
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the value is present but not numeric.
    pub fn opt_f64(&self, column: &str) -> Result<Option<f64>, DatabaseError> {
        self.value(column)
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| self.error(format!("column '{column}' is not numeric")))
            })
            .transpose()
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the column is missing or not a timestamp.
    pub fn datetime(&self, column: &str) -> Result<DateTime<Utc>, DatabaseError> {
        parse_datetime(&self.string(column)?).map_err(|e| self.error(e))
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the column is missing or not a date.
    pub fn date(&self, column: &str) -> Result<NaiveDate, DatabaseError> {
        parse_date(&self.string(column)?).map_err(|e| self.error(e))
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the value is present but not a date.
    pub fn opt_date(&self, column: &str) -> Result<Option<NaiveDate>, DatabaseError> {
        self.opt_string(column)?
            .map(|s| parse_date(&s).map_err(|e| self.error(e)))
            .transpose()
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the column is missing or holds an
    /// unknown variant.
    pub fn enum_value<T: serde::de::DeserializeOwned>(
        &self,
        column: &str,
    ) -> Result<T, DatabaseError> {
        parse_enum(&self.string(column)?).map_err(|e| self.error(e))
    }

    /// Decode the embedded children of `R`, stored under `R::TABLE`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the embed is missing, not a list, or
    /// holds a row `R` cannot decode.
    pub fn embedded_many<R: Record>(&self) -> Result<Vec<R>, DatabaseError> {
        let Some(value) = self.row.get(R::TABLE) else {
            return Err(self.error(format!("missing embedded '{}'", R::TABLE)));
        };
        let Value::Array(items) = value else {
            return Err(self.error(format!("embedded '{}' is not a list", R::TABLE)));
        };
        items
            .iter()
            .map(|item| match item {
                Value::Object(row) => R::from_row(row),
                other => Err(self.error(format!(
                    "embedded '{}' holds a non-object: {other}",
                    R::TABLE
                ))),
            })
            .collect()
    }

    /// Decode the embedded parent `R`, stored under `R::TABLE`. `None` when null.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the embed holds something other than
    /// an object or null.
    pub fn embedded_one<R: Record>(&self) -> Result<Option<R>, DatabaseError> {
        match self.row.get(R::TABLE) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(row)) => R::from_row(row).map(Some),
            Some(other) => Err(self.error(format!(
                "embedded '{}' is not an object: {other}",
                R::TABLE
            ))),
        }
    }

    /// Raw embedded rows under `table`, for nested reads that decode by hand.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the embed is missing or not a list of objects.
    pub fn embedded_rows(&self, table: &str) -> Result<Vec<&'a Row>, DatabaseError> {
        match self.row.get(table) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_object()
                        .ok_or_else(|| self.error(format!("embedded '{table}' holds a non-object")))
                })
                .collect(),
            _ => Err(self.error(format!("missing embedded '{table}'"))),
        }
    }
}
