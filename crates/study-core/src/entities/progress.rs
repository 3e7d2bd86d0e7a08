use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Hours studied by a user on one day.
///
/// One row per `(user_id, date)` is the convention; the backend does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Progress {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub hours_studied: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewProgress {
    pub user_id: String,
    pub date: NaiveDate,
    pub hours_studied: f64,
}
