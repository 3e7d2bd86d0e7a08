//! Progress update builder.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProgressUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_studied: Option<f64>,
}

#[derive(Default)]
pub struct ProgressUpdateBuilder(ProgressUpdate);

impl ProgressUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ProgressUpdate::default())
    }

    #[must_use]
    pub const fn date(mut self, date: NaiveDate) -> Self {
        self.0.date = Some(date);
        self
    }

    #[must_use]
    pub const fn hours_studied(mut self, hours_studied: f64) -> Self {
        self.0.hours_studied = Some(hours_studied);
        self
    }

    #[must_use]
    pub fn build(self) -> ProgressUpdate {
        self.0
    }
}
