//! Activity update builder.

use chrono::NaiveDate;
use serde::Serialize;
use study_core::enums::ActivityStatus;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatus>,
}

#[derive(Default)]
pub struct ActivityUpdateBuilder(ActivityUpdate);

impl ActivityUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ActivityUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub const fn start_date(mut self, start_date: NaiveDate) -> Self {
        self.0.start_date = Some(start_date);
        self
    }

    #[must_use]
    pub const fn end_date(mut self, end_date: NaiveDate) -> Self {
        self.0.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub const fn status(mut self, status: ActivityStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> ActivityUpdate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_set_fields_are_serialized() {
        let update = ActivityUpdateBuilder::new()
            .status(ActivityStatus::Done)
            .description(None)
            .build();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"status": "done", "description": null})
        );
    }

    #[test]
    fn empty_update_serializes_to_empty_object() {
        let update = ActivityUpdateBuilder::new().build();
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({}));
    }
}
