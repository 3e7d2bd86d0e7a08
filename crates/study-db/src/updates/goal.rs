//! Goal update builder.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GoalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved: Option<bool>,
}

#[derive(Default)]
pub struct GoalUpdateBuilder(GoalUpdate);

impl GoalUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(GoalUpdate::default())
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
    pub const fn expected_value(mut self, expected_value: Option<f64>) -> Self {
        self.0.expected_value = Some(expected_value);
        self
    }

    #[must_use]
    pub const fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.0.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub const fn achieved(mut self, achieved: bool) -> Self {
        self.0.achieved = Some(achieved);
        self
    }

    #[must_use]
    pub fn build(self) -> GoalUpdate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clearing_due_date_serializes_null() {
        let update = GoalUpdateBuilder::new().due_date(None).achieved(true).build();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"due_date": null, "achieved": true})
        );
    }
}
