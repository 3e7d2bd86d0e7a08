//! Schedule update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

#[derive(Default)]
pub struct ScheduleUpdateBuilder(ScheduleUpdate);

impl ScheduleUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ScheduleUpdate::default())
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
    pub fn build(self) -> ScheduleUpdate {
        self.0
    }
}
