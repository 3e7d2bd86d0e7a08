//! Quiz update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuizUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Default)]
pub struct QuizUpdateBuilder(QuizUpdate);

impl QuizUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(QuizUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn build(self) -> QuizUpdate {
        self.0
    }
}
