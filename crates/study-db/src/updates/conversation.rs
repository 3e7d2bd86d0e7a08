//! Conversation update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

#[derive(Default)]
pub struct ConversationUpdateBuilder(ConversationUpdate);

impl ConversationUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ConversationUpdate::default())
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.0.prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn response(mut self, response: impl Into<String>) -> Self {
        self.0.response = Some(response.into());
        self
    }

    #[must_use]
    pub fn build(self) -> ConversationUpdate {
        self.0
    }
}
