//! Text update builder.

use serde::Serialize;
use study_core::enums::TextKind;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TextUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TextKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
}

#[derive(Default)]
pub struct TextUpdateBuilder(TextUpdate);

impl TextUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(TextUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.0.content = Some(content.into());
        self
    }

    #[must_use]
    pub const fn kind(mut self, kind: TextKind) -> Self {
        self.0.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn original_prompt(mut self, original_prompt: Option<String>) -> Self {
        self.0.original_prompt = Some(original_prompt);
        self
    }

    #[must_use]
    pub const fn saved(mut self, saved: bool) -> Self {
        self.0.saved = Some(saved);
        self
    }

    #[must_use]
    pub fn build(self) -> TextUpdate {
        self.0
    }
}
