//! Answer update builder.

use serde::Serialize;
use study_core::enums::OptionLetter;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnswerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_option: Option<OptionLetter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Default)]
pub struct AnswerUpdateBuilder(AnswerUpdate);

impl AnswerUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(AnswerUpdate::default())
    }

    #[must_use]
    pub const fn chosen_option(mut self, chosen_option: OptionLetter) -> Self {
        self.0.chosen_option = Some(chosen_option);
        self
    }

    #[must_use]
    pub const fn is_correct(mut self, is_correct: bool) -> Self {
        self.0.is_correct = Some(is_correct);
        self
    }

    #[must_use]
    pub fn build(self) -> AnswerUpdate {
        self.0
    }
}
