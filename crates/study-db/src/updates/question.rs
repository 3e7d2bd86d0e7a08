//! Question update builder.

use serde::Serialize;
use study_core::enums::OptionLetter;

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuestionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_d: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<OptionLetter>,
}

#[derive(Default)]
pub struct QuestionUpdateBuilder(QuestionUpdate);

impl QuestionUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(QuestionUpdate::default())
    }

    #[must_use]
    pub fn statement(mut self, statement: impl Into<String>) -> Self {
        self.0.statement = Some(statement.into());
        self
    }

    /// Set the text of one option slot.
    #[must_use]
    pub fn option(mut self, letter: OptionLetter, text: impl Into<String>) -> Self {
        let slot = match letter {
            OptionLetter::A => &mut self.0.option_a,
            OptionLetter::B => &mut self.0.option_b,
            OptionLetter::C => &mut self.0.option_c,
            OptionLetter::D => &mut self.0.option_d,
        };
        *slot = Some(text.into());
        self
    }

    #[must_use]
    pub const fn correct_option(mut self, correct_option: OptionLetter) -> Self {
        self.0.correct_option = Some(correct_option);
        self
    }

    #[must_use]
    pub fn build(self) -> QuestionUpdate {
        self.0
    }
}
