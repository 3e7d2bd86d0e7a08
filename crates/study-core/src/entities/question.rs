use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::OptionLetter;

/// One multiple-choice question with four option slots.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub quiz_id: String,
    pub statement: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: OptionLetter,
}

impl Question {
    /// Text of the option in the given slot.
    #[must_use]
    pub fn option(&self, letter: OptionLetter) -> &str {
        match letter {
            OptionLetter::A => &self.option_a,
            OptionLetter::B => &self.option_b,
            OptionLetter::C => &self.option_c,
            OptionLetter::D => &self.option_d,
        }
    }

    #[must_use]
    pub fn is_correct(&self, chosen: OptionLetter) -> bool {
        self.correct_option == chosen
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewQuestion {
    pub quiz_id: String,
    pub statement: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: OptionLetter,
}
