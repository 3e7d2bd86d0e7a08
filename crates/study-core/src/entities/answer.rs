use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::OptionLetter;

/// A user's answer to a question.
///
/// `is_correct` is only guaranteed to match the question when the answer was
/// written through the validated-create path.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Answer {
    pub id: String,
    pub question_id: String,
    pub user_id: String,
    pub chosen_option: OptionLetter,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: String,
    pub user_id: String,
    pub chosen_option: OptionLetter,
    pub is_correct: bool,
}
