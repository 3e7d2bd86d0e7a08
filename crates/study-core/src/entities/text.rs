use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::TextKind;

/// A stored text or generated summary, with an optional follow-up conversation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Text {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub kind: TextKind,
    pub original_prompt: Option<String>,
    pub saved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewText {
    pub user_id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TextKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
}
