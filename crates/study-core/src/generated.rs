//! Payloads produced by the generative-content client.
//!
//! The client is asked to emit JSON matching these shapes (their JSON Schema
//! is available through [`schema_of`]). Drafts carry everything except the
//! foreign key of the parent, which only exists once the parent is persisted;
//! `into_new` completes them into creation payloads.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entities::{NewActivity, NewGoal, NewQuestion, NewSchedule, NewQuiz};
use crate::enums::OptionLetter;
use crate::errors::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ActivityDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ActivityDraft {
    #[must_use]
    pub fn into_new(self, schedule_id: &str) -> NewActivity {
        NewActivity {
            schedule_id: schedule_id.to_string(),
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            status: None,
        }
    }
}

/// A study plan with its activities.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GeneratedSchedule {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub activities: Vec<ActivityDraft>,
}

impl GeneratedSchedule {
    /// Split into the parent payload and the child drafts.
    #[must_use]
    pub fn into_parts(self, user_id: &str) -> (NewSchedule, Vec<ActivityDraft>) {
        (
            NewSchedule {
                user_id: user_id.to_string(),
                title: self.title,
                description: self.description,
            },
            self.activities,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuestionDraft {
    pub statement: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: OptionLetter,
}

impl QuestionDraft {
    #[must_use]
    pub fn into_new(self, quiz_id: &str) -> NewQuestion {
        NewQuestion {
            quiz_id: quiz_id.to_string(),
            statement: self.statement,
            option_a: self.option_a,
            option_b: self.option_b,
            option_c: self.option_c,
            option_d: self.option_d,
            correct_option: self.correct_option,
        }
    }
}

/// A quiz with its questions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GeneratedQuiz {
    pub title: String,
    pub questions: Vec<QuestionDraft>,
}

impl GeneratedQuiz {
    #[must_use]
    pub fn into_parts(self, user_id: &str) -> (NewQuiz, Vec<QuestionDraft>) {
        (
            NewQuiz {
                user_id: user_id.to_string(),
                title: self.title,
            },
            self.questions,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GeneratedGoal {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expected_value: Option<f64>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl GeneratedGoal {
    #[must_use]
    pub fn into_new(self, user_id: &str) -> NewGoal {
        NewGoal {
            user_id: user_id.to_string(),
            title: self.title,
            description: self.description,
            expected_value: self.expected_value,
            due_date: self.due_date,
            achieved: None,
        }
    }
}

/// Parse a generated JSON payload.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the JSON does not match `T`.
pub fn parse_generated<T: DeserializeOwned>(json: &str) -> Result<T, CoreError> {
    serde_json::from_str(json)
        .map_err(|e| CoreError::Validation(format!("generated payload does not match schema: {e}")))
}

/// JSON Schema for a generated payload type, as handed to the content client.
#[must_use]
pub fn schema_of<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEDULE_JSON: &str = r#"{
        "title": "Linear algebra",
        "activities": [
            {"title": "Vectors", "start_date": "2024-01-01", "end_date": "2024-01-05"},
            {"title": "Matrices", "description": "ch. 2", "start_date": "2024-01-06", "end_date": "2024-01-20"}
        ]
    }"#;

    #[test]
    fn parses_generated_schedule_and_completes_drafts() {
        let generated: GeneratedSchedule = parse_generated(SCHEDULE_JSON).unwrap();
        let (schedule, drafts) = generated.into_parts("usr-00000001");
        assert_eq!(schedule.user_id, "usr-00000001");
        assert_eq!(schedule.description, None);
        assert_eq!(drafts.len(), 2);

        let activity = drafts[1].clone().into_new("sch-00000001");
        assert_eq!(activity.schedule_id, "sch-00000001");
        assert_eq!(activity.description.as_deref(), Some("ch. 2"));
        assert_eq!(activity.status, None);
    }

    #[test]
    fn rejects_payload_with_bad_option_letter() {
        let json = r#"{"title": "Q", "questions": [{
            "statement": "2+2", "option_a": "3", "option_b": "4",
            "option_c": "5", "option_d": "6", "correct_option": "E"
        }]}"#;
        let result = parse_generated::<GeneratedQuiz>(json);
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn schema_validates_generated_payload() {
        let schema = schema_of::<GeneratedSchedule>();
        let instance: serde_json::Value = serde_json::from_str(SCHEDULE_JSON).unwrap();
        let validator = jsonschema::validator_for(&schema).unwrap();
        assert!(validator.is_valid(&instance));

        let missing_title = serde_json::json!({"activities": []});
        assert!(!validator.is_valid(&missing_title));
    }
}
