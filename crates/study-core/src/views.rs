//! Nested read shapes returned by join queries and aggregators.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Activity, Answer, Conversation, Question, Quiz, Schedule, Text, User};
use crate::enums::ScheduleStatus;
use crate::stats::QuestionStats;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScheduleWithActivities {
    pub schedule: Schedule,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuestionWithAnswers {
    pub question: Question,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuizWithQuestions {
    pub quiz: Quiz,
    pub questions: Vec<QuestionWithAnswers>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TextWithConversations {
    pub text: Text,
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UserWithSchedules {
    pub user: User,
    pub schedules: Vec<Schedule>,
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A schedule with its activities and the derived date range and status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScheduleOverview {
    pub schedule: Schedule,
    pub activities: Vec<Activity>,
    pub range: DateRange,
    pub status: ScheduleStatus,
}

/// A question paired with its answer statistics, for hardest/easiest rankings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RankedQuestion {
    pub question: Question,
    pub stats: QuestionStats,
}
