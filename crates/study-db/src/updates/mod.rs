//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields are serialized, so only they reach the backend's update payload.
//! Nullable columns use `Option<Option<T>>`: `Some(None)` clears the column.

pub mod activity;
pub mod answer;
pub mod conversation;
pub mod goal;
pub mod progress;
pub mod question;
pub mod quiz;
pub mod schedule;
pub mod text;
pub mod user;

pub use activity::{ActivityUpdate, ActivityUpdateBuilder};
pub use answer::{AnswerUpdate, AnswerUpdateBuilder};
pub use conversation::{ConversationUpdate, ConversationUpdateBuilder};
pub use goal::{GoalUpdate, GoalUpdateBuilder};
pub use progress::{ProgressUpdate, ProgressUpdateBuilder};
pub use question::{QuestionUpdate, QuestionUpdateBuilder};
pub use quiz::{QuizUpdate, QuizUpdateBuilder};
pub use schedule::{ScheduleUpdate, ScheduleUpdateBuilder};
pub use text::{TextUpdate, TextUpdateBuilder};
pub use user::{UserUpdate, UserUpdateBuilder};
