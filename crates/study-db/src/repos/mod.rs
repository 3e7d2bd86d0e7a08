//! Entity repositories.
//!
//! Each module binds one `study_core` entity to its table (column enum plus
//! [`Record`](crate::record::Record) impl) and wraps a
//! [`TableRepository`](crate::table::TableRepository) with the entity's
//! domain queries. Generic CRUD comes from
//! [`Repository`](crate::repository::Repository).

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

pub use activity::{ActivityColumn, ActivityRepo};
pub use answer::{AnswerColumn, AnswerRepo};
pub use conversation::{ConversationColumn, ConversationRepo};
pub use goal::{GoalColumn, GoalRepo};
pub use progress::{ProgressColumn, ProgressRepo};
pub use question::{QuestionColumn, QuestionRepo};
pub use quiz::{QuizColumn, QuizRepo};
pub use schedule::{ScheduleColumn, ScheduleRepo};
pub use text::{TextColumn, TextRepo};
pub use user::{UserColumn, UserRepo};

use chrono::{NaiveDate, Utc};

/// The current calendar day in UTC.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// `day + days`, saturating at the calendar's end.
pub(crate) fn days_after(day: NaiveDate, days: u32) -> NaiveDate {
    day.checked_add_days(chrono::Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}
