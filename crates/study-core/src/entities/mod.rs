//! Entity structs for every studyhub table, plus their creation payloads.
//!
//! Entities mirror the backend rows one-to-one. Creation payloads (`New*`)
//! omit generated columns (`id`, timestamps) and leave defaulted columns as
//! `Option` so the backend default applies when they are `None`.

mod activity;
mod answer;
mod conversation;
mod goal;
mod progress;
mod question;
mod quiz;
mod schedule;
mod text;
mod user;

pub use activity::{Activity, NewActivity};
pub use answer::{Answer, NewAnswer};
pub use conversation::{Conversation, NewConversation};
pub use goal::{Goal, NewGoal};
pub use progress::{NewProgress, Progress};
pub use question::{NewQuestion, Question};
pub use quiz::{NewQuiz, Quiz};
pub use schedule::{NewSchedule, Schedule};
pub use text::{NewText, Text};
pub use user::{NewUser, User};
