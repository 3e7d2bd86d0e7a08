//! ID prefixes for locally generated identifiers.
//!
//! The local store generates ids as `{prefix}-{16 hex chars}` (e.g. `sch-a3f8b2c19e04d7f1`).
//! Remote backends generate their own opaque ids; callers must never parse them.

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_SCHEDULE: &str = "sch";
pub const PREFIX_ACTIVITY: &str = "act";
pub const PREFIX_GOAL: &str = "gol";
pub const PREFIX_PROGRESS: &str = "prg";
pub const PREFIX_QUIZ: &str = "qiz";
pub const PREFIX_QUESTION: &str = "qst";
pub const PREFIX_ANSWER: &str = "ans";
pub const PREFIX_TEXT: &str = "txt";
pub const PREFIX_CONVERSATION: &str = "cnv";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_USER,
    PREFIX_SCHEDULE,
    PREFIX_ACTIVITY,
    PREFIX_GOAL,
    PREFIX_PROGRESS,
    PREFIX_QUIZ,
    PREFIX_QUESTION,
    PREFIX_ANSWER,
    PREFIX_TEXT,
    PREFIX_CONVERSATION,
];
