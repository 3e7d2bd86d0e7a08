//! Status, option, and kind enums for studyhub.
//!
//! Each enum exposes `as_str()` returning the exact value stored in the
//! backend, and converts into a `serde_json::Value` so it can be used
//! directly as a filter value.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ActivityStatus
// ---------------------------------------------------------------------------

/// Progress of a single scheduled activity.
///
/// ```text
/// pending → in-progress → done
/// ```
///
/// Transitions are not guarded: any update may set any value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl ActivityStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Done];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ActivityStatus> for serde_json::Value {
    fn from(status: ActivityStatus) -> Self {
        Self::String(status.as_str().to_string())
    }
}

// ---------------------------------------------------------------------------
// OptionLetter
// ---------------------------------------------------------------------------

/// One of the four answer slots of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OptionLetter> for serde_json::Value {
    fn from(letter: OptionLetter) -> Self {
        Self::String(letter.as_str().to_string())
    }
}

// ---------------------------------------------------------------------------
// TextKind
// ---------------------------------------------------------------------------

/// Whether a stored text is a free-form text or a generated summary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    #[default]
    Text,
    Summary,
}

impl TextKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for TextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TextKind> for serde_json::Value {
    fn from(kind: TextKind) -> Self {
        Self::String(kind.as_str().to_string())
    }
}

// ---------------------------------------------------------------------------
// ScheduleStatus
// ---------------------------------------------------------------------------

/// Where a date range sits relative to "now". Derived on every read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Future,
    Active,
    Expired,
}

impl ScheduleStatus {
    /// Classify `now` against the inclusive range `start..=end`.
    ///
    /// `Future` if `now < start`, `Expired` if `now > end`, otherwise `Active`.
    /// The `start` check wins for inverted ranges.
    #[must_use]
    pub fn classify(start: NaiveDate, end: NaiveDate, now: NaiveDate) -> Self {
        if now < start {
            Self::Future
        } else if now > end {
            Self::Expired
        } else {
            Self::Active
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Future => "future",
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
