//! Derived statistics records.
//!
//! None of these are stored. Repositories compute them from a handful of
//! concurrent count/select queries and combine the results client-side.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `round(part / total * 100)`, or `0` when `total` is zero.
#[must_use]
pub fn percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Activity counts for one schedule.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScheduleStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub done: u64,
    pub completion_percentage: u32,
}

impl ScheduleStats {
    #[must_use]
    pub fn new(total: u64, pending: u64, in_progress: u64, done: u64) -> Self {
        Self {
            total,
            pending,
            in_progress,
            done,
            completion_percentage: percentage(done, total),
        }
    }
}

/// Answer counts for one question.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuestionStats {
    pub total_answers: u64,
    pub correct_answers: u64,
    pub accuracy_percentage: u32,
}

impl QuestionStats {
    #[must_use]
    pub fn new(total_answers: u64, correct_answers: u64) -> Self {
        Self {
            total_answers,
            correct_answers,
            accuracy_percentage: percentage(correct_answers, total_answers),
        }
    }
}

/// Question and answer counts for one quiz.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuizStats {
    pub question_count: u64,
    pub answer_count: u64,
    pub correct_count: u64,
    pub accuracy_percentage: u32,
}

impl QuizStats {
    #[must_use]
    pub fn new(question_count: u64, answer_count: u64, correct_count: u64) -> Self {
        Self {
            question_count,
            answer_count,
            correct_count,
            accuracy_percentage: percentage(correct_count, answer_count),
        }
    }
}

/// All answers given by one user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AnswerStats {
    pub total: u64,
    pub correct: u64,
    pub accuracy_percentage: u32,
}

impl AnswerStats {
    #[must_use]
    pub fn new(total: u64, correct: u64) -> Self {
        Self {
            total,
            correct,
            accuracy_percentage: percentage(correct, total),
        }
    }
}

/// Goal counts for one user. `overdue` counts unachieved goals past their due date.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GoalStats {
    pub total: u64,
    pub achieved: u64,
    pub pending: u64,
    pub overdue: u64,
    pub achievement_percentage: u32,
}

impl GoalStats {
    #[must_use]
    pub fn new(total: u64, achieved: u64, overdue: u64) -> Self {
        Self {
            total,
            achieved,
            pending: total.saturating_sub(achieved),
            overdue,
            achievement_percentage: percentage(achieved, total),
        }
    }
}

/// Study hours over a date window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProgressStats {
    /// Days with at least one progress row.
    pub days_studied: u64,
    pub total_hours: f64,
    /// `total_hours / days_studied`, `0.0` when nothing was recorded.
    pub average_hours: f64,
}

impl ProgressStats {
    #[must_use]
    pub fn new(days_studied: u64, total_hours: f64) -> Self {
        let average_hours = if days_studied == 0 {
            0.0
        } else {
            total_hours / days_studied as f64
        };
        Self {
            days_studied,
            total_hours,
            average_hours,
        }
    }
}

/// Headline numbers for a user's dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct UserOverview {
    pub schedules: u64,
    pub goals: u64,
    pub quizzes: u64,
    pub texts: u64,
    pub total_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0)]
    #[case(5, 0, 0)]
    #[case(0, 4, 0)]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(1, 2, 50)]
    #[case(4, 4, 100)]
    fn percentage_rounds_and_guards_zero(
        #[case] part: u64,
        #[case] total: u64,
        #[case] expected: u32,
    ) {
        assert_eq!(percentage(part, total), expected);
    }

    #[test]
    fn schedule_stats_completion() {
        let stats = ScheduleStats::new(4, 1, 1, 2);
        assert_eq!(stats.completion_percentage, 50);
        assert_eq!(ScheduleStats::new(0, 0, 0, 0).completion_percentage, 0);
    }

    #[test]
    fn goal_stats_pending_is_total_minus_achieved() {
        let stats = GoalStats::new(5, 2, 1);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.achievement_percentage, 40);
    }

    #[test]
    fn progress_average_guards_zero_days() {
        assert!(ProgressStats::new(0, 0.0).average_hours.abs() < f64::EPSILON);
        let stats = ProgressStats::new(4, 10.0);
        assert!((stats.average_hours - 2.5).abs() < f64::EPSILON);
    }
}
