//! Question repository: per-question answer statistics and difficulty ranking.

use std::cmp::Reverse;
use std::sync::Arc;

use study_core::entities::{Answer, NewQuestion, Question};
use study_core::stats::QuestionStats;
use study_core::views::{QuestionWithAnswers, RankedQuestion};

use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Embed, Filter, Row, Select};
use crate::record::Record;
use crate::repos::answer::AnswerColumn;
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::QuestionUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionColumn {
    Id,
    QuizId,
    Statement,
    OptionA,
    OptionB,
    OptionC,
    OptionD,
    CorrectOption,
}

impl Column for QuestionColumn {
    const TABLE: &'static str = "questions";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::QuizId => "quiz_id",
            Self::Statement => "statement",
            Self::OptionA => "option_a",
            Self::OptionB => "option_b",
            Self::OptionC => "option_c",
            Self::OptionD => "option_d",
            Self::CorrectOption => "correct_option",
        }
    }
}

impl Record for Question {
    type Column = QuestionColumn;
    type Create = NewQuestion;
    type Update = QuestionUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            quiz_id: r.string("quiz_id")?,
            statement: r.string("statement")?,
            option_a: r.string("option_a")?,
            option_b: r.string("option_b")?,
            option_c: r.string("option_c")?,
            option_d: r.string("option_d")?,
            correct_option: r.enum_value("correct_option")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Embed of a question's answers, oldest first.
pub(crate) fn answers_embed() -> Embed<AnswerColumn> {
    Embed::children(AnswerColumn::QuestionId).order_asc(AnswerColumn::AnsweredAt)
}

pub(crate) fn decode_with_answers(row: &Row) -> Result<QuestionWithAnswers, DatabaseError> {
    Ok(QuestionWithAnswers {
        question: Question::from_row(row)?,
        answers: RowReader::new(Question::TABLE, row).embedded_many::<Answer>()?,
    })
}

#[derive(Clone)]
pub struct QuestionRepo {
    table: TableRepository<Question>,
}

impl Repository for QuestionRepo {
    type Record = Question;

    fn table(&self) -> &TableRepository<Question> {
        &self.table
    }
}

impl QuestionRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(backend),
        }
    }

    fn answers(&self) -> TableRepository<Answer> {
        TableRepository::new(Arc::clone(self.table.backend()))
    }

    pub async fn find_by_quiz_id(&self, quiz_id: &str) -> Result<Vec<Question>, DatabaseError> {
        self.table
            .find_where(&Filter::new().eq(QuestionColumn::QuizId, quiz_id))
            .await
    }

    pub async fn find_with_answers(
        &self,
        id: &str,
    ) -> Result<Option<QuestionWithAnswers>, DatabaseError> {
        let select = Select::new()
            .filter(Filter::new().eq(QuestionColumn::Id, id))
            .embed(answers_embed());
        self.table
            .select_one_row(select)
            .await?
            .map(|row| decode_with_answers(&row))
            .transpose()
    }

    /// Total and correct answer counts, fetched concurrently.
    pub async fn get_stats(&self, question_id: &str) -> Result<QuestionStats, DatabaseError> {
        let answers = self.answers();
        let all = Filter::new().eq(AnswerColumn::QuestionId, question_id);
        let correct = all.clone().eq(AnswerColumn::IsCorrect, true);
        let (total, correct) = tokio::try_join!(answers.count(&all), answers.count(&correct))?;
        Ok(QuestionStats::new(total, correct))
    }

    /// Answered questions of the quiz with their stats. Issues one stats
    /// query pair per question.
    async fn ranked(&self, quiz_id: &str) -> Result<Vec<RankedQuestion>, DatabaseError> {
        let mut ranked = Vec::new();
        for question in self.find_by_quiz_id(quiz_id).await? {
            let stats = self.get_stats(&question.id).await?;
            if stats.total_answers > 0 {
                ranked.push(RankedQuestion { question, stats });
            }
        }
        Ok(ranked)
    }

    /// Up to `limit` answered questions, lowest accuracy first. Ties go to
    /// the question with more answers.
    pub async fn find_hardest(
        &self,
        quiz_id: &str,
        limit: usize,
    ) -> Result<Vec<RankedQuestion>, DatabaseError> {
        let mut ranked = self.ranked(quiz_id).await?;
        ranked.sort_by_key(|r| (r.stats.accuracy_percentage, Reverse(r.stats.total_answers)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Up to `limit` answered questions, highest accuracy first. Ties go to
    /// the question with more answers.
    pub async fn find_easiest(
        &self,
        quiz_id: &str,
        limit: usize,
    ) -> Result<Vec<RankedQuestion>, DatabaseError> {
        let mut ranked = self.ranked(quiz_id).await?;
        ranked.sort_by_key(|r| {
            (
                Reverse(r.stats.accuracy_percentage),
                Reverse(r.stats.total_answers),
            )
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Deletes only question rows; answers referencing them must go first.
    pub async fn delete_by_quiz_id(&self, quiz_id: &str) -> Result<u64, DatabaseError> {
        self.table
            .delete_where(&Filter::new().eq(QuestionColumn::QuizId, quiz_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use study_core::enums::OptionLetter;

    use crate::test_support::helpers::{seed_question, seed_quiz, seed_user, test_store};

    use super::*;

    #[tokio::test]
    async fn stats_and_nested_answers() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let quiz = seed_quiz(&store, &user.id, "Rust").await;
        let question = seed_question(&store, &quiz.id, "2+2?", OptionLetter::B).await;
        let answers = store.answers();
        answers
            .create_with_validation(&user.id, &question.id, OptionLetter::B)
            .await
            .unwrap();
        answers
            .create_with_validation(&user.id, &question.id, OptionLetter::C)
            .await
            .unwrap();
        answers
            .create_with_validation(&user.id, &question.id, OptionLetter::A)
            .await
            .unwrap();

        let stats = store.questions().get_stats(&question.id).await.unwrap();
        assert_eq!(stats, QuestionStats::new(3, 1));
        assert_eq!(stats.accuracy_percentage, 33);

        let view = store
            .questions()
            .find_with_answers(&question.id)
            .await
            .unwrap()
            .unwrap();
        let chosen: Vec<_> = view.answers.iter().map(|a| a.chosen_option).collect();
        assert_eq!(chosen, vec![OptionLetter::B, OptionLetter::C, OptionLetter::A]);
    }

    #[tokio::test]
    async fn ranking_skips_unanswered_questions() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let quiz = seed_quiz(&store, &user.id, "Rust").await;
        let easy = seed_question(&store, &quiz.id, "easy", OptionLetter::A).await;
        let hard = seed_question(&store, &quiz.id, "hard", OptionLetter::A).await;
        seed_question(&store, &quiz.id, "unanswered", OptionLetter::A).await;
        let answers = store.answers();
        for chosen in [OptionLetter::A, OptionLetter::A] {
            answers
                .create_with_validation(&user.id, &easy.id, chosen)
                .await
                .unwrap();
        }
        for chosen in [OptionLetter::A, OptionLetter::D] {
            answers
                .create_with_validation(&user.id, &hard.id, chosen)
                .await
                .unwrap();
        }

        let hardest = store.questions().find_hardest(&quiz.id, 10).await.unwrap();
        let statements: Vec<_> = hardest.iter().map(|r| r.question.statement.as_str()).collect();
        assert_eq!(statements, vec!["hard", "easy"]);

        let easiest = store.questions().find_easiest(&quiz.id, 1).await.unwrap();
        assert_eq!(easiest.len(), 1);
        assert_eq!(easiest[0].question.id, easy.id);
        assert_eq!(easiest[0].stats.accuracy_percentage, 100);
    }
}
