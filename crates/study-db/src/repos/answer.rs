//! Answer repository, including the validated-create path that derives
//! `is_correct` from the question.

use std::sync::Arc;

use study_core::entities::{Answer, NewAnswer, Question};
use study_core::enums::OptionLetter;
use study_core::stats::AnswerStats;

use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Embed, Filter, Row, Select};
use crate::record::Record;
use crate::repos::question::QuestionColumn;
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::AnswerUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerColumn {
    Id,
    QuestionId,
    UserId,
    ChosenOption,
    IsCorrect,
    AnsweredAt,
}

impl Column for AnswerColumn {
    const TABLE: &'static str = "answers";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::QuestionId => "question_id",
            Self::UserId => "user_id",
            Self::ChosenOption => "chosen_option",
            Self::IsCorrect => "is_correct",
            Self::AnsweredAt => "answered_at",
        }
    }
}

impl Record for Answer {
    type Column = AnswerColumn;
    type Create = NewAnswer;
    type Update = AnswerUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            question_id: r.string("question_id")?,
            user_id: r.string("user_id")?,
            chosen_option: r.enum_value("chosen_option")?,
            is_correct: r.bool("is_correct")?,
            answered_at: r.datetime("answered_at")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct AnswerRepo {
    table: TableRepository<Answer>,
}

impl Repository for AnswerRepo {
    type Record = Answer;

    fn table(&self) -> &TableRepository<Answer> {
        &self.table
    }
}

impl AnswerRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(backend),
        }
    }

    fn by_user(user_id: &str) -> Filter<AnswerColumn> {
        Filter::new().eq(AnswerColumn::UserId, user_id)
    }

    /// The question's answers, oldest first.
    pub async fn find_by_question_id(&self, question_id: &str) -> Result<Vec<Answer>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Filter::new().eq(AnswerColumn::QuestionId, question_id))
                    .order_asc(AnswerColumn::AnsweredAt),
            )
            .await
    }

    /// The user's answers, newest first.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Answer>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Self::by_user(user_id))
                    .order_desc(AnswerColumn::AnsweredAt),
            )
            .await
    }

    pub async fn find_by_user_and_question(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> Result<Vec<Answer>, DatabaseError> {
        let filter = Self::by_user(user_id).eq(AnswerColumn::QuestionId, question_id);
        self.table
            .select(Select::new().filter(filter).order_asc(AnswerColumn::AnsweredAt))
            .await
    }

    /// The user's answers to any question of the quiz.
    pub async fn find_by_user_for_quiz(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> Result<Vec<Answer>, DatabaseError> {
        let quiz = Embed::parent(AnswerColumn::QuestionId)
            .inner()
            .filter(Filter::new().eq(QuestionColumn::QuizId, quiz_id));
        self.table
            .select(
                Select::new()
                    .filter(Self::by_user(user_id))
                    .embed::<QuestionColumn>(quiz)
                    .order_asc(AnswerColumn::AnsweredAt),
            )
            .await
    }

    /// Record `chosen` for the question, computing `is_correct` from the
    /// question's correct option. `None` if the question does not exist.
    ///
    /// The question is read, then the answer written; a question edited in
    /// between yields a flag computed from the value read.
    pub async fn create_with_validation(
        &self,
        user_id: &str,
        question_id: &str,
        chosen: OptionLetter,
    ) -> Result<Option<Answer>, DatabaseError> {
        let questions = TableRepository::<Question>::new(Arc::clone(self.table.backend()));
        let Some(question) = questions.find_by_id(question_id).await? else {
            tracing::debug!(question_id, "answer for unknown question");
            return Ok(None);
        };
        let answer = NewAnswer {
            question_id: question.id.clone(),
            user_id: user_id.to_string(),
            chosen_option: chosen,
            is_correct: question.is_correct(chosen),
        };
        self.table.create(&answer).await.map(Some)
    }

    /// Total and correct answers given by the user, fetched concurrently.
    pub async fn get_user_stats(&self, user_id: &str) -> Result<AnswerStats, DatabaseError> {
        let all = Self::by_user(user_id);
        let correct = all.clone().eq(AnswerColumn::IsCorrect, true);
        let (total, correct) =
            tokio::try_join!(self.table.count(&all), self.table.count(&correct))?;
        Ok(AnswerStats::new(total, correct))
    }

    pub async fn delete_by_question_ids(&self, question_ids: &[String]) -> Result<u64, DatabaseError> {
        if question_ids.is_empty() {
            return Ok(0);
        }
        let filter = Filter::new().in_(AnswerColumn::QuestionId, question_ids.iter().map(String::as_str));
        self.table.delete_where(&filter).await
    }
}
