//! Quiz repository: nested quiz reads, statistics and cascading writes.

use std::sync::Arc;

use study_core::entities::{NewQuiz, Question, Quiz};
use study_core::generated::{GeneratedQuiz, QuestionDraft};
use study_core::stats::QuizStats;
use study_core::views::{QuestionWithAnswers, QuizWithQuestions};

use crate::aggregate::cascade;
use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Embed, Filter, Row, Select};
use crate::record::Record;
use crate::repos::answer::{AnswerColumn, AnswerRepo};
use crate::repos::question::{QuestionColumn, QuestionRepo, answers_embed, decode_with_answers};
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::QuizUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizColumn {
    Id,
    UserId,
    Title,
    CreatedAt,
}

impl Column for QuizColumn {
    const TABLE: &'static str = "quizzes";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::Title => "title",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Record for Quiz {
    type Column = QuizColumn;
    type Create = NewQuiz;
    type Update = QuizUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            user_id: r.string("user_id")?,
            title: r.string("title")?,
            created_at: r.datetime("created_at")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Quiz rows carry `questions`, each carrying `answers`.
fn questions_embed() -> Embed<QuestionColumn> {
    Embed::children(QuestionColumn::QuizId).embed(answers_embed())
}

fn decode_with_questions(row: &Row) -> Result<QuizWithQuestions, DatabaseError> {
    let questions = RowReader::new(Quiz::TABLE, row)
        .embedded_rows(Question::TABLE)?
        .into_iter()
        .map(decode_with_answers)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(QuizWithQuestions {
        quiz: Quiz::from_row(row)?,
        questions,
    })
}

#[derive(Clone)]
pub struct QuizRepo {
    table: TableRepository<Quiz>,
    questions: QuestionRepo,
    answers: AnswerRepo,
}

impl Repository for QuizRepo {
    type Record = Quiz;

    fn table(&self) -> &TableRepository<Quiz> {
        &self.table
    }
}

impl QuizRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(Arc::clone(&backend)),
            questions: QuestionRepo::new(Arc::clone(&backend)),
            answers: AnswerRepo::new(backend),
        }
    }

    fn by_user(user_id: &str) -> Filter<QuizColumn> {
        Filter::new().eq(QuizColumn::UserId, user_id)
    }

    fn by_title(user_id: &str, title: &str) -> Filter<QuizColumn> {
        Self::by_user(user_id).eq(QuizColumn::Title, title)
    }

    /// The user's quizzes, newest first.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Quiz>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Self::by_user(user_id))
                    .order_desc(QuizColumn::CreatedAt),
            )
            .await
    }

    pub async fn find_by_title(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Option<Quiz>, DatabaseError> {
        self.table.find_one_where(&Self::by_title(user_id, title)).await
    }

    pub async fn update_by_title(
        &self,
        user_id: &str,
        title: &str,
        data: &QuizUpdate,
    ) -> Result<Option<Quiz>, DatabaseError> {
        let updated = self
            .table
            .update_where(&Self::by_title(user_id, title), data)
            .await?;
        Ok(updated.into_iter().next())
    }

    /// Deletes only the quiz row, so it fails while questions still point at
    /// it; [`delete_cascade`](Self::delete_cascade) removes those first.
    pub async fn delete_by_title(&self, user_id: &str, title: &str) -> Result<bool, DatabaseError> {
        let deleted = self.table.delete_where(&Self::by_title(user_id, title)).await?;
        Ok(deleted > 0)
    }

    /// The quiz with its questions, each with its answers.
    pub async fn find_with_questions(
        &self,
        id: &str,
    ) -> Result<Option<QuizWithQuestions>, DatabaseError> {
        let select = Select::new()
            .filter(Filter::new().eq(QuizColumn::Id, id))
            .embed(questions_embed());
        self.table
            .select_one_row(select)
            .await?
            .map(|row| decode_with_questions(&row))
            .transpose()
    }

    pub async fn find_by_user_with_questions(
        &self,
        user_id: &str,
    ) -> Result<Vec<QuizWithQuestions>, DatabaseError> {
        let select = Select::new()
            .filter(Self::by_user(user_id))
            .order_desc(QuizColumn::CreatedAt)
            .embed(questions_embed());
        self.table
            .select_rows(select)
            .await?
            .iter()
            .map(decode_with_questions)
            .collect()
    }

    /// Question, answer and correct-answer counts, fetched concurrently.
    /// Answers are matched to the quiz through their question.
    pub async fn get_stats(&self, quiz_id: &str) -> Result<QuizStats, DatabaseError> {
        let in_quiz = || {
            Embed::<QuestionColumn>::parent(AnswerColumn::QuestionId)
                .inner()
                .filter(Filter::new().eq(QuestionColumn::QuizId, quiz_id))
        };
        let answers = self.answers.table();
        let questions = Filter::new().eq(QuestionColumn::QuizId, quiz_id);
        let all_answers = Select::new().embed(in_quiz());
        let correct_answers = Select::new()
            .filter(Filter::new().eq(AnswerColumn::IsCorrect, true))
            .embed(in_quiz());

        let (question_count, answer_count, correct_count) = tokio::try_join!(
            self.questions.table().count(&questions),
            answers.count_select(all_answers),
            answers.count_select(correct_answers),
        )?;
        Ok(QuizStats::new(question_count, answer_count, correct_count))
    }

    /// Create the quiz and all its questions. Questions go in one bulk
    /// insert; if it fails the quiz is removed again.
    pub async fn create_with_questions(
        &self,
        quiz: &NewQuiz,
        questions: Vec<QuestionDraft>,
    ) -> Result<QuizWithQuestions, DatabaseError> {
        let (quiz, questions) = cascade::create_with_children(
            &self.table,
            self.questions.table(),
            quiz,
            |quiz: &Quiz| {
                questions
                    .into_iter()
                    .map(|draft| draft.into_new(&quiz.id))
                    .collect()
            },
        )
        .await?;
        Ok(QuizWithQuestions {
            quiz,
            questions: questions
                .into_iter()
                .map(|question| QuestionWithAnswers {
                    question,
                    answers: Vec::new(),
                })
                .collect(),
        })
    }

    /// Persist a quiz produced by the generative-content client.
    pub async fn import_generated(
        &self,
        user_id: &str,
        generated: GeneratedQuiz,
    ) -> Result<QuizWithQuestions, DatabaseError> {
        let (quiz, drafts) = generated.into_parts(user_id);
        self.create_with_questions(&quiz, drafts).await
    }

    /// Delete answers, then questions, then the quiz. Returns the number of
    /// answer and question rows removed.
    pub async fn delete_cascade(&self, quiz_id: &str) -> Result<u64, DatabaseError> {
        let question_ids: Vec<String> = self
            .questions
            .find_by_quiz_id(quiz_id)
            .await?
            .into_iter()
            .map(|q| q.id)
            .collect();

        let answers = self.answers.delete_by_question_ids(&question_ids).await?;
        let questions = self.questions.delete_by_quiz_id(quiz_id).await?;
        self.table.delete_by_id(quiz_id).await?;
        tracing::info!(quiz_id, answers, questions, "quiz deleted with children");
        Ok(answers + questions)
    }
}
