//! User repository: lookup by email and the dashboard overview.

use std::sync::Arc;

use study_core::entities::{Goal, NewUser, Quiz, Schedule, Text, User};
use study_core::stats::UserOverview;
use study_core::views::UserWithSchedules;

use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Embed, Filter, Row, Select};
use crate::record::Record;
use crate::repos::goal::GoalColumn;
use crate::repos::progress::ProgressRepo;
use crate::repos::quiz::QuizColumn;
use crate::repos::schedule::ScheduleColumn;
use crate::repos::text::TextColumn;
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::UserUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Id,
    Name,
    Email,
    CreatedAt,
}

impl Column for UserColumn {
    const TABLE: &'static str = "users";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Record for User {
    type Column = UserColumn;
    type Create = NewUser;
    type Update = UserUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            name: r.string("name")?,
            email: r.string("email")?,
            created_at: r.datetime("created_at")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct UserRepo {
    table: TableRepository<User>,
}

impl Repository for UserRepo {
    type Record = User;

    fn table(&self) -> &TableRepository<User> {
        &self.table
    }
}

impl UserRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(backend),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.table
            .find_one_where(&Filter::new().eq(UserColumn::Email, email))
            .await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError> {
        self.table
            .exists(&Filter::new().eq(UserColumn::Email, email))
            .await
    }

    /// The user and all their schedules, newest first. A user without
    /// schedules comes back with an empty list.
    pub async fn find_with_schedules(
        &self,
        id: &str,
    ) -> Result<Option<UserWithSchedules>, DatabaseError> {
        let select = Select::new()
            .filter(Filter::new().eq(UserColumn::Id, id))
            .embed(
                Embed::children(ScheduleColumn::UserId).order_desc(ScheduleColumn::CreatedAt),
            );
        let Some(row) = self.table.select_one_row(select).await? else {
            return Ok(None);
        };
        Ok(Some(UserWithSchedules {
            user: User::from_row(&row)?,
            schedules: RowReader::new(User::TABLE, &row).embedded_many::<Schedule>()?,
        }))
    }

    /// Headline counts for the user's dashboard, fetched concurrently.
    pub async fn get_overview(&self, user_id: &str) -> Result<UserOverview, DatabaseError> {
        let backend = self.table.backend();
        let schedules = TableRepository::<Schedule>::new(Arc::clone(backend));
        let goals = TableRepository::<Goal>::new(Arc::clone(backend));
        let quizzes = TableRepository::<Quiz>::new(Arc::clone(backend));
        let texts = TableRepository::<Text>::new(Arc::clone(backend));
        let progress = ProgressRepo::new(Arc::clone(backend));

        let schedule_filter = Filter::new().eq(ScheduleColumn::UserId, user_id);
        let goal_filter = Filter::new().eq(GoalColumn::UserId, user_id);
        let quiz_filter = Filter::new().eq(QuizColumn::UserId, user_id);
        let text_filter = Filter::new().eq(TextColumn::UserId, user_id);

        let (schedules, goals, quizzes, texts, total_hours) = tokio::try_join!(
            schedules.count(&schedule_filter),
            goals.count(&goal_filter),
            quizzes.count(&quiz_filter),
            texts.count(&text_filter),
            progress.get_total_hours(user_id),
        )?;

        Ok(UserOverview {
            schedules,
            goals,
            quizzes,
            texts,
            total_hours,
        })
    }
}
