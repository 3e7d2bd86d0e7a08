//! Goal repository: achievement tracking, due-date windows and statistics.

use std::sync::Arc;

use chrono::NaiveDate;
use study_core::entities::{Goal, NewGoal};
use study_core::generated::GeneratedGoal;
use study_core::stats::GoalStats;

use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Filter, Row, Select};
use crate::record::Record;
use crate::repos::{days_after, today};
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::{GoalUpdate, GoalUpdateBuilder};

const DEFAULT_DUE_SOON_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalColumn {
    Id,
    UserId,
    Title,
    Description,
    ExpectedValue,
    DueDate,
    Achieved,
    CreatedAt,
}

impl Column for GoalColumn {
    const TABLE: &'static str = "goals";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::Title => "title",
            Self::Description => "description",
            Self::ExpectedValue => "expected_value",
            Self::DueDate => "due_date",
            Self::Achieved => "achieved",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Record for Goal {
    type Column = GoalColumn;
    type Create = NewGoal;
    type Update = GoalUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            user_id: r.string("user_id")?,
            title: r.string("title")?,
            description: r.opt_string("description")?,
            expected_value: r.opt_f64("expected_value")?,
            due_date: r.opt_date("due_date")?,
            achieved: r.bool("achieved")?,
            created_at: r.datetime("created_at")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct GoalRepo {
    table: TableRepository<Goal>,
    due_soon_days: u32,
}

impl Repository for GoalRepo {
    type Record = Goal;

    fn table(&self) -> &TableRepository<Goal> {
        &self.table
    }
}

impl GoalRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(backend),
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }

    #[must_use]
    pub const fn with_due_soon_days(mut self, days: u32) -> Self {
        self.due_soon_days = days;
        self
    }

    fn by_user(user_id: &str) -> Filter<GoalColumn> {
        Filter::new().eq(GoalColumn::UserId, user_id)
    }

    fn by_title(user_id: &str, title: &str) -> Filter<GoalColumn> {
        Self::by_user(user_id).eq(GoalColumn::Title, title)
    }

    fn open(user_id: &str) -> Filter<GoalColumn> {
        Self::by_user(user_id).eq(GoalColumn::Achieved, false)
    }

    async fn by_due_date(&self, filter: Filter<GoalColumn>) -> Result<Vec<Goal>, DatabaseError> {
        self.table
            .select(Select::new().filter(filter).order_asc(GoalColumn::DueDate))
            .await
    }

    /// The user's goals, newest first.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Goal>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Self::by_user(user_id))
                    .order_desc(GoalColumn::CreatedAt),
            )
            .await
    }

    pub async fn find_by_title(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Option<Goal>, DatabaseError> {
        self.table.find_one_where(&Self::by_title(user_id, title)).await
    }

    pub async fn find_achieved(&self, user_id: &str) -> Result<Vec<Goal>, DatabaseError> {
        self.table
            .find_where(&Self::by_user(user_id).eq(GoalColumn::Achieved, true))
            .await
    }

    pub async fn find_pending(&self, user_id: &str) -> Result<Vec<Goal>, DatabaseError> {
        self.table.find_where(&Self::open(user_id)).await
    }

    pub async fn find_due_today(&self, user_id: &str) -> Result<Vec<Goal>, DatabaseError> {
        self.find_due_on(user_id, today()).await
    }

    /// Unachieved goals due on `day`.
    pub async fn find_due_on(&self, user_id: &str, day: NaiveDate) -> Result<Vec<Goal>, DatabaseError> {
        self.table
            .find_where(&Self::open(user_id).eq(GoalColumn::DueDate, day.to_string()))
            .await
    }

    pub async fn find_overdue(&self, user_id: &str) -> Result<Vec<Goal>, DatabaseError> {
        self.find_overdue_on(user_id, today()).await
    }

    /// Unachieved goals whose due date is before `day`. Goals without a due
    /// date are never overdue.
    pub async fn find_overdue_on(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<Goal>, DatabaseError> {
        self.by_due_date(Self::overdue_filter(user_id, day)).await
    }

    fn overdue_filter(user_id: &str, day: NaiveDate) -> Filter<GoalColumn> {
        Self::open(user_id)
            .not_null(GoalColumn::DueDate)
            .lt(GoalColumn::DueDate, day.to_string())
    }

    pub async fn find_due_soon(&self, user_id: &str) -> Result<Vec<Goal>, DatabaseError> {
        self.find_due_within(user_id, today(), self.due_soon_days).await
    }

    /// Unachieved goals due within `from..=from + days`.
    pub async fn find_due_within(
        &self,
        user_id: &str,
        from: NaiveDate,
        days: u32,
    ) -> Result<Vec<Goal>, DatabaseError> {
        let filter = Self::open(user_id)
            .gte(GoalColumn::DueDate, from.to_string())
            .lte(GoalColumn::DueDate, days_after(from, days).to_string());
        self.by_due_date(filter).await
    }

    pub async fn mark_achieved(&self, id: &str) -> Result<Option<Goal>, DatabaseError> {
        let update = GoalUpdateBuilder::new().achieved(true).build();
        self.table.update_by_id(id, &update).await
    }

    pub async fn update_by_title(
        &self,
        user_id: &str,
        title: &str,
        data: &GoalUpdate,
    ) -> Result<Option<Goal>, DatabaseError> {
        let updated = self
            .table
            .update_where(&Self::by_title(user_id, title), data)
            .await?;
        Ok(updated.into_iter().next())
    }

    /// `true` if a goal with this title existed.
    pub async fn delete_by_title(&self, user_id: &str, title: &str) -> Result<bool, DatabaseError> {
        let deleted = self.table.delete_where(&Self::by_title(user_id, title)).await?;
        Ok(deleted > 0)
    }

    pub async fn get_stats(&self, user_id: &str) -> Result<GoalStats, DatabaseError> {
        self.get_stats_on(user_id, today()).await
    }

    /// Goal counts with overdue measured against `day`, fetched concurrently.
    pub async fn get_stats_on(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<GoalStats, DatabaseError> {
        let all = Self::by_user(user_id);
        let achieved = all.clone().eq(GoalColumn::Achieved, true);
        let overdue = Self::overdue_filter(user_id, day);
        let (total, achieved, overdue) = tokio::try_join!(
            self.table.count(&all),
            self.table.count(&achieved),
            self.table.count(&overdue),
        )?;
        Ok(GoalStats::new(total, achieved, overdue))
    }

    /// Persist a goal produced by the generative-content client.
    pub async fn import_generated(
        &self,
        user_id: &str,
        generated: GeneratedGoal,
    ) -> Result<Goal, DatabaseError> {
        self.table.create(&generated.into_new(user_id)).await
    }
}
