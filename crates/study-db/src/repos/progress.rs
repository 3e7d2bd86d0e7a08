//! Progress repository: hours studied per user and day.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use study_core::entities::{NewProgress, Progress};
use study_core::stats::ProgressStats;

use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Filter, Row, Select};
use crate::record::Record;
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::{ProgressUpdate, ProgressUpdateBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressColumn {
    Id,
    UserId,
    Date,
    HoursStudied,
    CreatedAt,
}

impl Column for ProgressColumn {
    const TABLE: &'static str = "progress";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::Date => "date",
            Self::HoursStudied => "hours_studied",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Record for Progress {
    type Column = ProgressColumn;
    type Create = NewProgress;
    type Update = ProgressUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            user_id: r.string("user_id")?,
            date: r.date("date")?,
            hours_studied: r.f64("hours_studied")?,
            created_at: r.datetime("created_at")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct ProgressRepo {
    table: TableRepository<Progress>,
}

impl Repository for ProgressRepo {
    type Record = Progress;

    fn table(&self) -> &TableRepository<Progress> {
        &self.table
    }
}

impl ProgressRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(backend),
        }
    }

    fn by_user(user_id: &str) -> Filter<ProgressColumn> {
        Filter::new().eq(ProgressColumn::UserId, user_id)
    }

    fn in_range(user_id: &str, from: NaiveDate, to: NaiveDate) -> Filter<ProgressColumn> {
        Self::by_user(user_id)
            .gte(ProgressColumn::Date, from.to_string())
            .lte(ProgressColumn::Date, to.to_string())
    }

    /// The user's progress rows, most recent day first.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Progress>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Self::by_user(user_id))
                    .order_desc(ProgressColumn::Date),
            )
            .await
    }

    pub async fn find_by_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Progress>, DatabaseError> {
        self.table
            .find_one_where(&Self::by_user(user_id).eq(ProgressColumn::Date, date.to_string()))
            .await
    }

    /// Rows dated within `from..=to`, oldest first.
    pub async fn find_in_date_range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Progress>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Self::in_range(user_id, from, to))
                    .order_asc(ProgressColumn::Date),
            )
            .await
    }

    pub async fn find_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Progress>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Self::by_user(user_id))
                    .order_desc(ProgressColumn::Date)
                    .limit(limit),
            )
            .await
    }

    /// Set the hours studied on `date`, updating that day's row or creating it.
    ///
    /// Read-then-write: two concurrent calls for a day with no row may both
    /// create one.
    pub async fn record_hours(
        &self,
        user_id: &str,
        date: NaiveDate,
        hours: f64,
    ) -> Result<Progress, DatabaseError> {
        if let Some(existing) = self.find_by_date(user_id, date).await? {
            let update = ProgressUpdateBuilder::new().hours_studied(hours).build();
            return self
                .table
                .update_by_id(&existing.id, &update)
                .await?
                .ok_or_else(|| {
                    DatabaseError::InvalidState(format!(
                        "progress row {} vanished while recording hours",
                        existing.id
                    ))
                });
        }
        self.table
            .create(&NewProgress {
                user_id: user_id.to_string(),
                date,
                hours_studied: hours,
            })
            .await
    }

    /// Sum of all hours the user has recorded.
    pub async fn get_total_hours(&self, user_id: &str) -> Result<f64, DatabaseError> {
        let rows = self.table.find_where(&Self::by_user(user_id)).await?;
        Ok(rows.iter().map(|p| p.hours_studied).sum())
    }

    /// Days studied, total and average hours within `from..=to`.
    pub async fn get_stats(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ProgressStats, DatabaseError> {
        let rows = self.table.find_where(&Self::in_range(user_id, from, to)).await?;
        let days: BTreeSet<NaiveDate> = rows.iter().map(|p| p.date).collect();
        let total_hours = rows.iter().map(|p| p.hours_studied).sum();
        Ok(ProgressStats::new(days.len() as u64, total_hours))
    }
}
