//! Schedule repository: per-user listing, title lookups, nested activity
//! reads and completion statistics.

use std::sync::Arc;

use study_core::entities::{Activity, NewSchedule, Schedule};
use study_core::enums::ActivityStatus;
use study_core::stats::ScheduleStats;
use study_core::views::ScheduleWithActivities;

use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Embed, Filter, Row, Select};
use crate::record::Record;
use crate::repos::activity::ActivityColumn;
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::ScheduleUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleColumn {
    Id,
    UserId,
    Title,
    Description,
    CreatedAt,
}

impl Column for ScheduleColumn {
    const TABLE: &'static str = "schedules";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::Title => "title",
            Self::Description => "description",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Record for Schedule {
    type Column = ScheduleColumn;
    type Create = NewSchedule;
    type Update = ScheduleUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            user_id: r.string("user_id")?,
            title: r.string("title")?,
            description: r.opt_string("description")?,
            created_at: r.datetime("created_at")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Embed of a schedule's activities, earliest start first.
fn activities_embed() -> Embed<ActivityColumn> {
    Embed::children(ActivityColumn::ScheduleId).order_asc(ActivityColumn::StartDate)
}

fn decode_with_activities(row: &Row) -> Result<ScheduleWithActivities, DatabaseError> {
    Ok(ScheduleWithActivities {
        schedule: Schedule::from_row(row)?,
        activities: RowReader::new(Schedule::TABLE, row).embedded_many::<Activity>()?,
    })
}

#[derive(Clone)]
pub struct ScheduleRepo {
    table: TableRepository<Schedule>,
}

impl Repository for ScheduleRepo {
    type Record = Schedule;

    fn table(&self) -> &TableRepository<Schedule> {
        &self.table
    }
}

impl ScheduleRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(backend),
        }
    }

    fn by_user(user_id: &str) -> Filter<ScheduleColumn> {
        Filter::new().eq(ScheduleColumn::UserId, user_id)
    }

    fn by_title(user_id: &str, title: &str) -> Filter<ScheduleColumn> {
        Self::by_user(user_id).eq(ScheduleColumn::Title, title)
    }

    /// The user's schedules, newest first.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Schedule>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Self::by_user(user_id))
                    .order_desc(ScheduleColumn::CreatedAt),
            )
            .await
    }

    /// The schedule of `user_id` with exactly this title.
    pub async fn find_by_title(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Option<Schedule>, DatabaseError> {
        self.table.find_one_where(&Self::by_title(user_id, title)).await
    }

    /// `None` when the user has no schedule with this title.
    pub async fn update_by_title(
        &self,
        user_id: &str,
        title: &str,
        data: &ScheduleUpdate,
    ) -> Result<Option<Schedule>, DatabaseError> {
        let updated = self
            .table
            .update_where(&Self::by_title(user_id, title), data)
            .await?;
        Ok(updated.into_iter().next())
    }

    /// Deletes only the schedule row; use
    /// [`ScheduleAggregator::delete_with_activities`](crate::aggregate::ScheduleAggregator::delete_with_activities)
    /// to remove its activities too.
    pub async fn delete_by_title(&self, user_id: &str, title: &str) -> Result<bool, DatabaseError> {
        let deleted = self.table.delete_where(&Self::by_title(user_id, title)).await?;
        Ok(deleted > 0)
    }

    pub async fn find_with_activities(
        &self,
        id: &str,
    ) -> Result<Option<ScheduleWithActivities>, DatabaseError> {
        let select = Select::new()
            .filter(Filter::new().eq(ScheduleColumn::Id, id))
            .embed(activities_embed());
        self.table
            .select_one_row(select)
            .await?
            .map(|row| decode_with_activities(&row))
            .transpose()
    }

    /// All of the user's schedules with their activities, newest schedule first.
    pub async fn find_by_user_with_activities(
        &self,
        user_id: &str,
    ) -> Result<Vec<ScheduleWithActivities>, DatabaseError> {
        let select = Select::new()
            .filter(Self::by_user(user_id))
            .order_desc(ScheduleColumn::CreatedAt)
            .embed(activities_embed());
        self.table
            .select_rows(select)
            .await?
            .iter()
            .map(decode_with_activities)
            .collect()
    }

    /// The user's `limit` newest schedules.
    pub async fn find_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Schedule>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Self::by_user(user_id))
                    .order_desc(ScheduleColumn::CreatedAt)
                    .limit(limit),
            )
            .await
    }

    /// Activity counts per status, fetched concurrently.
    pub async fn get_stats(&self, schedule_id: &str) -> Result<ScheduleStats, DatabaseError> {
        let activities = TableRepository::<Activity>::new(Arc::clone(self.table.backend()));
        let all = Filter::new().eq(ActivityColumn::ScheduleId, schedule_id);
        let pending = all.clone().eq(ActivityColumn::Status, ActivityStatus::Pending);
        let in_progress = all.clone().eq(ActivityColumn::Status, ActivityStatus::InProgress);
        let done = all.clone().eq(ActivityColumn::Status, ActivityStatus::Done);

        let (total, pending, in_progress, done) = tokio::try_join!(
            activities.count(&all),
            activities.count(&pending),
            activities.count(&in_progress),
            activities.count(&done),
        )?;
        Ok(ScheduleStats::new(total, pending, in_progress, done))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::{seed_activity, seed_schedule, seed_user, test_store};
    use crate::updates::ScheduleUpdateBuilder;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn find_by_user_id_newest_first() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let first = seed_schedule(&store, &user.id, "First").await;
        let second = seed_schedule(&store, &user.id, "Second").await;

        let schedules = store.schedules().find_by_user_id(&user.id).await.unwrap();
        let ids: Vec<_> = schedules.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);

        let recent = store.schedules().find_recent(&user.id, 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, second.id);
    }

    #[tokio::test]
    async fn title_operations_are_scoped_to_user() {
        let store = test_store().await;
        let ana = seed_user(&store, "ana@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        seed_schedule(&store, &ana.id, "Plan").await;
        let bobs = seed_schedule(&store, &bob.id, "Plan").await;

        let update = ScheduleUpdateBuilder::new()
            .description(Some("exam prep".into()))
            .build();
        let updated = store
            .schedules()
            .update_by_title(&ana.id, "Plan", &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("exam prep"));
        assert!(
            store
                .schedules()
                .update_by_title(&ana.id, "Missing", &update)
                .await
                .unwrap()
                .is_none()
        );

        assert!(store.schedules().delete_by_title(&ana.id, "Plan").await.unwrap());
        assert!(!store.schedules().delete_by_title(&ana.id, "Plan").await.unwrap());
        assert_eq!(store.schedules().find_by_title(&ana.id, "Plan").await.unwrap(), None);
        assert_eq!(
            store.schedules().find_by_title(&bob.id, "Plan").await.unwrap(),
            Some(bobs)
        );
    }

    #[tokio::test]
    async fn find_with_activities_orders_by_start_date() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let schedule = seed_schedule(&store, &user.id, "Plan").await;
        seed_activity(&store, &schedule.id, "Late", day(10), day(12)).await;
        seed_activity(&store, &schedule.id, "Early", day(1), day(3)).await;

        let view = store
            .schedules()
            .find_with_activities(&schedule.id)
            .await
            .unwrap()
            .unwrap();
        let titles: Vec<_> = view.activities.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Early", "Late"]);

        let all = store
            .schedules()
            .find_by_user_with_activities(&user.id)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].activities.len(), 2);
    }

    #[tokio::test]
    async fn stats_count_each_status() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let schedule = seed_schedule(&store, &user.id, "Plan").await;
        let a = seed_activity(&store, &schedule.id, "A", day(1), day(2)).await;
        let b = seed_activity(&store, &schedule.id, "B", day(1), day(2)).await;
        seed_activity(&store, &schedule.id, "C", day(1), day(2)).await;
        store.activities().mark_done(&a.id).await.unwrap();
        store
            .activities()
            .update_status(&b.id, ActivityStatus::InProgress)
            .await
            .unwrap();

        let stats = store.schedules().get_stats(&schedule.id).await.unwrap();
        assert_eq!(stats, ScheduleStats::new(3, 1, 1, 1));
        assert_eq!(stats.completion_percentage, 33);

        let empty = store.schedules().get_stats("sch-missing").await.unwrap();
        assert_eq!(empty.completion_percentage, 0);
    }
}
