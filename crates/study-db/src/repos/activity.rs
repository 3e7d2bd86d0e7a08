//! Activity repository: status transitions and date-window queries.
//!
//! "Due" and "overdue" only ever consider activities that are not done.
//! Every date query has an `_on`/`_within` form taking the reference day
//! explicitly; the plain form uses today's UTC date.

use std::sync::Arc;

use chrono::NaiveDate;
use study_core::entities::{Activity, NewActivity};
use study_core::enums::ActivityStatus;

use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Embed, Filter, Row, Select};
use crate::record::Record;
use crate::repos::schedule::ScheduleColumn;
use crate::repos::{days_after, today};
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::{ActivityUpdate, ActivityUpdateBuilder};

const DEFAULT_DUE_SOON_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityColumn {
    Id,
    ScheduleId,
    Title,
    Description,
    StartDate,
    EndDate,
    Status,
    CreatedAt,
}

impl Column for ActivityColumn {
    const TABLE: &'static str = "activities";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ScheduleId => "schedule_id",
            Self::Title => "title",
            Self::Description => "description",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::Status => "status",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Record for Activity {
    type Column = ActivityColumn;
    type Create = NewActivity;
    type Update = ActivityUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            schedule_id: r.string("schedule_id")?,
            title: r.string("title")?,
            description: r.opt_string("description")?,
            start_date: r.date("start_date")?,
            end_date: r.date("end_date")?,
            status: r.enum_value("status")?,
            created_at: r.datetime("created_at")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

fn not_done() -> Filter<ActivityColumn> {
    Filter::new().neq(ActivityColumn::Status, ActivityStatus::Done)
}

#[derive(Clone)]
pub struct ActivityRepo {
    table: TableRepository<Activity>,
    due_soon_days: u32,
}

impl Repository for ActivityRepo {
    type Record = Activity;

    fn table(&self) -> &TableRepository<Activity> {
        &self.table
    }
}

impl ActivityRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(backend),
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }

    /// Window used by [`find_due_soon`](Self::find_due_soon).
    #[must_use]
    pub const fn with_due_soon_days(mut self, days: u32) -> Self {
        self.due_soon_days = days;
        self
    }

    /// The schedule's activities, earliest start first.
    pub async fn find_by_schedule_id(
        &self,
        schedule_id: &str,
    ) -> Result<Vec<Activity>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Filter::new().eq(ActivityColumn::ScheduleId, schedule_id))
                    .order_asc(ActivityColumn::StartDate),
            )
            .await
    }

    /// Activities in `status`, optionally limited to one schedule.
    pub async fn find_by_status(
        &self,
        status: ActivityStatus,
        schedule_id: Option<&str>,
    ) -> Result<Vec<Activity>, DatabaseError> {
        let filter = Filter::new()
            .eq(ActivityColumn::Status, status)
            .eq_opt(ActivityColumn::ScheduleId, schedule_id);
        self.table.find_where(&filter).await
    }

    pub async fn find_by_title(
        &self,
        schedule_id: &str,
        title: &str,
    ) -> Result<Option<Activity>, DatabaseError> {
        let filter = Filter::new()
            .eq(ActivityColumn::ScheduleId, schedule_id)
            .eq(ActivityColumn::Title, title);
        self.table.find_one_where(&filter).await
    }

    /// Activities of the schedule starting within `from..=to`.
    pub async fn find_in_date_range(
        &self,
        schedule_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Activity>, DatabaseError> {
        let filter = Filter::new()
            .eq(ActivityColumn::ScheduleId, schedule_id)
            .gte(ActivityColumn::StartDate, from.to_string())
            .lte(ActivityColumn::StartDate, to.to_string());
        self.table
            .select(Select::new().filter(filter).order_asc(ActivityColumn::StartDate))
            .await
    }

    /// Every activity in any schedule owned by `user_id`.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Activity>, DatabaseError> {
        let owner = Embed::parent(ActivityColumn::ScheduleId)
            .inner()
            .filter(Filter::new().eq(ScheduleColumn::UserId, user_id));
        self.table
            .select(
                Select::new()
                    .embed::<ScheduleColumn>(owner)
                    .order_asc(ActivityColumn::StartDate),
            )
            .await
    }

    pub async fn find_due_today(&self) -> Result<Vec<Activity>, DatabaseError> {
        self.find_due_on(today()).await
    }

    /// Unfinished activities ending on `day`.
    pub async fn find_due_on(&self, day: NaiveDate) -> Result<Vec<Activity>, DatabaseError> {
        let filter = not_done().eq(ActivityColumn::EndDate, day.to_string());
        self.table.find_where(&filter).await
    }

    pub async fn find_overdue(&self) -> Result<Vec<Activity>, DatabaseError> {
        self.find_overdue_on(today()).await
    }

    /// Unfinished activities whose end date is before `day`.
    pub async fn find_overdue_on(&self, day: NaiveDate) -> Result<Vec<Activity>, DatabaseError> {
        let filter = not_done()
            .not_null(ActivityColumn::EndDate)
            .lt(ActivityColumn::EndDate, day.to_string());
        self.table
            .select(Select::new().filter(filter).order_asc(ActivityColumn::EndDate))
            .await
    }

    pub async fn find_due_soon(&self) -> Result<Vec<Activity>, DatabaseError> {
        self.find_due_within(today(), self.due_soon_days).await
    }

    /// Unfinished activities ending within `from..=from + days`.
    pub async fn find_due_within(
        &self,
        from: NaiveDate,
        days: u32,
    ) -> Result<Vec<Activity>, DatabaseError> {
        let filter = not_done()
            .gte(ActivityColumn::EndDate, from.to_string())
            .lte(ActivityColumn::EndDate, days_after(from, days).to_string());
        self.table
            .select(Select::new().filter(filter).order_asc(ActivityColumn::EndDate))
            .await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: ActivityStatus,
    ) -> Result<Option<Activity>, DatabaseError> {
        let update = ActivityUpdateBuilder::new().status(status).build();
        self.table.update_by_id(id, &update).await
    }

    pub async fn mark_done(&self, id: &str) -> Result<Option<Activity>, DatabaseError> {
        self.update_status(id, ActivityStatus::Done).await
    }

    /// Activities of the schedule in `status`.
    pub async fn count_by_status(
        &self,
        schedule_id: &str,
        status: ActivityStatus,
    ) -> Result<u64, DatabaseError> {
        let filter = Filter::new()
            .eq(ActivityColumn::ScheduleId, schedule_id)
            .eq(ActivityColumn::Status, status);
        self.table.count(&filter).await
    }

    pub async fn delete_by_schedule_id(&self, schedule_id: &str) -> Result<u64, DatabaseError> {
        self.table
            .delete_where(&Filter::new().eq(ActivityColumn::ScheduleId, schedule_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::test_support::helpers::{seed_activity, seed_schedule, seed_user, test_store};

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn titles(activities: &[Activity]) -> Vec<&str> {
        activities.iter().map(|a| a.title.as_str()).collect()
    }

    #[tokio::test]
    async fn new_activity_defaults_to_pending() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let schedule = seed_schedule(&store, &user.id, "Plan").await;

        let activity = seed_activity(&store, &schedule.id, "Read", day(1), day(2)).await;
        assert!(activity.id.starts_with("act-"));
        assert_eq!(activity.status, ActivityStatus::Pending);
        assert_eq!(activity.start_date, day(1));
    }

    #[rstest]
    #[case(ActivityStatus::Done, ActivityStatus::Pending)]
    #[case(ActivityStatus::Pending, ActivityStatus::Done)]
    #[case(ActivityStatus::InProgress, ActivityStatus::Pending)]
    #[tokio::test]
    async fn any_status_transition_is_allowed(
        #[case] first: ActivityStatus,
        #[case] second: ActivityStatus,
    ) {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let schedule = seed_schedule(&store, &user.id, "Plan").await;
        let activity = seed_activity(&store, &schedule.id, "Read", day(1), day(2)).await;

        let repo = store.activities();
        repo.update_status(&activity.id, first).await.unwrap();
        let updated = repo.update_status(&activity.id, second).await.unwrap().unwrap();
        assert_eq!(updated.status, second);
    }

    #[tokio::test]
    async fn update_status_of_missing_activity_is_none() {
        let store = test_store().await;
        assert!(store.activities().mark_done("act-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn due_and_overdue_skip_done_activities() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let schedule = seed_schedule(&store, &user.id, "Plan").await;
        seed_activity(&store, &schedule.id, "Past", day(1), day(3)).await;
        let past_done = seed_activity(&store, &schedule.id, "PastDone", day(1), day(3)).await;
        seed_activity(&store, &schedule.id, "Today", day(5), day(10)).await;
        seed_activity(&store, &schedule.id, "Soon", day(9), day(14)).await;
        seed_activity(&store, &schedule.id, "Later", day(20), day(30)).await;
        store.activities().mark_done(&past_done.id).await.unwrap();

        let repo = store.activities();
        assert_eq!(titles(&repo.find_overdue_on(day(10)).await.unwrap()), vec!["Past"]);
        assert_eq!(titles(&repo.find_due_on(day(10)).await.unwrap()), vec!["Today"]);
        assert_eq!(
            titles(&repo.find_due_within(day(10), 7).await.unwrap()),
            vec!["Today", "Soon"]
        );
    }

    #[tokio::test]
    async fn date_range_is_inclusive_on_start_date() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let schedule = seed_schedule(&store, &user.id, "Plan").await;
        seed_activity(&store, &schedule.id, "A", day(1), day(2)).await;
        seed_activity(&store, &schedule.id, "B", day(5), day(6)).await;
        seed_activity(&store, &schedule.id, "C", day(9), day(9)).await;

        let found = store
            .activities()
            .find_in_date_range(&schedule.id, day(1), day(5))
            .await
            .unwrap();
        assert_eq!(titles(&found), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn find_by_user_id_joins_through_schedules() {
        let store = test_store().await;
        let ana = seed_user(&store, "ana@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let mine = seed_schedule(&store, &ana.id, "Mine").await;
        let theirs = seed_schedule(&store, &bob.id, "Theirs").await;
        seed_activity(&store, &mine.id, "Mine", day(1), day(2)).await;
        seed_activity(&store, &theirs.id, "Theirs", day(1), day(2)).await;

        let found = store.activities().find_by_user_id(&ana.id).await.unwrap();
        assert_eq!(titles(&found), vec!["Mine"]);
    }

    #[tokio::test]
    async fn status_filters_and_bulk_delete() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let schedule = seed_schedule(&store, &user.id, "Plan").await;
        let a = seed_activity(&store, &schedule.id, "A", day(1), day(2)).await;
        seed_activity(&store, &schedule.id, "B", day(1), day(2)).await;
        store.activities().mark_done(&a.id).await.unwrap();

        let repo = store.activities();
        assert_eq!(
            repo.count_by_status(&schedule.id, ActivityStatus::Done).await.unwrap(),
            1
        );
        let pending = repo
            .find_by_status(ActivityStatus::Pending, Some(schedule.id.as_str()))
            .await
            .unwrap();
        assert_eq!(titles(&pending), vec!["B"]);
        let a = repo.find_by_title(&schedule.id, "A").await.unwrap().unwrap();
        assert_eq!(a.title, "A");
        assert_eq!(repo.find_by_title(&schedule.id, "Z").await.unwrap(), None);

        assert_eq!(repo.delete_by_schedule_id(&schedule.id).await.unwrap(), 2);
        assert!(repo.find_by_schedule_id(&schedule.id).await.unwrap().is_empty());
    }
}
