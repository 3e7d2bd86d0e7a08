//! Schedule overviews with derived date range and status, plus cascading
//! schedule writes.

use chrono::NaiveDate;
use study_core::entities::{Activity, NewSchedule, Schedule};
use study_core::enums::ScheduleStatus;
use study_core::generated::{ActivityDraft, GeneratedSchedule};
use study_core::views::{DateRange, ScheduleOverview, ScheduleWithActivities};

use crate::aggregate::cascade;
use crate::error::DatabaseError;
use crate::repos::{ActivityRepo, ScheduleRepo, today};
use crate::repository::Repository;

/// A schedule runs from its creation day to the latest activity end date.
/// Without activities it ends on the day it starts.
#[must_use]
pub fn schedule_date_range(schedule: &Schedule, activities: &[Activity]) -> DateRange {
    let start = schedule.created_at.date_naive();
    let end = activities
        .iter()
        .map(|a| a.end_date)
        .max()
        .unwrap_or(start);
    DateRange { start, end }
}

fn overview(view: ScheduleWithActivities, day: NaiveDate) -> ScheduleOverview {
    let range = schedule_date_range(&view.schedule, &view.activities);
    ScheduleOverview {
        status: ScheduleStatus::classify(range.start, range.end, day),
        schedule: view.schedule,
        activities: view.activities,
        range,
    }
}

#[derive(Clone)]
pub struct ScheduleAggregator {
    schedules: ScheduleRepo,
    activities: ActivityRepo,
}

impl ScheduleAggregator {
    #[must_use]
    pub const fn new(schedules: ScheduleRepo, activities: ActivityRepo) -> Self {
        Self {
            schedules,
            activities,
        }
    }

    pub async fn get_overview(&self, id: &str) -> Result<Option<ScheduleOverview>, DatabaseError> {
        self.get_overview_on(id, today()).await
    }

    /// Overview with the status classified against `day`.
    pub async fn get_overview_on(
        &self,
        id: &str,
        day: NaiveDate,
    ) -> Result<Option<ScheduleOverview>, DatabaseError> {
        Ok(self
            .schedules
            .find_with_activities(id)
            .await?
            .map(|view| overview(view, day)))
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<ScheduleOverview>, DatabaseError> {
        self.list_for_user_on(user_id, today()).await
    }

    /// Overviews of all the user's schedules, newest first.
    pub async fn list_for_user_on(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<ScheduleOverview>, DatabaseError> {
        Ok(self
            .schedules
            .find_by_user_with_activities(user_id)
            .await?
            .into_iter()
            .map(|view| overview(view, day))
            .collect())
    }

    /// Create the schedule and all its activities. Activities go in one bulk
    /// insert; if it fails the schedule is removed again.
    pub async fn create_with_activities(
        &self,
        schedule: &NewSchedule,
        activities: Vec<ActivityDraft>,
    ) -> Result<ScheduleWithActivities, DatabaseError> {
        let (schedule, activities) = cascade::create_with_children(
            self.schedules.table(),
            self.activities.table(),
            schedule,
            |schedule: &Schedule| {
                activities
                    .into_iter()
                    .map(|draft| draft.into_new(&schedule.id))
                    .collect()
            },
        )
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "create_with_activities failed"))?;
        Ok(ScheduleWithActivities {
            schedule,
            activities,
        })
    }

    /// Persist a schedule produced by the generative-content client.
    pub async fn import_generated(
        &self,
        user_id: &str,
        generated: GeneratedSchedule,
    ) -> Result<ScheduleWithActivities, DatabaseError> {
        let (schedule, drafts) = generated.into_parts(user_id);
        self.create_with_activities(&schedule, drafts).await
    }

    /// Delete the schedule's activities, then the schedule. Returns the
    /// number of activities removed.
    ///
    /// A failure after the first step leaves the schedule without activities,
    /// never activities without their schedule.
    pub async fn delete_with_activities(&self, id: &str) -> Result<u64, DatabaseError> {
        let removed = self
            .activities
            .delete_by_schedule_id(id)
            .await
            .inspect_err(|e| tracing::warn!(schedule_id = id, error = %e, "activity delete failed"))?;
        self.schedules
            .delete_by_id(id)
            .await
            .inspect_err(|e| tracing::warn!(schedule_id = id, error = %e, "schedule delete failed"))?;
        tracing::info!(schedule_id = id, activities = removed, "schedule deleted with activities");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use study_core::enums::ActivityStatus;

    use crate::test_support::helpers::{seed_user, test_store};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule_created(y: i32, m: u32, d: u32) -> Schedule {
        Schedule {
            id: "sch-1".into(),
            user_id: "usr-1".into(),
            title: "Plan".into(),
            description: None,
            created_at: Utc.with_ymd_and_hms(y, m, d, 15, 30, 0).unwrap(),
        }
    }

    fn activity_ending(end: NaiveDate) -> Activity {
        Activity {
            id: "act-1".into(),
            schedule_id: "sch-1".into(),
            title: "Read".into(),
            description: None,
            start_date: end,
            end_date: end,
            status: ActivityStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn draft(title: &str, start: NaiveDate, end: NaiveDate) -> ActivityDraft {
        ActivityDraft {
            title: title.into(),
            description: None,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn range_ends_at_latest_activity() {
        let schedule = schedule_created(2024, 1, 1);
        let activities = [
            activity_ending(date(2024, 1, 5)),
            activity_ending(date(2024, 1, 20)),
            activity_ending(date(2024, 1, 9)),
        ];
        assert_eq!(
            schedule_date_range(&schedule, &activities),
            DateRange {
                start: date(2024, 1, 1),
                end: date(2024, 1, 20),
            }
        );
    }

    #[test]
    fn range_without_activities_is_one_day() {
        let schedule = schedule_created(2024, 3, 7);
        let range = schedule_date_range(&schedule, &[]);
        assert_eq!(range.start, date(2024, 3, 7));
        assert_eq!(range.end, date(2024, 3, 7));
    }

    #[rstest]
    #[case(date(2023, 12, 31), ScheduleStatus::Future)]
    #[case(date(2024, 1, 1), ScheduleStatus::Active)]
    #[case(date(2024, 1, 20), ScheduleStatus::Active)]
    #[case(date(2024, 1, 21), ScheduleStatus::Expired)]
    fn overview_status_follows_range(#[case] day: NaiveDate, #[case] expected: ScheduleStatus) {
        let view = ScheduleWithActivities {
            schedule: schedule_created(2024, 1, 1),
            activities: vec![activity_ending(date(2024, 1, 20))],
        };
        assert_eq!(overview(view, day).status, expected);
    }

    #[tokio::test]
    async fn create_overview_and_delete() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let aggregator = store.schedule_aggregator();

        let created = aggregator
            .create_with_activities(
                &NewSchedule {
                    user_id: user.id.clone(),
                    title: "Plan".into(),
                    description: None,
                },
                vec![
                    draft("A", date(2024, 1, 1), date(2024, 1, 5)),
                    draft("B", date(2024, 1, 6), date(2024, 1, 20)),
                ],
            )
            .await
            .unwrap();
        assert_eq!(created.activities.len(), 2);

        let today = Utc::now().date_naive();
        let overview = aggregator
            .get_overview_on(&created.schedule.id, today)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(overview.range.start, today);
        assert_eq!(overview.range.end, date(2024, 1, 20));
        assert_eq!(overview.status, ScheduleStatus::Expired);

        let listed = aggregator.list_for_user_on(&user.id, today).await.unwrap();
        assert_eq!(listed, vec![overview]);

        assert_eq!(aggregator.delete_with_activities(&created.schedule.id).await.unwrap(), 2);
        assert!(aggregator.get_overview(&created.schedule.id).await.unwrap().is_none());
        assert!(
            store
                .activities()
                .find_by_schedule_id(&created.schedule.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn import_generated_schedule() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let generated: GeneratedSchedule = study_core::generated::parse_generated(
            r#"{
                "title": "Exam prep",
                "activities": [
                    {"title": "Chapter 1", "start_date": "2024-05-01", "end_date": "2024-05-03"}
                ]
            }"#,
        )
        .unwrap();

        let created = store
            .schedule_aggregator()
            .import_generated(&user.id, generated)
            .await
            .unwrap();
        assert_eq!(created.schedule.title, "Exam prep");
        assert_eq!(created.activities[0].schedule_id, created.schedule.id);
        assert_eq!(created.activities[0].status, ActivityStatus::Pending);
    }
}
