//! Parent-plus-children creation with a compensating delete.

use crate::error::DatabaseError;
use crate::record::Record;
use crate::table::TableRepository;

/// Insert `parent`, then all children built from it in one bulk insert.
///
/// The bulk insert is all-or-nothing. If it fails, the parent is deleted
/// again and the insert error is returned. If that delete fails too, the
/// result is [`DatabaseError::PartialFailure`] naming the orphaned parent.
pub(crate) async fn create_with_children<P, C, F>(
    parents: &TableRepository<P>,
    children: &TableRepository<C>,
    parent: &P::Create,
    children_of: F,
) -> Result<(P, Vec<C>), DatabaseError>
where
    P: Record,
    C: Record,
    F: FnOnce(&P) -> Vec<C::Create>,
{
    let parent = parents.create(parent).await?;
    let payloads = children_of(&parent);

    match children.create_many(&payloads).await {
        Ok(created) => {
            tracing::info!(
                table = P::TABLE,
                id = parent.id(),
                children = created.len(),
                "created with children"
            );
            Ok((parent, created))
        }
        Err(err) => {
            tracing::warn!(
                table = P::TABLE,
                id = parent.id(),
                error = %err,
                "child insert failed, removing parent"
            );
            if let Err(cleanup) = parents.delete_by_id(parent.id()).await {
                tracing::warn!(
                    table = P::TABLE,
                    id = parent.id(),
                    error = %cleanup,
                    "compensating delete failed"
                );
                return Err(DatabaseError::PartialFailure(format!(
                    "{} {} left without {}: {err}; compensating delete failed: {cleanup}",
                    P::TABLE,
                    parent.id(),
                    C::TABLE
                )));
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use study_core::entities::{Activity, NewActivity, NewSchedule, Schedule};

    use crate::query::Filter;
    use crate::test_support::helpers::{seed_user, test_store};

    use super::*;

    fn activity(schedule_id: &str, title: &str) -> NewActivity {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        NewActivity {
            schedule_id: schedule_id.to_string(),
            title: title.to_string(),
            description: None,
            start_date: day,
            end_date: day,
            status: None,
        }
    }

    #[tokio::test]
    async fn failed_children_remove_parent_and_write_nothing() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let backend = store.backend();
        let schedules = TableRepository::<Schedule>::new(backend.clone());
        let activities = TableRepository::<Activity>::new(backend.clone());

        let err = create_with_children(
            &schedules,
            &activities,
            &NewSchedule {
                user_id: user.id.clone(),
                title: "Plan".into(),
                description: None,
            },
            |schedule: &Schedule| {
                vec![
                    activity(&schedule.id, "valid"),
                    activity("sch-missing", "dangling"),
                ]
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_foreign_key_violation(), "{err:?}");
        assert_eq!(schedules.count(&Filter::new()).await.unwrap(), 0);
        assert_eq!(activities.count(&Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn no_children_still_creates_parent() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let backend = store.backend();
        let schedules = TableRepository::<Schedule>::new(backend.clone());
        let activities = TableRepository::<Activity>::new(backend.clone());

        let (schedule, children) = create_with_children(
            &schedules,
            &activities,
            &NewSchedule {
                user_id: user.id.clone(),
                title: "Empty".into(),
                description: None,
            },
            |_: &Schedule| Vec::new(),
        )
        .await
        .unwrap();
        assert!(children.is_empty());
        assert_eq!(schedules.find_by_id(&schedule.id).await.unwrap(), Some(schedule));
    }
}
