//! Shared test utilities for study-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::NaiveDate;
    use study_core::entities::{
        Activity, NewActivity, NewQuestion, NewQuiz, NewSchedule, NewText, NewUser, Question,
        Quiz, Schedule, Text, User,
    };
    use study_core::enums::OptionLetter;

    use crate::StudyStore;
    use crate::repository::Repository;

    /// Create an in-memory store with the schema applied.
    pub async fn test_store() -> StudyStore {
        StudyStore::open_local(":memory:").await.unwrap()
    }

    /// Insert a user named after the local part of `email`.
    pub async fn seed_user(store: &StudyStore, email: &str) -> User {
        let name = email.split('@').next().unwrap_or(email);
        store
            .users()
            .create(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn seed_schedule(store: &StudyStore, user_id: &str, title: &str) -> Schedule {
        store
            .schedules()
            .create(&NewSchedule {
                user_id: user_id.to_string(),
                title: title.to_string(),
                description: None,
            })
            .await
            .unwrap()
    }

    pub async fn seed_activity(
        store: &StudyStore,
        schedule_id: &str,
        title: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Activity {
        store
            .activities()
            .create(&NewActivity {
                schedule_id: schedule_id.to_string(),
                title: title.to_string(),
                description: None,
                start_date: start,
                end_date: end,
                status: None,
            })
            .await
            .unwrap()
    }

    pub async fn seed_quiz(store: &StudyStore, user_id: &str, title: &str) -> Quiz {
        store
            .quizzes()
            .create(&NewQuiz {
                user_id: user_id.to_string(),
                title: title.to_string(),
            })
            .await
            .unwrap()
    }

    /// Insert a question with options `"a"`..`"d"`.
    pub async fn seed_question(
        store: &StudyStore,
        quiz_id: &str,
        statement: &str,
        correct: OptionLetter,
    ) -> Question {
        store
            .questions()
            .create(&NewQuestion {
                quiz_id: quiz_id.to_string(),
                statement: statement.to_string(),
                option_a: "a".into(),
                option_b: "b".into(),
                option_c: "c".into(),
                option_d: "d".into(),
                correct_option: correct,
            })
            .await
            .unwrap()
    }

    /// Insert an unsaved plain text.
    pub async fn seed_text(store: &StudyStore, user_id: &str, title: &str) -> Text {
        store
            .texts()
            .create(&NewText {
                user_id: user_id.to_string(),
                title: title.to_string(),
                content: format!("{title} body"),
                kind: None,
                original_prompt: None,
                saved: None,
            })
            .await
            .unwrap()
    }
}
