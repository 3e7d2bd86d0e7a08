//! # study-db
//!
//! Data access for studyhub: users, schedules and their activities, goals,
//! daily progress, quizzes with questions and answers, texts and their
//! conversations.
//!
//! Every table is reached through the same generic CRUD contract
//! ([`Repository`]) over a pluggable [`QueryBackend`]: PostgREST over HTTP
//! for the hosted store, or an embedded libSQL database for local use and
//! tests. Entity repositories add domain queries and statistics on top;
//! aggregators compose them into multi-step operations.

pub mod aggregate;
pub mod backend;
pub mod error;
pub mod helpers;
mod migrations;
pub mod query;
pub mod record;
pub mod repos;
pub mod repository;
pub mod table;
pub mod updates;

#[cfg(test)]
mod test_support;

use std::path::Path;
use std::sync::Arc;

use study_config::{BackendKind, GeneralConfig, StudyConfig};
use study_core::entities::{Progress, Schedule};

pub use aggregate::{ScheduleAggregator, TextAggregator};
pub use backend::local::LocalBackend;
pub use backend::postgrest::PostgrestBackend;
pub use backend::{BackendError, QueryBackend};
pub use error::DatabaseError;
pub use query::{Column, Embed, Filter, Select};
pub use record::Record;
pub use repository::Repository;
pub use table::TableRepository;

use repos::{
    ActivityRepo, AnswerRepo, ConversationRepo, GoalRepo, ProgressRepo, QuestionRepo, QuizRepo,
    ScheduleRepo, TextRepo, UserRepo,
};

/// Entry point bundling every repository and aggregator over one backend.
///
/// Cloning is cheap; all clones share the backend.
#[derive(Clone)]
pub struct StudyStore {
    backend: Arc<dyn QueryBackend>,
    general: GeneralConfig,
    users: UserRepo,
    schedules: ScheduleRepo,
    activities: ActivityRepo,
    goals: GoalRepo,
    progress: ProgressRepo,
    quizzes: QuizRepo,
    questions: QuestionRepo,
    answers: AnswerRepo,
    texts: TextRepo,
    conversations: ConversationRepo,
    schedule_aggregator: ScheduleAggregator,
    text_aggregator: TextAggregator,
}

impl StudyStore {
    /// Wrap an existing backend with default general settings.
    #[must_use]
    pub fn from_backend(backend: Arc<dyn QueryBackend>) -> Self {
        Self::with_general(backend, GeneralConfig::default())
    }

    #[must_use]
    pub fn with_general(backend: Arc<dyn QueryBackend>, general: GeneralConfig) -> Self {
        let schedules = ScheduleRepo::new(Arc::clone(&backend));
        let activities =
            ActivityRepo::new(Arc::clone(&backend)).with_due_soon_days(general.due_soon_days);
        let texts = TextRepo::new(Arc::clone(&backend));
        let conversations = ConversationRepo::new(Arc::clone(&backend));

        Self {
            users: UserRepo::new(Arc::clone(&backend)),
            goals: GoalRepo::new(Arc::clone(&backend)).with_due_soon_days(general.due_soon_days),
            progress: ProgressRepo::new(Arc::clone(&backend)),
            quizzes: QuizRepo::new(Arc::clone(&backend)),
            questions: QuestionRepo::new(Arc::clone(&backend)),
            answers: AnswerRepo::new(Arc::clone(&backend)),
            schedule_aggregator: ScheduleAggregator::new(schedules.clone(), activities.clone()),
            text_aggregator: TextAggregator::new(texts.clone(), conversations.clone()),
            schedules,
            activities,
            texts,
            conversations,
            general,
            backend,
        }
    }

    /// Open (or create) a local libSQL store. Pass `":memory:"` for an
    /// ephemeral database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created, the
    /// database cannot be opened, or migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let backend = open_local_backend(path).await?;
        Ok(Self::from_backend(Arc::new(backend)))
    }

    /// Build the store the configuration asks for.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Config` if the `[backend]` section is invalid
    /// (a PostgREST backend without url or api key is `MissingFields`), or
    /// any error from opening the chosen backend.
    pub async fn connect(config: &StudyConfig) -> Result<Self, DatabaseError> {
        config.backend.validate()?;
        let backend: Arc<dyn QueryBackend> = match config.backend.kind {
            BackendKind::Local => Arc::new(open_local_backend(&config.backend.local_path).await?),
            BackendKind::Postgrest => {
                let client = PostgrestBackend::new(&config.backend).map_err(|e| {
                    DatabaseError::Other(anyhow::Error::new(e).context("building PostgREST client"))
                })?;
                Arc::new(client)
            }
        };
        tracing::debug!(backend = backend.name(), "connected");
        Ok(Self::with_general(backend, config.general.clone()))
    }

    #[must_use]
    pub const fn backend(&self) -> &Arc<dyn QueryBackend> {
        &self.backend
    }

    #[must_use]
    pub const fn general(&self) -> &GeneralConfig {
        &self.general
    }

    #[must_use]
    pub const fn users(&self) -> &UserRepo {
        &self.users
    }

    #[must_use]
    pub const fn schedules(&self) -> &ScheduleRepo {
        &self.schedules
    }

    #[must_use]
    pub const fn activities(&self) -> &ActivityRepo {
        &self.activities
    }

    #[must_use]
    pub const fn goals(&self) -> &GoalRepo {
        &self.goals
    }

    #[must_use]
    pub const fn progress(&self) -> &ProgressRepo {
        &self.progress
    }

    #[must_use]
    pub const fn quizzes(&self) -> &QuizRepo {
        &self.quizzes
    }

    #[must_use]
    pub const fn questions(&self) -> &QuestionRepo {
        &self.questions
    }

    #[must_use]
    pub const fn answers(&self) -> &AnswerRepo {
        &self.answers
    }

    #[must_use]
    pub const fn texts(&self) -> &TextRepo {
        &self.texts
    }

    #[must_use]
    pub const fn conversations(&self) -> &ConversationRepo {
        &self.conversations
    }

    #[must_use]
    pub const fn schedule_aggregator(&self) -> &ScheduleAggregator {
        &self.schedule_aggregator
    }

    #[must_use]
    pub const fn text_aggregator(&self) -> &TextAggregator {
        &self.text_aggregator
    }

    /// The user's newest schedules, up to the configured default limit.
    pub async fn recent_schedules(&self, user_id: &str) -> Result<Vec<Schedule>, DatabaseError> {
        self.schedules
            .find_recent(user_id, self.general.default_limit as usize)
            .await
    }

    /// The user's most recent progress days, up to the configured default limit.
    pub async fn recent_progress(&self, user_id: &str) -> Result<Vec<Progress>, DatabaseError> {
        self.progress
            .find_recent(user_id, self.general.default_limit as usize)
            .await
    }
}

async fn open_local_backend(path: &str) -> Result<LocalBackend, DatabaseError> {
    if path != ":memory:" {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Other(
                    anyhow::Error::new(e).context(format!("creating directory for '{path}'")),
                )
            })?;
        }
    }
    let backend = LocalBackend::open(path).await?;
    tracing::debug!(path, "opened local store");
    Ok(backend)
}
