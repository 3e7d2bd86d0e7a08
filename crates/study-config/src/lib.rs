//! # study-config
//!
//! Settings for a studyhub store, merged by figment from (highest wins):
//!
//! 1. `STUDYHUB_*` environment variables, `__` between section and key
//!    (`STUDYHUB_BACKEND__API_KEY` -> `backend.api_key`)
//! 2. `<project>/.studyhub/config.toml`
//! 3. `~/.config/studyhub/config.toml`
//! 4. Built-in defaults: the local backend at `.studyhub/study.db`
//!
//! ```no_run
//! use study_config::StudyConfig;
//!
//! let config = StudyConfig::load_validated().expect("settings");
//! println!("{} backend", config.backend.kind);
//! ```

mod backend;
mod error;
mod general;

pub use backend::{BackendConfig, BackendKind};
pub use error::ConfigError;
pub use general::GeneralConfig;

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Prefix of the environment variables read into [`StudyConfig`].
pub const ENV_PREFIX: &str = "STUDYHUB_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl StudyConfig {
    /// Settings for the project in the current directory, without `.env`.
    ///
    /// # Errors
    ///
    /// `ConfigError::Load` if a file or variable does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Settings for the project rooted at `project_dir`.
    ///
    /// # Errors
    ///
    /// `ConfigError::Load` if a file or variable does not parse.
    pub fn load_from(project_dir: &Path) -> Result<Self, ConfigError> {
        Ok(Self::figment_for(project_dir).extract()?)
    }

    /// Like [`load`](Self::load), after exporting a `.env` from the current
    /// directory or its parents. A missing `.env` is not an error.
    ///
    /// # Errors
    ///
    /// `ConfigError::Load` if a file or variable does not parse.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load()
    }

    /// [`load_with_dotenv`](Self::load_with_dotenv) followed by [`validate`](Self::validate).
    ///
    /// # Errors
    ///
    /// Any loading or validation error.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load_with_dotenv()?;
        config.validate()?;
        Ok(config)
    }

    /// Provider chain for the current directory.
    pub fn figment() -> Figment {
        Self::figment_for(Path::new("."))
    }

    /// Provider chain with the project file taken from `project_dir`.
    pub fn figment_for(project_dir: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(global) = Self::global_config_path().filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(global));
        }
        let project = Self::project_config_path(project_dir);
        if project.exists() {
            figment = figment.merge(Toml::file(project));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// # Errors
    ///
    /// The first problem found in the backend or general section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.general.validate()
    }

    #[must_use]
    pub fn project_config_path(project_dir: &Path) -> PathBuf {
        project_dir.join(".studyhub").join("config.toml")
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("studyhub").join("config.toml"))
    }
}
