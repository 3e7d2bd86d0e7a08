//! Errors raised while loading or checking studyhub settings.

use thiserror::Error;

use crate::BackendKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A settings file or environment variable could not be read into [`crate::StudyConfig`].
    #[error("failed to load studyhub settings: {0}")]
    Load(#[from] figment::Error),

    /// The selected backend lacks fields it cannot run without.
    #[error("the {kind} backend needs {} to be set", .missing.join(", "))]
    MissingFields {
        kind: BackendKind,
        missing: Vec<&'static str>,
    },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
