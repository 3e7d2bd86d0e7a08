//! Storage backend configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which query backend the store talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Embedded libSQL database on disk (or `:memory:`).
    #[default]
    Local,
    /// Hosted PostgREST-style HTTP API.
    Postgrest,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Postgrest => "postgrest",
        })
    }
}

fn default_schema() -> String {
    "public".into()
}

/// Default HTTP request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    10
}

fn default_local_path() -> String {
    ".studyhub/study.db".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// REST endpoint root (e.g. `https://abc.supabase.co/rest/v1`).
    #[serde(default)]
    pub url: String,

    /// Project API key, sent as `apikey` and as the default bearer token.
    #[serde(default)]
    pub api_key: String,

    /// Database schema exposed by the REST API.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Per-request timeout for the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Database file for the local backend.
    #[serde(default = "default_local_path")]
    pub local_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            url: String::new(),
            api_key: String::new(),
            schema: default_schema(),
            timeout_secs: default_timeout_secs(),
            local_path: default_local_path(),
        }
    }
}

impl BackendConfig {
    /// Dotted names of the fields `kind` needs that are still empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required = match self.kind {
            BackendKind::Local => vec![("backend.local_path", self.local_path.as_str())],
            BackendKind::Postgrest => vec![
                ("backend.url", self.url.as_str()),
                ("backend.api_key", self.api_key.as_str()),
            ],
        };
        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Endpoint root without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Check the section for the selected backend kind.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingFields` names every required field left empty.
    /// `ConfigError::InvalidValue` covers a non-http url or a zero timeout on
    /// the PostgREST backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields {
                kind: self.kind,
                missing,
            });
        }
        if self.kind == BackendKind::Postgrest {
            if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: "backend.url",
                    reason: format!("expected an http(s) url, got '{}'", self.url),
                });
            }
            if self.timeout_secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "backend.timeout_secs",
                    reason: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local_and_valid() {
        let config = BackendConfig::default();
        assert_eq!(config.kind, BackendKind::Local);
        assert_eq!(config.schema, "public");
        assert_eq!(config.timeout_secs, 10);
        assert!(config.missing_fields().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn postgrest_names_each_missing_field() {
        let mut config = BackendConfig {
            kind: BackendKind::Postgrest,
            ..Default::default()
        };
        assert_eq!(config.missing_fields(), vec!["backend.url", "backend.api_key"]);

        config.url = "https://abc.supabase.co/rest/v1".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::MissingFields { kind: BackendKind::Postgrest, missing }
                if missing == &vec!["backend.api_key"]
        ));
        assert_eq!(
            err.to_string(),
            "the postgrest backend needs backend.api_key to be set"
        );
    }

    #[test]
    fn local_needs_a_path() {
        let config = BackendConfig {
            local_path: "  ".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "the local backend needs backend.local_path to be set");
    }

    #[test]
    fn remote_rejects_non_http_url() {
        let config = BackendConfig {
            kind: BackendKind::Postgrest,
            url: "abc.supabase.co".into(),
            api_key: "key".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let config = BackendConfig {
            url: "https://abc.supabase.co/rest/v1/".into(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "https://abc.supabase.co/rest/v1");
    }
}
