//! General application configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default look-ahead window for "due soon" queries.
const fn default_due_soon_days() -> u32 {
    7
}

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Days ahead (inclusive) considered "due soon" for activities and goals.
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u32,

    /// Default result limit for "recent" listings.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            due_soon_days: default_due_soon_days(),
            default_limit: default_limit(),
        }
    }
}

impl GeneralConfig {
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` when `default_limit` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.due_soon_days, 7);
        assert_eq!(config.default_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let config = GeneralConfig {
            default_limit: 0,
            ..GeneralConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "general.default_limit", .. })
        ));
    }
}
