//! Reconstruction settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::variant::STANDARD_OPENING;
use crate::protocol::{parse_dfen, DfenError};
use crate::rules::RuleOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid initial position")]
    InvalidPosition(#[from] DfenError),
}

/// Settings for one reconstruction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// DFEN of the board before the first transcript phase.
    pub initial_position: String,
    /// Supply centers needed for a solo victory.
    pub victory_centers: usize,
    /// Rule options in force when the game starts.
    pub rules: RuleOptions,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            initial_position: STANDARD_OPENING.to_string(),
            victory_centers: 18,
            rules: RuleOptions::default(),
        }
    }
}

impl ReplayConfig {
    /// Reads a JSON config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<ReplayConfig, ConfigError> {
        let text = fs::read_to_string(path)?;
        ReplayConfig::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<ReplayConfig, ConfigError> {
        let config: ReplayConfig = serde_json::from_str(text)?;
        parse_dfen(&config.initial_position)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = ReplayConfig::from_json("{}").expect("parses");
        assert_eq!(config, ReplayConfig::default());
        assert_eq!(config.victory_centers, 18);
        assert!(!config.rules.wings);
    }

    #[test]
    fn partial_override() {
        let config = ReplayConfig::from_json(r#"{"victory_centers": 17, "rules": {"wings": true}}"#)
            .expect("parses");
        assert_eq!(config.victory_centers, 17);
        assert!(config.rules.wings);
        assert_eq!(config.initial_position, STANDARD_OPENING);
    }

    #[test]
    fn rejects_bad_position() {
        let err = ReplayConfig::from_json(r#"{"initial_position": "nonsense"}"#).expect_err("bad dfen");
        assert!(matches!(err, ConfigError::InvalidPosition(_)));
        let err = ReplayConfig::from_json("[").expect_err("bad json");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
