//! Application-level configuration loading: point values, undo depth, selection policy and
//! store location.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::state_machine::{DEFAULT_POINT_VALUES, ScoreboardRules};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/scoreboard.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCOREBOARD_CONFIG_PATH";
/// Store file used when the configuration does not name one.
const DEFAULT_STORE_PATH: &str = "data/scoreboard.json";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    point_values: Vec<u32>,
    history_limit: Option<usize>,
    strict_selection: bool,
    store_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        points = ?app_config.point_values,
                        history_limit = ?app_config.history_limit,
                        "loaded scoreboard config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document. Missing fields take their defaults.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let raw = serde_json::from_str::<RawConfig>(contents)?;
        raw.try_into()
    }

    /// Rules handed to the scoreboard state machine.
    pub fn rules(&self) -> ScoreboardRules {
        ScoreboardRules {
            point_values: self.point_values.clone(),
            history_limit: self.history_limit,
        }
    }

    /// Whether out-of-range team selections are reported instead of ignored.
    pub fn strict_selection(&self) -> bool {
        self.strict_selection
    }

    /// File backing the key-value store; `None` keeps state in memory only.
    pub fn store_path(&self) -> Option<&PathBuf> {
        self.store_path.as_ref()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            point_values: DEFAULT_POINT_VALUES.to_vec(),
            history_limit: None,
            strict_selection: false,
            store_path: Some(PathBuf::from(DEFAULT_STORE_PATH)),
        }
    }
}

/// Reasons a configuration document is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for [`RawConfig`].
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document parsed but describes an unusable setup.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    point_values: Vec<u32>,
    history_limit: Option<usize>,
    strict_selection: bool,
    /// Empty string disables the file store.
    store_path: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            point_values: DEFAULT_POINT_VALUES.to_vec(),
            history_limit: None,
            strict_selection: false,
            store_path: DEFAULT_STORE_PATH.into(),
        }
    }
}

impl TryFrom<RawConfig> for AppConfig {
    type Error = ConfigError;

    fn try_from(value: RawConfig) -> Result<Self, Self::Error> {
        if value.point_values.is_empty() {
            return Err(ConfigError::Invalid(
                "point_values must list at least one value".into(),
            ));
        }
        if value.point_values.contains(&0) {
            return Err(ConfigError::Invalid(
                "point_values must be strictly positive".into(),
            ));
        }

        let mut point_values = value.point_values;
        point_values.sort_unstable();
        point_values.dedup();

        let store_path = Some(value.store_path)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            point_values,
            history_limit: value.history_limit,
            strict_selection: value.strict_selection,
            store_path,
        })
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
