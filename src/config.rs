//! Application-level configuration loading: catalog location and game timing.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WORDWHEEL_CONFIG_PATH";
/// Environment variable that overrides the configured question file.
const QUESTIONS_PATH_ENV: &str = "WORDWHEEL_QUESTIONS_PATH";
/// Question file used when nothing else is configured.
const DEFAULT_QUESTIONS_PATH: &str = "data/questions.json";
/// Length of one game.
pub const DEFAULT_GAME_DURATION: Duration = Duration::from_secs(300);
/// Interval between two timer updates pushed to a client.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    questions_path: PathBuf,
    game_duration: Duration,
    tick_interval: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    config
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
        };

        config.with_env_overrides()
    }

    /// Parse a configuration document; absent fields keep their defaults.
    pub fn from_json_str(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Override individual settings, mostly useful for tests.
    ///
    /// Zero durations are ignored and keep the current values.
    pub fn with_timing(mut self, game_duration: Duration, tick_interval: Duration) -> Self {
        if !game_duration.is_zero() {
            self.game_duration = game_duration;
        }
        if !tick_interval.is_zero() {
            self.tick_interval = tick_interval;
        }
        self
    }

    /// Path of the question catalog file.
    pub fn questions_path(&self) -> &Path {
        &self.questions_path
    }

    /// Length of one game.
    pub fn game_duration(&self) -> Duration {
        self.game_duration
    }

    /// Interval between two timer updates.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(path) = env::var_os(QUESTIONS_PATH_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
        {
            self.questions_path = path;
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions_path: PathBuf::from(DEFAULT_QUESTIONS_PATH),
            game_duration: DEFAULT_GAME_DURATION,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    questions_path: Option<PathBuf>,
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    #[serde(rename = "game_duration_secs")]
    game_duration: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(rename = "tick_interval_ms")]
    tick_interval: Option<Duration>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            questions_path: value.questions_path.unwrap_or(defaults.questions_path),
            game_duration: value
                .game_duration
                .filter(|duration| !duration.is_zero())
                .unwrap_or(defaults.game_duration),
            tick_interval: value
                .tick_interval
                .filter(|interval| !interval.is_zero())
                .unwrap_or(defaults.tick_interval),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config.questions_path(), Path::new(DEFAULT_QUESTIONS_PATH));
        assert_eq!(config.game_duration(), DEFAULT_GAME_DURATION);
        assert_eq!(config.tick_interval(), DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn durations_are_read_in_their_units() {
        let config = AppConfig::from_json_str(
            r#"{"questions_path": "q.json", "game_duration_secs": 90, "tick_interval_ms": 250}"#,
        )
        .unwrap();
        assert_eq!(config.questions_path(), Path::new("q.json"));
        assert_eq!(config.game_duration(), Duration::from_secs(90));
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn zero_durations_fall_back_to_defaults() {
        let config =
            AppConfig::from_json_str(r#"{"game_duration_secs": 0, "tick_interval_ms": 0}"#).unwrap();
        assert_eq!(config.game_duration(), DEFAULT_GAME_DURATION);
        assert_eq!(config.tick_interval(), DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn timing_overrides_ignore_zero() {
        let config = AppConfig::default().with_timing(Duration::ZERO, Duration::ZERO);
        assert_eq!(config.game_duration(), DEFAULT_GAME_DURATION);
        assert_eq!(config.tick_interval(), DEFAULT_TICK_INTERVAL);

        let config =
            AppConfig::default().with_timing(Duration::from_secs(60), Duration::from_millis(500));
        assert_eq!(config.game_duration(), Duration::from_secs(60));
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
    }
}
