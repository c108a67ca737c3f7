//! # Top-level configuration.
//!
//! [`Config`] aggregates the scheduler and runner sections and loads from a
//! TOML file. Every field in every section has a default, so an empty file
//! (or a missing section) yields the stock configuration and a file needs to
//! name only what it overrides.
//!
//! ```toml
//! [scheduler]
//! capacity = 100
//! jitter = "equal"
//!
//! [runner]
//! grace_secs = 5
//! cancel_key = "x"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::runner::RunnerConfig;
use crate::scheduler::SchedulerConfig;

/// Aggregated configuration for the scheduler and runner.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rate-limit and retry settings.
    pub scheduler: SchedulerConfig,
    /// Subprocess supervision settings.
    pub runner: RunnerConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_input_yields_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.scheduler.capacity, 145);
        assert_eq!(cfg.runner.grace_secs, 2);
    }

    #[test]
    fn sections_override_independently() {
        let cfg: Config = toml::from_str(
            "[scheduler]\ncapacity = 10\n\n[runner]\ngrace_secs = 7\n",
        )
        .unwrap();
        assert_eq!(cfg.scheduler.capacity, 10);
        assert_eq!(cfg.scheduler.window_secs, 60);
        assert_eq!(cfg.runner.grace_secs, 7);
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[scheduler]\nmax_retries = 5\n").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.scheduler.max_retries, 5);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/nonexistent/pacerun.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[scheduler\ncapacity = ").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
