//! Configuration: `config.json`, credentials from `.env`, validation.

pub mod credentials;
pub mod defaults;
pub mod validation;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

pub use credentials::{Credentials, CredentialsError};
pub use validation::{minimum_check_interval, validate};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{} could not be found", .0.display())]
    Missing(PathBuf),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("check interval of {interval}s is below the minimum of {minimum}s")]
    IntervalTooShort { interval: u64, minimum: u64 },

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime configuration, read once at startup and never mutated by the loop.
///
/// Keys written by older versions of the setup wizard are accepted as
/// aliases so existing `config.json` files keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerConfig {
    #[serde(
        alias = "check_interval",
        default = "defaults::check_interval",
        deserialize_with = "lenient_u64"
    )]
    pub check_interval_seconds: u64,

    #[serde(
        alias = "max_idle_duration",
        default = "defaults::idle_threshold",
        deserialize_with = "lenient_u64"
    )]
    pub idle_threshold_seconds: u64,

    #[serde(alias = "notification", default = "defaults::enabled")]
    pub notifications_enabled: bool,

    #[serde(alias = "autofarming", default = "defaults::enabled")]
    pub auto_attend_enabled: bool,

    #[serde(default = "defaults::active_list")]
    pub active_list: String,

    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_seconds: u64,

    #[serde(default = "defaults::webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "defaults::browser_args")]
    pub browser_args: Vec<String>,

    #[serde(default = "defaults::profile_image_max_age")]
    pub profile_image_max_age_days: u64,
}

impl Default for FarmerConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: defaults::check_interval(),
            idle_threshold_seconds: defaults::idle_threshold(),
            notifications_enabled: true,
            auto_attend_enabled: true,
            active_list: defaults::active_list(),
            request_timeout_seconds: defaults::request_timeout(),
            webdriver_url: defaults::webdriver_url(),
            browser_args: defaults::browser_args(),
            profile_image_max_age_days: defaults::profile_image_max_age(),
        }
    }
}

impl FarmerConfig {
    /// Load `config.json`. A missing file is an error: the setup wizard
    /// is responsible for creating it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let body = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, body).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_seconds)
    }

    /// `None` disables the HTTP timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_seconds > 0).then(|| Duration::from_secs(self.request_timeout_seconds))
    }

    /// Resolve the streamer list path against the data directory.
    pub fn streamer_list_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.active_list)
    }
}

/// Accept both `30` and `"30"`: early setup versions stored numbers
/// exactly as typed.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_keys_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(defaults::CONFIG_FILE);
        let config = FarmerConfig {
            check_interval_seconds: 30,
            idle_threshold_seconds: 120,
            notifications_enabled: false,
            auto_attend_enabled: true,
            active_list: "favourites.txt".into(),
            ..FarmerConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(FarmerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn legacy_keys_and_string_numbers_are_accepted() {
        let raw = r#"{
            "check_interval": "20",
            "max_idle_duration": 300,
            "notification": true,
            "autofarming": false,
            "active_list": "streamers.txt"
        }"#;

        let config: FarmerConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.check_interval_seconds, 20);
        assert_eq!(config.idle_threshold_seconds, 300);
        assert!(config.notifications_enabled);
        assert!(!config.auto_attend_enabled);
        assert_eq!(config.webdriver_url, defaults::DEFAULT_WEBDRIVER_URL);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn non_numeric_interval_is_a_parse_error() {
        let raw = r#"{"check_interval_seconds": "soon"}"#;
        assert!(serde_json::from_str::<FarmerConfig>(raw).is_err());
    }

    #[test]
    fn missing_file_is_reported_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = FarmerConfig::load(&dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = FarmerConfig {
            request_timeout_seconds: 0,
            ..FarmerConfig::default()
        };
        assert_eq!(config.request_timeout(), None);
    }
}
