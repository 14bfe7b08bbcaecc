//! Startup validation of the loaded configuration.

use std::sync::LazyLock;

use regex::Regex;

use super::defaults::{MIN_CHECK_INTERVAL_SECS, SECS_PER_STREAMER};
use super::{ConfigError, FarmerConfig};

static RE_HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/]+(/\S*)?$").unwrap());

/// Smallest allowed check interval for a list of `streamer_count` channels.
pub fn minimum_check_interval(streamer_count: usize) -> u64 {
    let dynamic = SECS_PER_STREAMER.saturating_mul(streamer_count as u64);
    dynamic.max(MIN_CHECK_INTERVAL_SECS)
}

/// Refuse configurations that would poll the API too aggressively or
/// point the browser actuator at something that is not an HTTP endpoint.
pub fn validate(config: &FarmerConfig, streamer_count: usize) -> Result<(), ConfigError> {
    let minimum = minimum_check_interval(streamer_count);
    if config.check_interval_seconds < minimum {
        return Err(ConfigError::IntervalTooShort {
            interval: config.check_interval_seconds,
            minimum,
        });
    }

    if config.active_list.trim().is_empty() {
        return Err(ConfigError::Invalid {
            key: "active_list",
            reason: "must name a file".into(),
        });
    }

    if config.auto_attend_enabled && !RE_HTTP_URL.is_match(&config.webdriver_url) {
        return Err(ConfigError::Invalid {
            key: "webdriver_url",
            reason: format!("expected an http(s) URL, got '{}'", config.webdriver_url),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_interval(secs: u64) -> FarmerConfig {
        FarmerConfig {
            check_interval_seconds: secs,
            ..FarmerConfig::default()
        }
    }

    #[test]
    fn absolute_floor_applies_to_short_lists() {
        assert_eq!(minimum_check_interval(0), 15);
        assert_eq!(minimum_check_interval(2), 15);
        assert_eq!(minimum_check_interval(3), 15);
        assert_eq!(minimum_check_interval(4), 20);
    }

    #[test]
    fn two_streamers_reject_ten_accept_fifteen() {
        assert!(matches!(
            validate(&with_interval(10), 2),
            Err(ConfigError::IntervalTooShort {
                interval: 10,
                minimum: 15
            })
        ));
        assert!(validate(&with_interval(15), 2).is_ok());
    }

    #[test]
    fn dynamic_floor_grows_with_the_list() {
        assert!(validate(&with_interval(40), 10).is_err());
        assert!(validate(&with_interval(50), 10).is_ok());
    }

    #[test]
    fn webdriver_url_checked_only_when_attending() {
        let mut config = with_interval(15);
        config.webdriver_url = "localhost:9515".into();
        assert!(validate(&config, 1).is_err());

        config.auto_attend_enabled = false;
        assert!(validate(&config, 1).is_ok());
    }
}
