//! File names, limits and default values.

/// Runtime configuration written by the setup wizard.
pub const CONFIG_FILE: &str = "config.json";
/// Twitch application credentials.
pub const ENV_FILE: &str = ".env";
/// Scratch file carrying the chosen list name between setup runs.
pub const SETUP_STATE_FILE: &str = "fts.json";
pub const DEFAULT_STREAMER_LIST: &str = "streamers.txt";
pub const LOGS_DIR: &str = "logs";
pub const PROFILE_IMAGE_DIR: &str = "pfp";

/// Absolute floor for the polling interval. Anything faster spams the API.
pub const MIN_CHECK_INTERVAL_SECS: u64 = 15;
/// Each listed streamer adds this much to the dynamic interval floor.
pub const SECS_PER_STREAMER: u64 = 5;

pub const DEFAULT_IDLE_THRESHOLD_SECS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const DEFAULT_PROFILE_IMAGE_MAX_AGE_DAYS: u64 = 30;

/// Contents of a freshly created streamer list.
pub const DEFAULT_STREAMER_LINES: &[&str] = &[
    "# Add streamer names on separate lines, like this:",
    "MattEU",
    "lirik",
    "shxtou",
];

pub(crate) fn check_interval() -> u64 {
    MIN_CHECK_INTERVAL_SECS
}

pub(crate) fn idle_threshold() -> u64 {
    DEFAULT_IDLE_THRESHOLD_SECS
}

pub(crate) fn enabled() -> bool {
    true
}

pub(crate) fn active_list() -> String {
    DEFAULT_STREAMER_LIST.to_string()
}

pub(crate) fn request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

pub(crate) fn webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.to_string()
}

pub(crate) fn browser_args() -> Vec<String> {
    vec!["--mute-audio".to_string()]
}

pub(crate) fn profile_image_max_age() -> u64 {
    DEFAULT_PROFILE_IMAGE_MAX_AGE_DAYS
}
