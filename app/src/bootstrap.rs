//! Startup: data directory, configuration, collaborators.

use std::path::{Path, PathBuf};

use crate::config::defaults::{CONFIG_FILE, PROFILE_IMAGE_DIR};
use crate::config::{Credentials, FarmerConfig, credentials, validate};
use crate::live_status::HelixStatusSource;
use crate::reconcile::{LoopSettings, Reconciler};
use crate::services::browser::WebDriverBrowser;
use crate::services::idle::SystemIdle;
use crate::services::notify::DesktopNotifier;
use crate::services::profile_image::ProfileImages;
use crate::streamers::read_streamers;

/// The loop as wired up in production.
pub type FarmerLoop = Reconciler<HelixStatusSource, WebDriverBrowser, DesktopNotifier, SystemIdle>;

/// Everything the loop needs, loaded and validated.
#[derive(Debug)]
pub struct Foundation {
    pub data_dir: PathBuf,
    pub config: FarmerConfig,
    pub credentials: Credentials,
    pub list_path: PathBuf,
}

/// Determine the data directory.
/// Priority: `--data-dir` / POINT_FARMER_DATA_DIR > current directory.
pub fn data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load and validate configuration (fatal on error).
pub fn init_foundation(dir: &Path) -> Result<Foundation, anyhow::Error> {
    let config = FarmerConfig::load(&dir.join(CONFIG_FILE))?;
    let list_path = config.streamer_list_path(dir);

    let streamers = read_streamers(&list_path);
    if streamers.is_empty() {
        tracing::warn!(path = %list_path.display(), "The streamer list is empty");
    }
    validate(&config, streamers.len())?;

    let credentials = credentials::load(dir)?;

    tracing::info!(
        streamers = streamers.len(),
        interval_secs = config.check_interval_seconds,
        "Settings loaded"
    );
    Ok(Foundation {
        data_dir: dir.to_path_buf(),
        config,
        credentials,
        list_path,
    })
}

/// Build the collaborators and the loop. Authentication failures are
/// logged; the token is requested again on the next status query.
pub async fn build_loop(foundation: &Foundation) -> FarmerLoop {
    let config = &foundation.config;
    let timeout = config.request_timeout();
    let images = ProfileImages::new(
        foundation.data_dir.join(PROFILE_IMAGE_DIR),
        config.profile_image_max_age_days,
        timeout,
    );

    let status = HelixStatusSource::new(&foundation.credentials, timeout, Some(images.clone()));
    if let Err(e) = status.authenticate().await {
        tracing::error!("Twitch authentication failed: {e}");
    }

    let browser = WebDriverBrowser::new(
        config.webdriver_url.clone(),
        &config.browser_args,
        timeout,
    );
    let notifier = DesktopNotifier::new(Some(images));

    Reconciler::new(
        status,
        browser,
        notifier,
        SystemIdle::default(),
        LoopSettings::from(config),
    )
}
