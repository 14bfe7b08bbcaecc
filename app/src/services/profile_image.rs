//! On-disk cache of streamer profile pictures, used as notification icons.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ProfileImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("image download returned status {0}")]
    Status(u16),
}

/// Time-stamped file cache under `<data_dir>/pfp`.
#[derive(Debug, Clone)]
pub struct ProfileImages {
    dir: PathBuf,
    max_age: Duration,
    http: reqwest::Client,
}

impl ProfileImages {
    pub fn new(dir: PathBuf, max_age_days: u64, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            dir,
            max_age: Duration::from_secs(max_age_days.saturating_mul(SECS_PER_DAY)),
            http: builder.build().unwrap_or_default(),
        }
    }

    pub fn path_for(&self, login: &str) -> PathBuf {
        self.dir
            .join(format!("profile_image_{}.png", login.to_lowercase()))
    }

    /// Cached image for `login`, if one is on disk.
    pub fn existing(&self, login: &str) -> Option<PathBuf> {
        let path = self.path_for(login);
        path.is_file().then_some(path)
    }

    /// Remove an expired image. Returns true when a download is needed.
    pub fn needs_download(&self, login: &str) -> Result<bool, ProfileImageError> {
        let path = self.path_for(login);
        let modified = match std::fs::metadata(&path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        };

        if is_expired(modified, SystemTime::now(), self.max_age) {
            std::fs::remove_file(&path)?;
            tracing::info!(login, "Deleted old profile image");
            return Ok(true);
        }
        Ok(false)
    }

    /// Download `image_url` into the cache slot of `login`.
    pub async fn download(&self, login: &str, image_url: &str) -> Result<PathBuf, ProfileImageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let resp = self.http.get(image_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProfileImageError::Status(status.as_u16()));
        }
        let bytes = resp.bytes().await?;

        let path = self.path_for(login);
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!(login, bytes = bytes.len(), "Downloaded profile image");
        Ok(path)
    }
}

/// Whether a file last modified at `modified` is older than `max_age`.
/// Timestamps in the future are never expired.
pub fn is_expired(modified: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    now.duration_since(modified)
        .map(|age| age > max_age)
        .unwrap_or(false)
}
