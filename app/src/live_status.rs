//! Live-status queries: "is this channel broadcasting right now?"

use std::cell::RefCell;
use std::time::Duration;

use async_trait::async_trait;
use twitch_client::api::{StreamInfo, TwitchApiClient};
use twitch_client::auth::TwitchAuth;
use twitch_client::{AppToken, TwitchError};

use crate::config::Credentials;
use crate::services::profile_image::ProfileImages;

/// Renew the app token this long before it expires.
const TOKEN_RENEW_MARGIN_SECS: i64 = 5 * 60;

/// Who is broadcasting; enough to render a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcaster {
    pub login: String,
    pub display_name: String,
}

/// A channel that is currently live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveStream {
    pub title: String,
    pub broadcaster: Broadcaster,
}

impl From<StreamInfo> for LiveStream {
    fn from(info: StreamInfo) -> Self {
        Self {
            title: info.title,
            broadcaster: Broadcaster {
                login: info.user_login,
                display_name: info.user_name,
            },
        }
    }
}

/// The query failed; the channel's status is unknown, not offline.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("could not obtain an app access token: {0}")]
    Auth(#[source] TwitchError),

    #[error("stream query failed: {0}")]
    Query(#[source] TwitchError),
}

#[async_trait(?Send)]
pub trait LiveStatusSource {
    /// `Ok(Some(_))` when live, `Ok(None)` when offline.
    async fn query_live(&self, login: &str) -> Result<Option<LiveStream>, StatusError>;
}

/// Live status from the Twitch Helix API using an app access token.
///
/// When a channel is live its profile picture is refreshed in the image
/// cache so that notifications can show it.
pub struct HelixStatusSource {
    auth: TwitchAuth,
    api: TwitchApiClient,
    token: RefCell<Option<AppToken>>,
    images: Option<ProfileImages>,
}

impl HelixStatusSource {
    pub fn new(credentials: &Credentials, timeout: Option<Duration>, images: Option<ProfileImages>) -> Self {
        Self {
            auth: TwitchAuth::new(
                credentials.client_id.clone(),
                credentials.client_secret.clone(),
                timeout,
            ),
            api: TwitchApiClient::new(credentials.client_id.clone(), timeout),
            token: RefCell::new(None),
            images,
        }
    }

    /// Obtain the first token up front so bad credentials show up at startup.
    pub async fn authenticate(&self) -> Result<(), TwitchError> {
        let token = self.auth.app_token().await?;
        tracing::info!(expires_at = token.expires_at, "Obtained Twitch app access token");
        *self.token.borrow_mut() = Some(token);
        Ok(())
    }

    async fn usable_token(&self) -> Result<AppToken, StatusError> {
        let now = chrono::Utc::now().timestamp();
        let cached = self.token.borrow().clone();
        if let Some(token) = cached {
            if !token.expires_within(now, TOKEN_RENEW_MARGIN_SECS) {
                return Ok(token);
            }
            tracing::info!("App access token expiring soon, renewing");
        }

        let token = self.auth.app_token().await.map_err(StatusError::Auth)?;
        *self.token.borrow_mut() = Some(token.clone());
        Ok(token)
    }

    async fn fetch_stream(&self, login: &str) -> Result<Option<StreamInfo>, StatusError> {
        let token = self.usable_token().await?;
        match self.api.get_stream_by_login(&token, login).await {
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(login, "App token rejected, re-authenticating once");
                self.token.borrow_mut().take();
                let token = self.usable_token().await?;
                self.api
                    .get_stream_by_login(&token, login)
                    .await
                    .map_err(StatusError::Query)
            }
            other => other.map_err(StatusError::Query),
        }
    }

    /// Best effort: failures only cost the notification its icon.
    async fn refresh_profile_image(&self, login: &str) {
        let Some(images) = &self.images else {
            return;
        };
        match images.needs_download(login) {
            Ok(false) => return,
            Ok(true) => {}
            Err(e) => {
                tracing::warn!(login, "Failed to inspect cached profile image: {e}");
                return;
            }
        }

        let token = match self.usable_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(login, "Skipping profile image download: {e}");
                return;
            }
        };
        let user = match self.api.get_user_by_login(&token, login).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(login, "Failed to get user info: {e}");
                return;
            }
        };
        if let Err(e) = images.download(login, &user.profile_image_url).await {
            tracing::error!(login, "Failed to download profile image: {e}");
        }
    }
}

#[async_trait(?Send)]
impl LiveStatusSource for HelixStatusSource {
    async fn query_live(&self, login: &str) -> Result<Option<LiveStream>, StatusError> {
        let Some(info) = self.fetch_stream(login).await? else {
            return Ok(None);
        };
        self.refresh_profile_image(login).await;
        Ok(Some(LiveStream::from(info)))
    }
}
