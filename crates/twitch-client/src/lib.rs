//! Twitch integration client library.
//!
//! Provides app-access-token authentication (client-credentials grant)
//! and a small REST client over the Helix endpoints used to watch
//! channels go live.

pub mod api;
pub mod auth;

use serde::{Deserialize, Serialize};

/// App access token obtained through the client-credentials grant.
///
/// App tokens carry no refresh token; a new one is requested when the
/// current one is about to expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppToken {
    pub access_token: String,
    pub expires_at: i64,
}

impl AppToken {
    /// Whether the token expires within `margin_secs` of `now` (unix seconds).
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        now >= self.expires_at - margin_secs
    }
}

/// Unified error type for the twitch-client crate.
#[derive(Debug, thiserror::Error)]
pub enum TwitchError {
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Twitch API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Connection timeout")]
    Timeout,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl From<reqwest::Error> for TwitchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

impl TwitchError {
    /// True for HTTP 401 responses, which mean the app token was revoked
    /// or expired early.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::ApiError { status: 401, .. })
    }
}

/// Build the shared HTTP client with an optional request timeout.
pub(crate) fn http_client(timeout: Option<std::time::Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!("Failed to build configured HTTP client, using defaults: {e}");
        reqwest::Client::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_expiry_margin() {
        let token = AppToken {
            access_token: "abc".into(),
            expires_at: 10_000,
        };
        assert!(!token.expires_within(9_000, 300));
        assert!(token.expires_within(9_700, 300));
        assert!(token.expires_within(10_001, 0));
    }

    #[test]
    fn unauthorized_only_matches_401() {
        let unauthorized = TwitchError::ApiError {
            status: 401,
            message: "invalid token".into(),
        };
        let forbidden = TwitchError::ApiError {
            status: 403,
            message: "forbidden".into(),
        };
        assert!(unauthorized.is_unauthorized());
        assert!(!forbidden.is_unauthorized());
        assert!(!TwitchError::Timeout.is_unauthorized());
    }
}
