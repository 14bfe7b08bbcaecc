//! App access token acquisition for Twitch.
//!
//! Uses the OAuth client-credentials grant: no user interaction, no
//! refresh token, just a bearer token valid for the app's own requests.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;

use crate::{AppToken, TwitchError};

const OAUTH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Twitch OAuth token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[allow(dead_code)]
    token_type: String,
}

/// Twitch OAuth error response.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

/// Obtains app access tokens with the application's client credentials.
pub struct TwitchAuth {
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
}

impl TwitchAuth {
    pub fn new(client_id: String, client_secret: String, timeout: Option<Duration>) -> Self {
        Self {
            client_id,
            client_secret,
            http: crate::http_client(timeout),
        }
    }

    /// Request a fresh app access token.
    pub async fn app_token(&self) -> Result<AppToken, TwitchError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let resp = self.http.post(OAUTH_TOKEN_URL).form(&params).send().await?;

        let status = resp.status();
        let body = resp.text().await?;
        parse_token_response(status.as_u16(), &body, Utc::now().timestamp())
    }
}

/// Parse the token endpoint body into an [`AppToken`].
fn parse_token_response(status: u16, body: &str, now: i64) -> Result<AppToken, TwitchError> {
    if !(200..300).contains(&status) {
        let err: ErrorResponse = serde_json::from_str(body).unwrap_or(ErrorResponse {
            status: Some(status),
            message: Some(body.to_string()),
        });
        return Err(TwitchError::AuthFailed(format!(
            "{}: {}",
            err.status.unwrap_or(status),
            err.message.unwrap_or_default()
        )));
    }

    let token_resp: TokenResponse = serde_json::from_str(body)
        .map_err(|e| TwitchError::AuthFailed(format!("failed to parse response: {e}")))?;

    Ok(AppToken {
        access_token: token_resp.access_token,
        expires_at: now + token_resp.expires_in,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_successful_token_response() {
        let body = r#"{"access_token":"jostpf5q0uzmxmkba9iyug38kjtgh","expires_in":5011271,"token_type":"bearer"}"#;
        let token = parse_token_response(200, body, 1_000).unwrap();
        assert_eq!(token.access_token, "jostpf5q0uzmxmkba9iyug38kjtgh");
        assert_eq!(token.expires_at, 1_000 + 5_011_271);
    }

    #[test]
    fn rejected_credentials_become_auth_failed() {
        let body = r#"{"status":400,"message":"invalid client secret"}"#;
        let err = parse_token_response(400, body, 0).unwrap_err();
        match err {
            TwitchError::AuthFailed(msg) => assert!(msg.contains("invalid client secret")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        let err = parse_token_response(503, "upstream unavailable", 0).unwrap_err();
        assert!(err.to_string().contains("upstream unavailable"));
    }
}
