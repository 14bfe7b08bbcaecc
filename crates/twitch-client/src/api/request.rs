use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use super::*;
use crate::{AppToken, TwitchError};

impl TwitchApiClient {
    /// Create a client. `timeout` bounds every request; expiry surfaces as
    /// [`TwitchError::Timeout`].
    pub fn new(client_id: String, timeout: Option<Duration>) -> Self {
        Self {
            http: crate::http_client(timeout),
            client_id,
        }
    }

    /// Build auth headers from the given token.
    fn auth_headers(&self, token: &AppToken) -> Result<HeaderMap, TwitchError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", token.access_token);
        let bearer = HeaderValue::from_str(&bearer)
            .map_err(|_| TwitchError::AuthFailed("access token is not a valid header".into()))?;
        let client_id = HeaderValue::from_str(&self.client_id)
            .map_err(|_| TwitchError::AuthFailed("client id is not a valid header".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("Client-Id", client_id);
        Ok(headers)
    }

    /// Execute a GET request with auth headers.
    ///
    /// A 401 is returned as an `ApiError`; the caller decides whether to
    /// fetch a new token and retry.
    pub(super) async fn authenticated_get(
        &self,
        url: &str,
        token: &AppToken,
    ) -> Result<String, TwitchError> {
        let headers = self.auth_headers(token)?;
        let resp = self.http.get(url).headers(headers).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(url, "Got 401, caller should refresh token and retry");
        }

        if !status.is_success() {
            return Err(TwitchError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }
}
