use url::Url;

use super::*;
use crate::{AppToken, TwitchError};

impl TwitchApiClient {
    /// Get the current stream of a channel by login name.
    ///
    /// Returns `Ok(None)` when the channel is offline; an offline channel
    /// is a normal answer, not an error.
    pub async fn get_stream_by_login(
        &self,
        token: &AppToken,
        login: &str,
    ) -> Result<Option<StreamInfo>, TwitchError> {
        let url = streams_url(login)?;
        let body = self.authenticated_get(url.as_str(), token).await?;
        parse_stream_response(&body)
    }
}

pub(super) fn streams_url(login: &str) -> Result<Url, TwitchError> {
    let url = Url::parse_with_params(
        &format!("{HELIX_BASE}/streams"),
        &[("user_login", login), ("type", "all"), ("first", "20")],
    )?;
    Ok(url)
}

pub(super) fn parse_stream_response(body: &str) -> Result<Option<StreamInfo>, TwitchError> {
    let resp: HelixResponse<StreamInfo> = serde_json::from_str(body)?;
    Ok(resp.data.into_iter().find(StreamInfo::is_live))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_stream_is_returned() {
        let body = r#"{
          "data": [{
            "id": "s1",
            "user_id": "u1",
            "user_login": "lirik",
            "user_name": "LIRIK",
            "game_name": "game",
            "title": "chill stream",
            "viewer_count": 12,
            "started_at": "2026-02-16T00:00:00Z",
            "type": "live"
          }],
          "pagination": {}
        }"#;

        let stream = parse_stream_response(body).unwrap().expect("live stream");
        assert_eq!(stream.user_login, "lirik");
        assert_eq!(stream.user_name, "LIRIK");
        assert_eq!(stream.title, "chill stream");
    }

    #[test]
    fn empty_data_means_offline() {
        let body = r#"{"data": [], "pagination": {}}"#;
        assert!(parse_stream_response(body).unwrap().is_none());
    }

    #[test]
    fn non_live_entries_are_ignored() {
        let body = r#"{
          "data": [{
            "id": "s1",
            "user_id": "u1",
            "user_login": "lirik",
            "user_name": "LIRIK",
            "title": "",
            "type": ""
          }]
        }"#;
        assert!(parse_stream_response(body).unwrap().is_none());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(
            parse_stream_response("<html>"),
            Err(TwitchError::Json(_))
        ));
    }

    #[test]
    fn streams_url_encodes_login() {
        let url = streams_url("matt eu").unwrap();
        assert!(url.as_str().starts_with("https://api.twitch.tv/helix/streams?"));
        assert!(url.as_str().contains("user_login=matt+eu"));
        assert!(url.as_str().contains("type=all"));
    }
}
