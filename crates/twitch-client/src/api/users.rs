use url::Url;

use super::*;
use crate::{AppToken, TwitchError};

impl TwitchApiClient {
    /// Get user profile by login name.
    pub async fn get_user_by_login(
        &self,
        token: &AppToken,
        login: &str,
    ) -> Result<TwitchUser, TwitchError> {
        let url = Url::parse_with_params(&format!("{HELIX_BASE}/users"), &[("login", login)])?;
        let body = self.authenticated_get(url.as_str(), token).await?;
        let resp: HelixResponse<TwitchUser> = serde_json::from_str(&body)?;

        resp.data
            .into_iter()
            .next()
            .ok_or_else(|| TwitchError::ApiError {
                status: 404,
                message: format!("User not found: {login}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_without_optional_fields() {
        let body = r#"{
          "data": [{
            "id": "141981764",
            "login": "twitchdev",
            "display_name": "TwitchDev",
            "type": "",
            "profile_image_url": "https://static-cdn.jtvnw.net/jtv_user_pictures/8a6381c7.png"
          }]
        }"#;

        let parsed: HelixResponse<TwitchUser> = serde_json::from_str(body).unwrap();
        let user = &parsed.data[0];
        assert_eq!(user.display_name, "TwitchDev");
        assert!(user.profile_image_url.ends_with(".png"));
        assert!(user.offline_image_url.is_empty());
    }
}
