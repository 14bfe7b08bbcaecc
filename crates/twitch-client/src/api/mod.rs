//! Twitch Helix REST API client.
//!
//! Provides typed access to the Helix endpoints needed to watch a list
//! of channels, with automatic Bearer token + Client-ID header injection.

mod request;
mod streams;
mod users;

pub mod models;

pub use models::{HelixResponse, StreamInfo, TwitchUser};

const HELIX_BASE: &str = "https://api.twitch.tv/helix";

/// Twitch Helix API client with automatic auth header injection.
pub struct TwitchApiClient {
    pub(super) http: reqwest::Client,
    pub(super) client_id: String,
}
