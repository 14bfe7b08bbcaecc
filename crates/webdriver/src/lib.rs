//! Minimal W3C WebDriver client.
//!
//! Talks JSON over HTTP to a running driver (chromedriver, geckodriver)
//! and exposes the handful of window commands needed to keep a set of
//! tabs open: create a session, navigate, open/switch/close tabs and
//! list the open windows.

pub mod capabilities;
mod protocol;
mod session;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use capabilities::Capabilities;
pub use session::Session;

/// Opaque identifier of a browser window or tab within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub String);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unified error type for the webdriver crate.
#[derive(Debug, thiserror::Error)]
pub enum WebDriverError {
    #[error("HTTP request to driver failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Error reported by the driver in the W3C error envelope.
    #[error("WebDriver error `{error}` (status {status}): {message}")]
    Command {
        status: u16,
        error: String,
        message: String,
    },
}

impl WebDriverError {
    /// True when the whole session is gone, which is what happens after
    /// the user closes the browser or the driver exits.
    pub fn is_session_lost(&self) -> bool {
        match self {
            Self::Command { error, .. } => error == "invalid session id",
            Self::Http(e) => e.is_connect(),
            _ => false,
        }
    }

    /// True when a single window or tab no longer exists. The session
    /// itself may still be alive.
    pub fn is_window_gone(&self) -> bool {
        matches!(self, Self::Command { error, .. } if error == "no such window")
    }
}
