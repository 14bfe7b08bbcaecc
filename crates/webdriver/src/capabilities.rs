//! Session capabilities sent with `POST /session`.

use serde_json::{Value, json};

/// Browser capabilities for a new session.
#[derive(Debug, Clone)]
pub struct Capabilities {
    browser_name: String,
    args: Vec<String>,
}

impl Capabilities {
    /// Chrome/Chromium with the given command-line arguments.
    pub fn chrome<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            browser_name: "chrome".into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn browser_name(&self) -> &str {
        &self.browser_name
    }

    /// Request body for `POST /session`.
    pub fn to_request(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": self.browser_name,
                    "goog:chromeOptions": {
                        "args": self.args,
                        "excludeSwitches": ["enable-logging"],
                    },
                }
            }
        })
    }
}
