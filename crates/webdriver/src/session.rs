//! A live WebDriver session and its window commands.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::protocol::{self, NewSession, NewWindow};
use crate::{Capabilities, WebDriverError, WindowHandle};

/// One browser session on a WebDriver server.
///
/// Commands take `&mut self`: a driver processes one command per session
/// at a time, so the borrow checker serializes them for us.
pub struct Session {
    http: reqwest::Client,
    base: Url,
    id: String,
}

impl Session {
    /// Start a new browser session on the driver at `endpoint`
    /// (e.g. `http://localhost:9515`). `timeout` bounds every command of
    /// the session, including this one.
    pub async fn start(
        endpoint: &str,
        capabilities: &Capabilities,
        timeout: Option<Duration>,
    ) -> Result<Self, WebDriverError> {
        // The driver is a local process; never route it through a proxy.
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        let mut base = Url::parse(endpoint)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let resp = http
            .post(base.join("session")?)
            .json(&capabilities.to_request())
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        let created: NewSession = protocol::decode(status, &body)?;

        tracing::info!(
            session_id = %created.session_id,
            browser = capabilities.browser_name(),
            "WebDriver session started"
        );

        Ok(Self {
            http,
            base,
            id: created.session_id,
        })
    }

    fn command_url(&self, path: &str) -> Result<Url, WebDriverError> {
        let suffix = if path.is_empty() {
            format!("session/{}", self.id)
        } else {
            format!("session/{}/{path}", self.id)
        };
        Ok(self.base.join(&suffix)?)
    }

    async fn send<T: DeserializeOwned>(
        &mut self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, WebDriverError> {
        let url = self.command_url(path)?;
        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        protocol::decode(status, &text)
    }

    /// Navigate the current window to `url`.
    pub async fn navigate(&mut self, url: &str) -> Result<(), WebDriverError> {
        let _: Value = self
            .send(reqwest::Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    /// Handle of the window commands currently apply to.
    pub async fn current_window(&mut self) -> Result<WindowHandle, WebDriverError> {
        let handle: String = self.send(reqwest::Method::GET, "window", None).await?;
        Ok(WindowHandle(handle))
    }

    /// All open windows of this session.
    pub async fn window_handles(&mut self) -> Result<Vec<WindowHandle>, WebDriverError> {
        let handles: Vec<String> = self
            .send(reqwest::Method::GET, "window/handles", None)
            .await?;
        Ok(handles.into_iter().map(WindowHandle).collect())
    }

    /// Open a new tab and make it current.
    pub async fn new_tab(&mut self) -> Result<WindowHandle, WebDriverError> {
        let created: NewWindow = self
            .send(
                reqwest::Method::POST,
                "window/new",
                Some(json!({ "type": "tab" })),
            )
            .await?;
        let handle = WindowHandle(created.handle);
        self.switch_to(&handle).await?;
        Ok(handle)
    }

    /// Make `handle` the current window.
    pub async fn switch_to(&mut self, handle: &WindowHandle) -> Result<(), WebDriverError> {
        let _: Value = self
            .send(
                reqwest::Method::POST,
                "window",
                Some(json!({ "handle": handle.0 })),
            )
            .await?;
        Ok(())
    }

    /// Close the current window. Returns the handles still open.
    pub async fn close_window(&mut self) -> Result<Vec<WindowHandle>, WebDriverError> {
        let remaining: Vec<String> = self.send(reqwest::Method::DELETE, "window", None).await?;
        Ok(remaining.into_iter().map(WindowHandle).collect())
    }

    /// End the session, closing the browser.
    pub async fn quit(mut self) -> Result<(), WebDriverError> {
        let _: Value = self.send(reqwest::Method::DELETE, "", None).await?;
        tracing::info!(session_id = %self.id, "WebDriver session closed");
        Ok(())
    }
}
