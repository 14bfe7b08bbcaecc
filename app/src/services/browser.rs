//! Browser tabs as the attendance actuator, driven over WebDriver.

use std::time::Duration;

use async_trait::async_trait;
use webdriver::{Capabilities, Session, WebDriverError, WindowHandle};

/// Handle of a tab opened for a streamer. Owned by the browser; runtime
/// state only refers to it.
pub type TabHandle = WindowHandle;

const CHANNEL_BASE_URL: &str = "https://www.twitch.tv";

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error(transparent)]
    Driver(#[from] WebDriverError),

    #[error("no browser session is open")]
    NoSession,
}

impl BrowserError {
    /// The tab was closed behind our back; the browser itself is fine.
    pub fn is_tab_gone(&self) -> bool {
        matches!(self, Self::Driver(e) if e.is_window_gone())
    }
}

/// Tab lifecycle used by the reconciliation loop. Methods take
/// `&mut self`, so tab commands are issued one at a time.
#[async_trait(?Send)]
pub trait Browser {
    /// Whether the managed browser session still exists. False after the
    /// user closed the browser window.
    async fn is_alive(&mut self) -> bool;

    /// Open a tab on the channel page of `login`, starting the browser if
    /// needed, and focus it.
    async fn open_tab(&mut self, login: &str) -> Result<TabHandle, BrowserError>;

    async fn switch_to(&mut self, tab: &TabHandle) -> Result<(), BrowserError>;

    async fn close_tab(&mut self, tab: &TabHandle) -> Result<(), BrowserError>;
}

pub fn channel_url(login: &str) -> String {
    format!("{CHANNEL_BASE_URL}/{login}")
}

/// Chrome driven through a WebDriver server such as chromedriver.
///
/// The session is created on the first `open_tab` and discarded as soon as
/// the driver reports it gone; the next `open_tab` starts a fresh one. A
/// single missing tab never discards the session.
pub struct WebDriverBrowser {
    endpoint: String,
    capabilities: Capabilities,
    timeout: Option<Duration>,
    session: Option<Session>,
    /// A fresh session has one blank window; the first tab reuses it.
    blank_window: bool,
}

impl WebDriverBrowser {
    pub fn new(endpoint: impl Into<String>, args: &[String], timeout: Option<Duration>) -> Self {
        Self {
            endpoint: endpoint.into(),
            capabilities: Capabilities::chrome(args.iter().cloned()),
            timeout,
            session: None,
            blank_window: false,
        }
    }

    async fn ensure_session(&mut self) -> Result<(), BrowserError> {
        if self.session.is_none() {
            let session = Session::start(&self.endpoint, &self.capabilities, self.timeout).await?;
            tracing::info!("Browser initiated!");
            self.session = Some(session);
            self.blank_window = true;
        }
        Ok(())
    }

    /// Drop the session, asking the driver to end it. The driver usually
    /// rejects the quit when the browser is already gone.
    async fn discard_session(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.quit().await {
                tracing::debug!("Ending the lost browser session failed: {e}");
            }
        }
    }

    async fn discard_session_if_lost(&mut self, err: &BrowserError) {
        if let BrowserError::Driver(e) = err {
            if e.is_session_lost() {
                tracing::debug!("Browser session lost, it will be recreated on next open");
                self.discard_session().await;
            }
        }
    }

    async fn try_open(&mut self, login: &str) -> Result<TabHandle, BrowserError> {
        self.ensure_session().await?;
        let reuse = self.blank_window;
        self.blank_window = false;
        let session = self.session.as_mut().ok_or(BrowserError::NoSession)?;
        let handle = if reuse {
            session.current_window().await?
        } else {
            // New tabs need a live current window, and the user may have
            // closed the one we were on.
            let open = session.window_handles().await?;
            if let Some(first) = open.first() {
                session.switch_to(first).await?;
            }
            session.new_tab().await?
        };
        session.navigate(&channel_url(login)).await?;
        Ok(handle)
    }

    async fn try_close(&mut self, tab: &TabHandle) -> Result<(), BrowserError> {
        let session = self.session.as_mut().ok_or(BrowserError::NoSession)?;
        session.switch_to(tab).await?;
        let remaining = session.close_window().await?;
        if let Some(next) = remaining.first() {
            session.switch_to(next).await?;
        } else {
            // Closing the last window ends the browser.
            self.discard_session().await;
        }
        Ok(())
    }

    /// End the browser session, if any.
    pub async fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.quit().await {
                tracing::warn!("Failed to close the browser: {e}");
            }
        }
    }
}

#[async_trait(?Send)]
impl Browser for WebDriverBrowser {
    async fn is_alive(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let handles = session.window_handles().await;
        match handles {
            Ok(handles) if !handles.is_empty() => true,
            Ok(_) => {
                self.discard_session().await;
                false
            }
            Err(e) => {
                tracing::debug!("Browser liveness check failed: {e}");
                self.discard_session().await;
                false
            }
        }
    }

    async fn open_tab(&mut self, login: &str) -> Result<TabHandle, BrowserError> {
        let result = self.try_open(login).await;
        if let Err(e) = &result {
            self.discard_session_if_lost(e).await;
        }
        result
    }

    async fn switch_to(&mut self, tab: &TabHandle) -> Result<(), BrowserError> {
        let session = self.session.as_mut().ok_or(BrowserError::NoSession)?;
        let result = session.switch_to(tab).await.map_err(BrowserError::from);
        if let Err(e) = &result {
            self.discard_session_if_lost(e).await;
        }
        result
    }

    async fn close_tab(&mut self, tab: &TabHandle) -> Result<(), BrowserError> {
        let result = self.try_close(tab).await;
        if let Err(e) = &result {
            self.discard_session_if_lost(e).await;
        }
        result
    }
}
