//! The reconciliation loop.
//!
//! Every tick the loop re-reads the streamer list, asks the live-status
//! source about each listed login and moves that streamer's runtime state
//! along:
//!
//! - live while the operator is away (and auto-attend is on): open a tab,
//!   or focus the one already open;
//! - live while the operator is present: notify once;
//! - not live twice in a row: close the tab and forget the streamer.
//!
//! All state lives in [`Reconciler`]; collaborators are only queried or
//! told to act.

mod schedule;
mod state;


use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use crate::config::FarmerConfig;
use crate::live_status::{LiveStatusSource, LiveStream};
use crate::services::browser::{Browser, TabHandle};
use crate::services::idle::IdleSource;
use crate::services::notify::Notifier;
use crate::streamers::read_streamers;

pub use schedule::TickSchedule;
pub use state::{Attendance, StreamerState};

/// The parts of the configuration the loop reads. Fixed for the lifetime
/// of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub check_interval: Duration,
    pub idle_threshold: Duration,
    pub notifications_enabled: bool,
    pub auto_attend_enabled: bool,
}

impl From<&FarmerConfig> for LoopSettings {
    fn from(config: &FarmerConfig) -> Self {
        Self {
            check_interval: config.check_interval(),
            idle_threshold: config.idle_threshold(),
            notifications_enabled: config.notifications_enabled,
            auto_attend_enabled: config.auto_attend_enabled,
        }
    }
}

/// What to do with one streamer in one tick. At most one attendance
/// action is taken per streamer per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step<'a> {
    Nothing,
    OpenTab,
    Notify(&'a LiveStream),
    /// Live, but no action applies; remember the streamer as `None`.
    Track,
    SwitchTab(TabHandle),
    MarkPendingOffline,
    TearDown,
}

/// Transition table for one streamer.
///
/// `attend` is true when the operator is idle past the threshold and
/// auto-attend is enabled. A pending-offline flag on a live streamer has
/// already been cleared by the caller.
fn plan<'a>(
    current: Option<&StreamerState>,
    observed: Option<&'a LiveStream>,
    attend: bool,
    notifications_enabled: bool,
) -> Step<'a> {
    match (current, observed) {
        (None, None) => Step::Nothing,
        (None, Some(_)) if attend => Step::OpenTab,
        (None, Some(stream)) if notifications_enabled => Step::Notify(stream),
        (None, Some(_)) => Step::Track,
        (Some(state), Some(_)) => match &state.mode {
            Attendance::None | Attendance::Notified if attend => Step::OpenTab,
            Attendance::None | Attendance::Notified => Step::Nothing,
            Attendance::BrowserTab(tab) if attend => Step::SwitchTab(tab.clone()),
            Attendance::BrowserTab(_) => Step::Nothing,
        },
        (Some(state), None) if state.pending_offline => Step::TearDown,
        (Some(_), None) => Step::MarkPendingOffline,
    }
}

/// Owns the per-streamer runtime state and drives the collaborators.
pub struct Reconciler<S, B, N, I> {
    status: S,
    browser: B,
    notifier: N,
    idle: I,
    settings: LoopSettings,
    schedule: TickSchedule,
    states: HashMap<String, StreamerState>,
}

impl<S, B, N, I> Reconciler<S, B, N, I>
where
    S: LiveStatusSource,
    B: Browser,
    N: Notifier,
    I: IdleSource,
{
    pub fn new(status: S, browser: B, notifier: N, idle: I, settings: LoopSettings) -> Self {
        Self {
            status,
            browser,
            notifier,
            idle,
            schedule: TickSchedule::new(settings.check_interval),
            settings,
            states: HashMap::new(),
        }
    }

    pub fn states(&self) -> &HashMap<String, StreamerState> {
        &self.states
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    /// Tick forever, re-reading the streamer list from `list_path` on each
    /// tick. Only returns when the surrounding task is dropped.
    pub async fn run(&mut self, list_path: &Path) {
        tracing::info!(
            interval_secs = self.schedule.interval().as_secs(),
            "Starting reconciliation loop"
        );
        loop {
            let started = Instant::now();
            let logins = read_streamers(list_path);
            self.tick(&logins).await;

            let (next, overran) = self.schedule.deadline_after(started, Instant::now());
            if overran {
                tracing::warn!(
                    elapsed_secs = started.elapsed().as_secs(),
                    "Checking streamers took longer than the check interval"
                );
            }
            sleep_until(next).await;
        }
    }

    /// One pass over `logins`.
    pub async fn tick(&mut self, logins: &[String]) {
        self.forget_unlisted(logins).await;
        self.check_browser().await;

        let idle_secs = self.idle.seconds_idle().await;
        let attend = self.settings.auto_attend_enabled
            && idle_secs >= self.settings.idle_threshold.as_secs_f64();
        tracing::debug!(idle_secs, attend, "Tick");

        let mut seen = HashSet::new();
        for login in logins {
            if !seen.insert(login.as_str()) {
                continue;
            }
            self.reconcile(login, attend).await;
        }
    }

    async fn reconcile(&mut self, login: &str, attend: bool) {
        let observed = match self.status.query_live(login).await {
            Ok(observed) => observed,
            Err(e) => {
                tracing::warn!(login, "Could not get the status of {login}: {e}");
                return;
            }
        };

        if observed.is_some() {
            tracing::info!("{login} is live!");
            if let Some(state) = self.states.get_mut(login) {
                state.pending_offline = false;
            }
        }

        let step = plan(
            self.states.get(login),
            observed.as_ref(),
            attend,
            self.settings.notifications_enabled,
        );
        match step {
            Step::Nothing => {}
            Step::OpenTab => self.open_tab(login).await,
            Step::Notify(stream) => self.notify(login, stream).await,
            Step::Track => {
                self.states
                    .insert(login.to_string(), StreamerState::new(Attendance::None));
            }
            Step::SwitchTab(tab) => match self.browser.switch_to(&tab).await {
                Ok(()) => {}
                Err(e) if e.is_tab_gone() => {
                    // Closed by hand; reopened on the next idle tick.
                    tracing::info!(login, tab = %tab, "The tab for {login} was closed");
                    if let Some(state) = self.states.get_mut(login) {
                        state.mode = Attendance::None;
                    }
                }
                Err(e) => tracing::warn!(login, "Could not switch to the tab for {login}: {e}"),
            },
            Step::MarkPendingOffline => {
                if let Some(state) = self.states.get_mut(login) {
                    state.pending_offline = true;
                }
                tracing::info!(
                    "Stream not found for {login}, retrying in {} seconds!",
                    self.settings.check_interval.as_secs()
                );
            }
            Step::TearDown => {
                tracing::info!("{login} is not live.");
                self.tear_down(login).await;
            }
        }
    }

    async fn open_tab(&mut self, login: &str) {
        match self.browser.open_tab(login).await {
            Ok(tab) => {
                tracing::info!(login, tab = %tab, "Opened stream tab");
                self.states.insert(
                    login.to_string(),
                    StreamerState::new(Attendance::BrowserTab(tab)),
                );
            }
            Err(e) => tracing::error!(login, "Could not open a tab for {login}: {e}"),
        }
    }

    async fn notify(&mut self, login: &str, stream: &LiveStream) {
        match self.notifier.notify(&stream.broadcaster, &stream.title).await {
            Ok(()) => {
                tracing::info!(login, "Sent live notification");
                self.states
                    .insert(login.to_string(), StreamerState::new(Attendance::Notified));
            }
            Err(e) => tracing::error!(login, "Could not send a notification for {login}: {e}"),
        }
    }

    /// Remove the entry, closing its tab first. The entry goes even if the
    /// close fails.
    async fn tear_down(&mut self, login: &str) {
        let Some(state) = self.states.remove(login) else {
            return;
        };
        if let Attendance::BrowserTab(tab) = state.mode {
            if let Err(e) = self.browser.close_tab(&tab).await {
                tracing::error!(login, "Could not close the tab for {login}! {e}");
            }
        }
    }

    async fn forget_unlisted(&mut self, logins: &[String]) {
        let listed: HashSet<&str> = logins.iter().map(String::as_str).collect();
        let unlisted: Vec<String> = self
            .states
            .keys()
            .filter(|login| !listed.contains(login.as_str()))
            .cloned()
            .collect();
        for login in unlisted {
            tracing::info!(login = %login, "No longer in the streamer list");
            self.tear_down(&login).await;
        }
    }

    /// Drop every tab handle when the browser went away. Only asks the
    /// browser while some entry holds a tab, so a lost browser is reported
    /// once.
    async fn check_browser(&mut self) {
        if !self.states.values().any(|state| state.tab().is_some()) {
            return;
        }
        if self.browser.is_alive().await {
            return;
        }

        tracing::warn!("The browser was closed, tabs will be reopened when needed");
        for state in self.states.values_mut() {
            if matches!(state.mode, Attendance::BrowserTab(_)) {
                state.mode = Attendance::None;
            }
        }
    }
}
