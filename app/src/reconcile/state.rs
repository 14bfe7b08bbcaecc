use crate::services::browser::TabHandle;

/// How a tracked streamer is being attended to. The tab handle only exists
/// in the `BrowserTab` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attendance {
    /// Live, but neither a tab nor a notification is active.
    None,
    Notified,
    BrowserTab(TabHandle),
}

/// Runtime state of a streamer that has been observed live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamerState {
    pub mode: Attendance,
    /// Set after one "not live" observation; a second one tears down.
    pub pending_offline: bool,
}

impl StreamerState {
    pub fn new(mode: Attendance) -> Self {
        Self {
            mode,
            pending_offline: false,
        }
    }

    pub fn tab(&self) -> Option<&TabHandle> {
        match &self.mode {
            Attendance::BrowserTab(tab) => Some(tab),
            _ => None,
        }
    }
}
