use std::fmt;

use crate::error::SessionError;

// client session state machine
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Identifying,
    Syncing,
    Active,
    Restarting,
    Closing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Connecting => "connecting",
            SessionState::Identifying => "identifying",
            SessionState::Syncing => "syncing",
            SessionState::Active => "active",
            SessionState::Restarting => "restarting",
            SessionState::Closing => "closing",
        };
        f.write_str(s)
    }
}

// what to do after dispatching one inbound msg
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Restart,
}

// how a single run of the state machine ended
#[derive(Debug)]
pub enum RunOutcome {
    Restart,
    Closed(SessionError),
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub runs: u64,
    pub restarts: u64,
    pub failures: u64,
}
