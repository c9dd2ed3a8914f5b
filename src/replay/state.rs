//! Replay session state machine

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Phase of a replay session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayState {
    #[default]
    Idle,
    CapturingSnapshot,
    SeekingAndPlaying,
    Waiting,
    Restoring,
    Done,
}

impl ReplayState {
    /// Whether the session may move from `self` to `next`
    ///
    /// Every phase after the snapshot can fall through to `Restoring`, and
    /// `Restoring` is the only way to reach `Done`.
    pub fn can_advance_to(self, next: ReplayState) -> bool {
        use ReplayState::*;
        matches!(
            (self, next),
            (Idle, CapturingSnapshot)
                | (CapturingSnapshot, SeekingAndPlaying)
                | (CapturingSnapshot, Restoring)
                | (SeekingAndPlaying, Waiting)
                | (SeekingAndPlaying, Restoring)
                | (Waiting, Restoring)
                | (Restoring, Done)
                | (Done, Idle)
        )
    }

    /// A session is running between the snapshot and completion
    pub fn is_active(self) -> bool {
        !matches!(self, ReplayState::Idle | ReplayState::Done)
    }
}

impl fmt::Display for ReplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplayState::Idle => "idle",
            ReplayState::CapturingSnapshot => "capturing-snapshot",
            ReplayState::SeekingAndPlaying => "seeking-and-playing",
            ReplayState::Waiting => "waiting",
            ReplayState::Restoring => "restoring",
            ReplayState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Current phase plus the phases the latest session went through
#[derive(Debug, Default)]
pub(super) struct StateLog {
    current: ReplayState,
    history: Vec<ReplayState>,
}

pub(super) type SharedStateLog = Arc<Mutex<StateLog>>;

impl StateLog {
    pub(super) fn current(&self) -> ReplayState {
        self.current
    }

    pub(super) fn history(&self) -> Vec<ReplayState> {
        self.history.clone()
    }

    /// Start recording a fresh session from `Idle`
    pub(super) fn begin(&mut self) {
        if self.current.is_active() {
            warn!(state = %self.current, "Starting a replay while another is active");
        }
        self.current = ReplayState::Idle;
        self.history = vec![ReplayState::Idle];
    }

    pub(super) fn advance(&mut self, next: ReplayState) {
        if !self.current.can_advance_to(next) {
            warn!(from = %self.current, to = %next, "Unexpected replay state transition");
        }
        debug!(from = %self.current, to = %next, "Replay state");
        self.current = next;
        self.history.push(next);
    }
}

/// Advance the shared log, recovering it if a panic poisoned the mutex
pub(super) fn advance(log: &SharedStateLog, next: ReplayState) {
    match log.lock() {
        Ok(mut log) => log.advance(next),
        Err(poisoned) => poisoned.into_inner().advance(next),
    }
}
