//! Focus session state machine.
//!
//! A pure, synchronous machine with no internal clock: the owner calls
//! `tick()` once per second while the session runs and forwards interrupt
//! signals as they arrive. [`super::FocusController`] is the async owner
//! used by hosts.
//!
//! ## State Transitions
//!
//! ```text
//! Setup --start--> Running --tick to 0--> Completed --reset--> Setup
//!                  Running --interrupt--> Failed    --reset--> Setup
//!                  Running --give_up--> Setup
//! ```
//!
//! Every command returns `Some(Event)` when it changed the session and
//! `None` when it was ignored in the current phase.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::duration::{minutes_to_seconds, DEFAULT_MINUTES};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Running,
    Failed,
    Completed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Failed | Phase::Completed)
    }
}

/// Why a running session was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptSource {
    /// Host application moved to the background.
    AppBackground,
    /// Host application became inactive (app switcher, incoming call).
    AppInactive,
    /// Host navigated away from the focus screen.
    ScreenBlur,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSnapshot {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    phase: Phase,
    duration_seconds: u64,
    remaining_seconds: u64,
    /// Set by `start`, cleared whenever the session stops for any reason.
    was_running: bool,
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::with_minutes(DEFAULT_MINUTES)
    }
}

impl FocusSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session in `Setup` armed with `minutes`. Zero falls back to the default.
    pub fn with_minutes(minutes: u32) -> Self {
        let minutes = if minutes == 0 { DEFAULT_MINUTES } else { minutes };
        let duration_seconds = minutes_to_seconds(minutes);
        Self {
            phase: Phase::Setup,
            duration_seconds,
            remaining_seconds: duration_seconds,
            was_running: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn was_running(&self) -> bool {
        self.was_running
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn snapshot(&self) -> FocusSnapshot {
        FocusSnapshot {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            duration_seconds: self.duration_seconds,
        }
    }

    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_seconds,
            duration_secs: self.duration_seconds,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Pick a new session length. Only honoured in `Setup`.
    pub fn select_duration(&mut self, minutes: u32) -> Option<Event> {
        if self.phase != Phase::Setup || minutes == 0 {
            return None;
        }
        self.duration_seconds = minutes_to_seconds(minutes);
        self.remaining_seconds = self.duration_seconds;
        self.check_invariants();
        Some(Event::DurationSelected {
            duration_secs: self.duration_seconds,
            at: Utc::now(),
        })
    }

    /// Arm the countdown. From a terminal phase this also clears the outcome.
    pub fn start(&mut self) -> Option<Event> {
        if self.phase == Phase::Running {
            return None;
        }
        self.phase = Phase::Running;
        self.remaining_seconds = self.duration_seconds;
        self.was_running = true;
        self.check_invariants();
        Some(Event::SessionStarted {
            duration_secs: self.duration_seconds,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Some(Event::SessionCompleted)` on the tick that reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != Phase::Running {
            return None;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return None;
        }
        self.stop(Phase::Completed);
        Some(Event::SessionCompleted {
            duration_secs: self.duration_seconds,
            at: Utc::now(),
        })
    }

    /// The session context was left. Only a running session can fail.
    pub fn interrupt(&mut self, source: InterruptSource) -> Option<Event> {
        if self.phase != Phase::Running || !self.was_running {
            return None;
        }
        self.stop(Phase::Failed);
        Some(Event::SessionFailed {
            source,
            remaining_secs: self.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Voluntary abort: straight back to `Setup`, no failure recorded.
    pub fn give_up(&mut self) -> Option<Event> {
        if self.phase != Phase::Running {
            return None;
        }
        let remaining_secs = self.remaining_seconds;
        self.stop(Phase::Setup);
        self.remaining_seconds = self.duration_seconds;
        Some(Event::SessionAbandoned {
            remaining_secs,
            at: Utc::now(),
        })
    }

    /// Leave a terminal phase ("try again" / "start another session").
    pub fn reset(&mut self) -> Option<Event> {
        if self.phase == Phase::Running {
            return None;
        }
        self.phase = Phase::Setup;
        self.was_running = false;
        self.remaining_seconds = self.duration_seconds;
        self.check_invariants();
        Some(Event::SessionReset { at: Utc::now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn stop(&mut self, to: Phase) {
        self.phase = to;
        self.was_running = false;
        self.check_invariants();
    }

    fn check_invariants(&self) {
        debug_assert!(self.duration_seconds > 0);
        debug_assert!(self.remaining_seconds <= self.duration_seconds);
        debug_assert_eq!(self.was_running, self.phase == Phase::Running);
    }
}
