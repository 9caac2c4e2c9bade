use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::focus::{InterruptSource, Phase};

/// Every state change of a focus session produces an Event.
/// The presentation layer subscribes to them to drive its effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    DurationSelected {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero while running.
    SessionCompleted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The user left the session context while running.
    SessionFailed {
        source: InterruptSource,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The user gave up voluntarily; no failure is recorded.
    SessionAbandoned {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        remaining_secs: u64,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Visual effect the presentation layer plays for this event, if any.
    pub fn cue(&self) -> Option<PresentationCue> {
        match self {
            Event::SessionStarted { .. } => Some(PresentationCue::LockClose),
            Event::SessionCompleted { .. } => Some(PresentationCue::Confetti),
            Event::SessionFailed { .. } => Some(PresentationCue::Shake),
            Event::SessionAbandoned { .. } | Event::SessionReset { .. } => {
                Some(PresentationCue::LockOpen)
            }
            Event::DurationSelected { .. } | Event::StateSnapshot { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationCue {
    LockClose,
    LockOpen,
    Shake,
    Confetti,
}

/// A phase transition published to controller subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
    pub event: Event,
}
