use serde::Serialize;

/// Minutes a fresh session is armed with when nothing else is configured.
pub const DEFAULT_MINUTES: u32 = 30;

/// One entry of the duration picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationOption {
    pub label: &'static str,
    pub minutes: u32,
}

impl DurationOption {
    pub fn seconds(&self) -> u64 {
        minutes_to_seconds(self.minutes)
    }
}

/// Durations offered in the setup phase.
pub const DURATION_OPTIONS: [DurationOption; 5] = [
    DurationOption { label: "15 min", minutes: 15 },
    DurationOption { label: "30 min", minutes: 30 },
    DurationOption { label: "45 min", minutes: 45 },
    DurationOption { label: "1 hour", minutes: 60 },
    DurationOption { label: "90 min", minutes: 90 },
];

pub fn minutes_to_seconds(minutes: u32) -> u64 {
    u64::from(minutes).saturating_mul(60)
}

/// Render a countdown as `MM:SS`. Minutes are not folded into hours.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
