//! Lock-in focus sessions: "leave and you lose" countdowns.

mod controller;
mod duration;
mod session;
mod signals;
mod ticker;

pub use controller::{FocusController, FocusSettings};
pub use duration::{
    format_clock, minutes_to_seconds, DurationOption, DEFAULT_MINUTES, DURATION_OPTIONS,
};
pub use session::{FocusSession, FocusSnapshot, InterruptSource, Phase};
pub use signals::{
    AppLifecycle, AppState, LifecycleCallback, LifecycleEdge, LifecycleHub, ScreenFocusEdge,
    Subscription,
};
pub use ticker::Ticker;
