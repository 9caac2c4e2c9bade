//! Host signals that end a running session.
//!
//! Two sources feed the controller: the application lifecycle
//! (foreground / background) and the focus state of the hosting screen.
//! Both are edge-triggered here so one host transition yields at most
//! one interrupt.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::session::InterruptSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    Active,
    Background,
    Inactive,
}

impl AppState {
    fn interrupt_source(self) -> Option<InterruptSource> {
        match self {
            AppState::Active => None,
            AppState::Background => Some(InterruptSource::AppBackground),
            AppState::Inactive => Some(InterruptSource::AppInactive),
        }
    }
}

impl std::str::FromStr for AppState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AppState::Active),
            "background" => Ok(AppState::Background),
            "inactive" => Ok(AppState::Inactive),
            other => Err(format!("unknown app state: {other}")),
        }
    }
}

pub type LifecycleCallback = Box<dyn Fn(AppState) + Send + Sync>;

/// Host-side registration for application lifecycle changes.
pub trait AppLifecycle {
    /// Register `callback` for every lifecycle change. The returned
    /// subscription unregisters it on `remove()` or drop.
    fn subscribe(&self, callback: LifecycleCallback) -> Subscription;
}

/// Handle returned by [`AppLifecycle::subscribe`].
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn remove(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

type Listeners = HashMap<u64, Arc<dyn Fn(AppState) + Send + Sync>>;

/// In-process lifecycle source. Hosts push transitions with [`LifecycleHub::emit`].
#[derive(Clone, Default)]
pub struct LifecycleHub {
    listeners: Arc<Mutex<Listeners>>,
    next_id: Arc<AtomicU64>,
}

impl LifecycleHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `state` to every current listener.
    pub fn emit(&self, state: AppState) {
        // Snapshot first so a listener may unsubscribe while being called.
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(state);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl AppLifecycle for LifecycleHub {
    fn subscribe(&self, callback: LifecycleCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::from(callback));

        let listeners = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&id);
            }
        })
    }
}

/// Turns a stream of lifecycle states into one interrupt per move away
/// from the foreground.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleEdge {
    last: AppState,
}

impl Default for LifecycleEdge {
    fn default() -> Self {
        Self {
            last: AppState::Active,
        }
    }
}

impl LifecycleEdge {
    pub fn observe(&mut self, next: AppState) -> Option<InterruptSource> {
        let previous = std::mem::replace(&mut self.last, next);
        if previous == next {
            return None;
        }
        next.interrupt_source()
    }
}

/// Fires on the focused -> blurred edge of the hosting screen.
#[derive(Debug, Clone, Copy)]
pub struct ScreenFocusEdge {
    focused: bool,
}

impl Default for ScreenFocusEdge {
    fn default() -> Self {
        Self { focused: true }
    }
}

impl ScreenFocusEdge {
    pub fn observe(&mut self, is_focused: bool) -> Option<InterruptSource> {
        let was_focused = std::mem::replace(&mut self.focused, is_focused);
        (was_focused && !is_focused).then_some(InterruptSource::ScreenBlur)
    }
}
