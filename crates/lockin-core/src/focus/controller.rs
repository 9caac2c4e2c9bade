use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use super::duration::DEFAULT_MINUTES;
use super::session::{FocusSession, FocusSnapshot, InterruptSource, Phase};
use super::signals::{AppLifecycle, AppState, LifecycleEdge, ScreenFocusEdge, Subscription};
use super::ticker::Ticker;
use crate::events::{Event, PhaseChange};

const PHASE_CHANNEL_CAPACITY: usize = 32;
/// Shortest tick period; tokio intervals reject a zero period.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Runtime knobs for a [`FocusController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusSettings {
    pub default_minutes: u32,
    pub tick_interval: Duration,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            default_minutes: DEFAULT_MINUTES,
            tick_interval: Duration::from_secs(1),
        }
    }
}

struct Inner {
    session: FocusSession,
    /// Present exactly while the session is running.
    ticker: Option<Ticker>,
    lifecycle: LifecycleEdge,
    screen: ScreenFocusEdge,
}

impl Inner {
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

#[derive(Clone)]
struct Channels {
    phases: broadcast::Sender<PhaseChange>,
    snapshots: watch::Sender<FocusSnapshot>,
}

impl Channels {
    fn publish(&self, from: Phase, session: &FocusSession, event: Option<Event>) -> Option<Event> {
        let event = event?;
        self.snapshots.send_replace(session.snapshot());
        let to = session.phase();
        if from != to {
            debug!(?from, ?to, "focus phase changed");
            // No receivers is fine.
            let _ = self.phases.send(PhaseChange {
                from,
                to,
                event: event.clone(),
            });
        }
        Some(event)
    }
}

/// Owns one focus session, its ticker and its subscribers.
///
/// Every command takes the same lock as the tick task, so ticks and
/// interrupts are applied one at a time and a run ends exactly once.
/// Commands must be issued from within a tokio runtime.
#[derive(Clone)]
pub struct FocusController {
    inner: Arc<Mutex<Inner>>,
    channels: Channels,
    tick_interval: Duration,
}

impl Default for FocusController {
    fn default() -> Self {
        Self::new(FocusSettings::default())
    }
}

impl FocusController {
    pub fn new(settings: FocusSettings) -> Self {
        let session = FocusSession::with_minutes(settings.default_minutes);
        let (phases, _) = broadcast::channel(PHASE_CHANNEL_CAPACITY);
        let (snapshots, _) = watch::channel(session.snapshot());
        Self {
            inner: Arc::new(Mutex::new(Inner {
                session,
                ticker: None,
                lifecycle: LifecycleEdge::default(),
                screen: ScreenFocusEdge::default(),
            })),
            channels: Channels { phases, snapshots },
            tick_interval: settings.tick_interval.max(MIN_TICK_INTERVAL),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> FocusSnapshot {
        self.lock().session.snapshot()
    }

    pub fn snapshot_event(&self) -> Event {
        self.lock().session.snapshot_event()
    }

    pub fn phase(&self) -> Phase {
        self.lock().session.phase()
    }

    /// Whether a tick source is currently armed.
    pub fn is_ticking(&self) -> bool {
        self.lock()
            .ticker
            .as_ref()
            .is_some_and(|ticker| !ticker.is_cancelled())
    }

    /// Phase transitions, for presentation effects (shake, confetti).
    pub fn subscribe(&self) -> broadcast::Receiver<PhaseChange> {
        self.channels.phases.subscribe()
    }

    /// Latest snapshot, updated on every tick and transition.
    pub fn watch(&self) -> watch::Receiver<FocusSnapshot> {
        self.channels.snapshots.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn select_duration(&self, minutes: u32) -> Option<Event> {
        let mut inner = self.lock();
        let from = inner.session.phase();
        let event = inner.session.select_duration(minutes);
        if event.is_none() {
            debug!(minutes, ?from, "duration selection ignored");
        }
        self.channels.publish(from, &inner.session, event)
    }

    pub fn start(&self) -> Option<Event> {
        let mut inner = self.lock();
        let from = inner.session.phase();
        if from == Phase::Running {
            return None;
        }
        inner.stop_ticker();
        let event = inner.session.start();
        if event.is_some() {
            inner.ticker = Some(self.spawn_ticker());
            info!(
                duration_secs = inner.session.duration_seconds(),
                "focus session started"
            );
        }
        self.channels.publish(from, &inner.session, event)
    }

    /// Involuntary end of a running session. No-op in any other phase.
    pub fn interrupt(&self, source: InterruptSource) -> Option<Event> {
        let mut inner = self.lock();
        self.interrupt_locked(&mut inner, source)
    }

    /// Voluntary end of a running session; goes straight back to setup.
    pub fn give_up(&self) -> Option<Event> {
        let mut inner = self.lock();
        let from = inner.session.phase();
        if from != Phase::Running {
            return None;
        }
        inner.stop_ticker();
        let event = inner.session.give_up();
        info!(
            remaining_secs = inner.session.remaining_seconds(),
            "focus session abandoned"
        );
        self.channels.publish(from, &inner.session, event)
    }

    pub fn reset(&self) -> Option<Event> {
        let mut inner = self.lock();
        let from = inner.session.phase();
        let event = inner.session.reset();
        self.channels.publish(from, &inner.session, event)
    }

    // ── Host signals ─────────────────────────────────────────────────

    /// Feed an application lifecycle change from the host.
    pub fn on_app_state_change(&self, next: AppState) -> Option<Event> {
        let mut inner = self.lock();
        let source = inner.lifecycle.observe(next)?;
        self.interrupt_locked(&mut inner, source)
    }

    /// Feed a focus change of the hosting screen.
    pub fn on_screen_focus_change(&self, is_focused: bool) -> Option<Event> {
        let mut inner = self.lock();
        let source = inner.screen.observe(is_focused)?;
        self.interrupt_locked(&mut inner, source)
    }

    /// Route a host lifecycle source into this controller until the
    /// returned subscription is dropped.
    pub fn attach_lifecycle<L>(&self, host: &L) -> Subscription
    where
        L: AppLifecycle + ?Sized,
    {
        let controller = self.clone();
        host.subscribe(Box::new(move |state| {
            controller.on_app_state_change(state);
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    fn interrupt_locked(&self, inner: &mut Inner, source: InterruptSource) -> Option<Event> {
        let from = inner.session.phase();
        if from != Phase::Running {
            debug!(?source, ?from, "interrupt ignored outside a running session");
            return None;
        }
        inner.stop_ticker();
        let event = inner.session.interrupt(source);
        info!(
            ?source,
            remaining_secs = inner.session.remaining_seconds(),
            "focus session failed"
        );
        self.channels.publish(from, &inner.session, event)
    }

    fn spawn_ticker(&self) -> Ticker {
        let inner: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        let channels = self.channels.clone();
        Ticker::spawn(self.tick_interval, move |token| {
            let Some(inner) = inner.upgrade() else {
                return false;
            };
            let mut guard = lock_inner(&inner);
            // Cancelled while waiting for the lock: this tick belongs to a
            // run that has already ended.
            if token.is_cancelled() {
                return false;
            }
            let from = guard.session.phase();
            if guard.session.remaining_seconds() <= 1 {
                guard.stop_ticker();
            }
            match guard.session.tick() {
                Some(event) => {
                    info!(
                        duration_secs = guard.session.duration_seconds(),
                        "focus session completed"
                    );
                    channels.publish(from, &guard.session, Some(event));
                    false
                }
                None => {
                    channels.snapshots.send_replace(guard.session.snapshot());
                    guard.session.is_running()
                }
            }
        })
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
