use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Owned periodic tick source.
///
/// Dropping the ticker cancels it; there is no way to hold a running
/// session without holding its ticker.
#[derive(Debug)]
pub struct Ticker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a task calling `on_tick` every `period`, first one `period`
    /// from now. `on_tick` receives the ticker's token and returns `false`
    /// to stop the loop.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(&CancellationToken) -> bool + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {
                        if !on_tick(&task_token) {
                            break;
                        }
                    }
                }
            }
        });
        Self { token, handle }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.token.cancel();
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_tick_lands_one_period_after_spawn() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let _ticker = Ticker::spawn(Duration::from_secs(1), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        });

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let ticker = Ticker::spawn(Duration::from_secs(1), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        });

        time::sleep(Duration::from_millis(1_500)).await;
        drop(ticker);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_can_end_the_loop() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let _ticker = Ticker::spawn(Duration::from_secs(1), move |_| {
            seen.fetch_add(1, Ordering::SeqCst) + 1 < 3
        });

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
