// Debouncing: delay-then-fire callbacks, and last-call-wins async runs

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs a callback once the calls stop for `delay`. A newer call cancels the pending one.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn call<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f().await;
        });
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// True while a call is waiting out its delay or still running.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub fn cancel(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Debounced async runner with a generation token per call.
///
/// Each `run` waits `delay`, then executes only if no newer `run` (or `cancel`)
/// happened meanwhile. A result that comes back after a newer call started is
/// discarded and `run` yields `None`.
pub struct LatestOnly {
    delay: Duration,
    generation: AtomicU64,
}

impl LatestOnly {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    pub async fn run<F, Fut, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = T>,
    {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if !self.is_current(token) {
            return None;
        }
        let out = f(token).await;
        self.is_current(token).then_some(out)
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Supersedes every pending and in-flight run.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn debouncer_fires_only_last_call() {
        let hits = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        let d = Debouncer::new(Duration::from_millis(300));
        for i in 1..=3 {
            let hits = hits.clone();
            let last = last.clone();
            d.call(move || async move {
                hits.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_cancel_drops_pending_call() {
        let hits = Arc::new(AtomicUsize::new(0));
        let d = Debouncer::new(Duration::from_millis(300));
        let h = hits.clone();
        d.call(move || async move {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(d.is_pending());
        d.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!d.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn latest_only_discards_superseded_result() {
        let runner = Arc::new(LatestOnly::new(Duration::from_millis(50)));
        let slow = {
            let runner = runner.clone();
            tokio::spawn(async move {
                runner
                    .run(|_| async {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        "stale"
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(200)).await;
        let fresh = runner.run(|_| async { "fresh" }).await;
        assert_eq!(fresh, Some("fresh"));
        assert_eq!(slow.await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn latest_only_skips_call_superseded_during_delay() {
        let runner = LatestOnly::new(Duration::from_millis(100));
        let called = AtomicUsize::new(0);
        let (first, second) = tokio::join!(
            runner.run(|_| async { called.fetch_add(1, Ordering::SeqCst) }),
            runner.run(|_| async { called.fetch_add(1, Ordering::SeqCst) }),
        );
        assert_eq!(first, None);
        assert_eq!(second, Some(0));
        assert_eq!(called.load(Ordering::SeqCst), 1);
    }
}
