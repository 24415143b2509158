// Background polling with optional adaptive interval and bounded retry-with-backoff

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Exponential backoff between attempts of a single poll.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub exponential_base: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            exponential_base: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Retries `operation` until it succeeds or `max_attempts` is reached.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        let mut delay = self.initial_delay;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= max_attempts => {
                    warn!(error = %err, attempts = attempt, "poll failed after retries");
                    return Err(err);
                }
                Err(err) => {
                    debug!(error = %err, attempt, "poll attempt failed; retrying");
                    tokio::time::sleep(delay).await;
                    delay = self.max_delay.min(Duration::from_secs_f64(
                        delay.as_secs_f64() * self.exponential_base,
                    ));
                    attempt += 1;
                }
            }
        }
    }
}

/// After a failed poll the interval grows by `backoff_factor` up to `max`; a
/// successful poll resets it to the base interval.
#[derive(Debug, Clone)]
pub struct AdaptiveInterval {
    pub max: Duration,
    pub backoff_factor: f64,
}

#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub interval: Duration,
    pub adaptive: Option<AdaptiveInterval>,
    pub retry: Option<RetryPolicy>,
    /// Poll once right away instead of waiting one interval first.
    pub immediate: bool,
}

impl PollingConfig {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            adaptive: None,
            retry: None,
            immediate: true,
        }
    }

    /// Wait before the next poll given how the last one went.
    pub fn next_delay(&self, current: Duration, succeeded: bool) -> Duration {
        match (&self.adaptive, succeeded) {
            (None, _) | (Some(_), true) => self.interval,
            (Some(a), false) => a
                .max
                .min(Duration::from_secs_f64(current.as_secs_f64() * a.backoff_factor))
                .max(self.interval),
        }
    }
}

/// Handle to a running poll loop. Stopped by [`Poller::stop`] or on drop.
pub struct Poller {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawns the loop: `fetch` produces a result, `on_result` consumes it.
    pub fn start<F, Fut, T, E, C>(config: PollingConfig, mut fetch: F, mut on_result: C) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: std::fmt::Display + Send + 'static,
        C: FnMut(Result<T, E>) + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut delay = config.interval;
            if !config.immediate {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = &mut shutdown_rx => return,
                }
            }
            loop {
                let result = match &config.retry {
                    Some(policy) => policy.execute(&mut fetch).await,
                    None => fetch().await,
                };
                let succeeded = result.is_ok();
                on_result(result);
                delay = config.next_delay(delay, succeeded);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = &mut shutdown_rx => {
                        debug!("poller shutting down");
                        break;
                    }
                }
            }
        });
        Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the loop and waits for it to exit. An in-flight fetch is allowed to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_interval_never_changes() {
        let c = PollingConfig::fixed(Duration::from_secs(5));
        assert_eq!(c.next_delay(Duration::from_secs(5), false), Duration::from_secs(5));
    }

    #[test]
    fn adaptive_interval_backs_off_and_resets() {
        let c = PollingConfig {
            adaptive: Some(AdaptiveInterval {
                max: Duration::from_secs(30),
                backoff_factor: 2.0,
            }),
            ..PollingConfig::fixed(Duration::from_secs(5))
        };
        let d1 = c.next_delay(Duration::from_secs(5), false);
        assert_eq!(d1, Duration::from_secs(10));
        let d2 = c.next_delay(Duration::from_secs(20), false);
        assert_eq!(d2, Duration::from_secs(30));
        assert_eq!(c.next_delay(d2, true), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_gives_up_after_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            ..Default::default()
        };
        let mut calls = 0;
        let result: Result<(), String> = policy
            .execute(|| {
                calls += 1;
                async { Err("down".to_string()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_returns_first_success() {
        let policy = RetryPolicy::default();
        let mut calls = 0;
        let result: Result<u32, String> = policy
            .execute(|| {
                calls += 1;
                let n = calls;
                async move { if n < 2 { Err("flaky".into()) } else { Ok(n) } }
            })
            .await;
        assert_eq!(result, Ok(2));
    }
}
