use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use crate::metrics::TRACKED_IDENTIFIERS;

pub const DEFAULT_WINDOW_MS: i64 = 60_000;
pub const DEFAULT_MAX_REQUESTS: u32 = 100;

// cleanup horizon, independent of any caller's window
pub const RETENTION_MS: i64 = 300_000;
pub const CLEANUP_INTERVAL: Duration = Duration::from_millis(300_000);

// Quota for one call site: at most `max_requests` inside the last `window_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window_ms: i64,
    pub max_requests: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

impl RateLimitPolicy {
    pub const fn new(window_ms: i64, max_requests: u32) -> Self {
        Self {
            window_ms,
            max_requests,
        }
    }

    pub const fn per_minutes(minutes: i64, max_requests: u32) -> Self {
        Self::new(minutes * 60_000, max_requests)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub limited: bool,
    // quota left after this call
    pub remaining: u32,
    // 0 when admitted
    pub retry_after_ms: i64,
}

/// Sliding-window limiter keyed by identifier (client address, route scope...).
///
/// Each identifier maps to its request timestamps in arrival order, in
/// milliseconds since the epoch. Admission filters that list lazily on every
/// call; a periodic sweep drops identifiers nobody has used for
/// [`RETENTION_MS`].
pub struct RateLimiter {
    requests: DashMap<String, Vec<i64>>,
    retention_ms: i64,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
            retention_ms: RETENTION_MS,
            sweeper: Mutex::new(None),
        }
    }

    pub fn is_rate_limited(&self, identifier: &str, window_ms: i64, max_requests: u32) -> bool {
        self.check(identifier, RateLimitPolicy::new(window_ms, max_requests))
            .limited
    }

    pub fn check(&self, identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        self.check_at(identifier, policy, now_millis())
    }

    pub fn check_at(&self, identifier: &str, policy: RateLimitPolicy, now: i64) -> RateLimitDecision {
        // entry() holds the shard lock for the whole read-modify-write
        let mut stamps = self.requests.entry(identifier.to_owned()).or_default();

        let mut in_window: Vec<i64> = stamps
            .iter()
            .copied()
            .filter(|&ts| now - ts < policy.window_ms)
            .collect();

        if in_window.len() >= policy.max_requests as usize {
            // rejected calls are not recorded
            // stamps can land out of order when callers race on the clock
            let retry_after_ms = in_window
                .iter()
                .min()
                .map(|&oldest| (oldest + policy.window_ms - now).max(1))
                .unwrap_or(policy.window_ms);
            return RateLimitDecision {
                limited: true,
                remaining: 0,
                retry_after_ms,
            };
        }

        in_window.push(now);
        let remaining = policy.max_requests - in_window.len() as u32;
        *stamps = in_window;

        RateLimitDecision {
            limited: false,
            remaining,
            retry_after_ms: 0,
        }
    }

    pub fn cleanup(&self) -> usize {
        self.cleanup_at(now_millis())
    }

    pub fn cleanup_at(&self, now: i64) -> usize {
        let retention_ms = self.retention_ms;
        let before = self.requests.len();

        // retain() locks shard by shard, so concurrent check() calls just wait
        self.requests.retain(|_, stamps| {
            let fresh: Vec<i64> = stamps
                .iter()
                .copied()
                .filter(|&ts| now - ts < retention_ms)
                .collect();
            *stamps = fresh;
            !stamps.is_empty()
        });

        let after = self.requests.len();
        TRACKED_IDENTIFIERS.set(after as f64);
        before.saturating_sub(after)
    }

    pub fn tracked_identifiers(&self) -> usize {
        self.requests.len()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.requests.contains_key(identifier)
    }

    /// Spawns the periodic sweep on the current tokio runtime.
    ///
    /// Returns `false` if a sweeper is already running. The task only holds a
    /// weak reference, so it also ends once the limiter is dropped.
    pub fn start(self: &Arc<Self>, every: Duration) -> bool {
        self.start_with(every, RateLimiter::cleanup)
    }

    /// Like [`start`](Self::start), running `sweep` on every tick instead of
    /// [`cleanup`](Self::cleanup).
    pub fn start_with<F>(self: &Arc<Self>, every: Duration, sweep: F) -> bool
    where
        F: Fn(&RateLimiter) -> usize + Send + Sync + 'static,
    {
        let mut slot = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let limiter = Arc::downgrade(self);
        *slot = Some(tokio::spawn(sweep_loop(limiter, every, Arc::new(sweep))));
        tracing::info!(interval_ms = every.as_millis() as u64, "rate limiter cleanup started");
        true
    }

    pub fn stop(&self) {
        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::info!("rate limiter cleanup stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.stop();
    }
}

type Sweep = Arc<dyn Fn(&RateLimiter) -> usize + Send + Sync>;

async fn sweep_loop(limiter: Weak<RateLimiter>, every: Duration, sweep: Sweep) {
    let mut ticker = interval_at(Instant::now() + every, every);

    loop {
        ticker.tick().await;

        let Some(limiter) = limiter.upgrade() else {
            break;
        };

        // run each sweep in its own task so a panic cannot take the timer down
        let sweep = sweep.clone();
        match tokio::spawn(async move { sweep(limiter.as_ref()) }).await {
            Ok(removed) if removed > 0 => {
                tracing::debug!(removed, "rate limiter evicted idle identifiers");
            }
            Ok(_) => {}
            Err(e) => tracing::error!("rate limiter cleanup failed: {e}"),
        }
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
