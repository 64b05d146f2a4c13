use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Over budget for this window. `retry_after_secs` is the remaining
    /// window length rounded up to whole seconds.
    Limited { retry_after_secs: u64 },
}

#[derive(Debug)]
struct WindowState {
    counts: HashMap<String, u32>,
    window_start: Instant,
}

/// Per-client request counter with a fixed reset window.
///
/// All clients share one epoch: every `window`, the whole counter table
/// is cleared at once rather than each key expiring on its own
/// schedule. A client can therefore burst up to `max_requests` just
/// before a boundary and again just after it; that is the accepted
/// policy, not a sliding window.
///
/// Counters track attempts, so rejected requests keep counting and a
/// completed request is never decremented.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: u32,
    state: Mutex<WindowState>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            state: Mutex::new(WindowState {
                counts: HashMap::new(),
                window_start: Instant::now(),
            }),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts one attempt for `client_key` and decides whether it may proceed.
    pub fn increment(&self, client_key: &str) -> Decision {
        let mut state = self.state.lock();
        let entry = state.counts.entry(client_key.to_owned()).or_insert(0);
        *entry += 1;
        let count = *entry;

        if count > self.max_requests {
            let remaining = self.window.saturating_sub(state.window_start.elapsed());
            let retry_after_secs = remaining.as_secs_f64().ceil() as u64;
            warn!(client_key, count, "rate limit exceeded");
            return Decision::Limited { retry_after_secs };
        }
        Decision::Allowed
    }

    /// Clears every client counter and starts a new window epoch.
    pub fn reset_all(&self) {
        let mut state = self.state.lock();
        state.counts.clear();
        state.window_start = Instant::now();
        debug!("rate window reset");
    }

    /// Spawns the background task that resets the table every window.
    ///
    /// Scheduled once, runs for the life of the process, independent of
    /// request traffic. Dropping the returned handle detaches the task;
    /// it does not keep the runtime alive on shutdown.
    pub fn spawn_reset_task(self: &Arc<Self>) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(limiter.window);
            // The first tick completes immediately; skip it so the first
            // window runs its full length.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.reset_all();
            }
        })
    }
}
