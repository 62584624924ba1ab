//! Collision retry for optimistic word creation
//!
//! An operation first looks up existing rows, then creates the missing ones
//! under a uniqueness constraint. If a concurrent writer created one of them
//! first, the operation reports [`Attempt::Collision`] and is run again from
//! the top, after sleeping a random duration from a widening backoff window so
//! competing writers drift apart.
//!
//! Rules:
//! - `Err` from the operation is never retried
//! - After `max_retries` retries, one more collision is fatal
//!   ([`Error::TooManyCollisions`])

use fuzzdex_core::config::CollisionConfig;
use fuzzdex_core::error::{Error, Result};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of one optimistic attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The operation finished
    Done(T),
    /// A uniqueness collision on the named key; retry from scratch
    Collision(String),
}

impl<T> Attempt<T> {
    /// Check if the attempt finished
    pub fn is_done(&self) -> bool {
        matches!(self, Attempt::Done(_))
    }
}

/// Inclusive range of milliseconds to sleep before one retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffWindow {
    /// Lower bound (ms)
    pub min_ms: u64,
    /// Upper bound (ms)
    pub max_ms: u64,
}

impl BackoffWindow {
    /// Window from `min_ms` to `max_ms`
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        BackoffWindow { min_ms, max_ms }
    }

    /// Random duration inside the window
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        if lo == hi {
            return Duration::from_millis(lo);
        }
        Duration::from_millis(rng.gen_range(lo..=hi))
    }
}

/// Retry budget and backoff schedule
///
/// # Example
/// ```ignore
/// let policy = RetryPolicy::default().with_max_retries(2);
/// let ids = retry_on_collision(&policy, |_| create_missing_words(&tokens))?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Window per retry; the last one repeats
    pub windows: Vec<BackoffWindow>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            windows: vec![
                BackoffWindow::new(0, 100),
                BackoffWindow::new(100, 1000),
                BackoffWindow::new(1000, 3000),
                BackoffWindow::new(6000, 9000),
            ],
        }
    }
}

impl RetryPolicy {
    /// Policy that fails on the first collision
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Policy that retries without sleeping
    pub fn immediate(max_retries: usize) -> Self {
        Self {
            max_retries,
            windows: vec![BackoffWindow::new(0, 0)],
        }
    }

    /// Set maximum number of retries
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Window used before retry `retry` (0-based)
    pub fn window(&self, retry: usize) -> BackoffWindow {
        self.windows
            .get(retry)
            .or_else(|| self.windows.last())
            .copied()
            .unwrap_or(BackoffWindow::new(0, 0))
    }

    /// Sleep before retry `retry`
    pub fn delay(&self, retry: usize) -> Duration {
        self.window(retry).sample(&mut rand::thread_rng())
    }
}

impl From<&CollisionConfig> for RetryPolicy {
    fn from(config: &CollisionConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            windows: config
                .backoff_ms
                .iter()
                .map(|[min, max]| BackoffWindow::new(*min, *max))
                .collect(),
        }
    }
}

/// Run `op` until it finishes, retrying on collisions
///
/// `op` receives the 0-based attempt number.
///
/// # Errors
///
/// Any error returned by `op`, or [`Error::TooManyCollisions`] once the
/// retry budget is spent.
pub fn retry_on_collision<T, F>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(usize) -> Result<Attempt<T>>,
{
    for attempt in 0..=policy.max_retries {
        match op(attempt)? {
            Attempt::Done(value) => {
                if attempt > 0 {
                    debug!(attempt, "collision resolved after retry");
                }
                return Ok(value);
            }
            Attempt::Collision(key) if attempt < policy.max_retries => {
                let delay = policy.delay(attempt);
                warn!(
                    key = %key,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "uniqueness collision, retrying"
                );
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            Attempt::Collision(key) => {
                warn!(key = %key, attempt, "uniqueness collision, retry budget spent");
            }
        }
    }
    Err(Error::TooManyCollisions {
        attempts: policy.max_retries + 1,
    })
}
