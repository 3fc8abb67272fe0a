//! Bounded retry for transient remote failures
//!
//! A [`RetryPolicy`] wraps any async remote call. Only errors the caller
//! classifies as transient are retried; everything else is returned at once.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use sharesync_core::retry::RetryPolicy;
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let policy = RetryPolicy::fixed(5, Duration::from_secs(10));
//! let _status = policy
//!     .run(
//!         "list_accounts",
//!         || async { Ok::<_, std::io::Error>("ok") },
//!         |e: &std::io::Error| e.kind() == std::io::ErrorKind::TimedOut,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// `initial * multiplier^attempt`, capped at `max`
    Exponential {
        initial: Duration,
        multiplier: f64,
        max: Duration,
    },
}

/// Retry configuration: how many retries after the first attempt, and how
/// long to wait between them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (0 disables retrying)
    pub max_retries: u32,
    /// Delay schedule
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// A policy that never retries
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::Fixed(Duration::ZERO),
        }
    }

    /// Fixed delay between retries
    #[must_use]
    pub const fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Exponential backoff between retries
    #[must_use]
    pub fn exponential(
        max_retries: u32,
        initial: Duration,
        multiplier: f64,
        max: Duration,
    ) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Exponential {
                initial,
                multiplier,
                max,
            },
        }
    }

    /// Delay before retry number `attempt` (0-based)
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential {
                initial,
                multiplier,
                max,
            } => {
                let secs = initial.as_secs_f64() * multiplier.powi(attempt as i32);
                Duration::from_secs_f64(secs.min(max.as_secs_f64()))
            }
        }
    }

    /// Runs `op`, retrying while `is_transient` holds and budget remains
    ///
    /// The last error is returned unchanged once the budget is exhausted.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        operation: &str,
        mut op: F,
        is_transient: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(operation, attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if is_transient(&err) => {
                    if attempt >= self.max_retries {
                        if self.max_retries > 0 {
                            error!(
                                operation,
                                attempts = attempt + 1,
                                error = %err,
                                "Retry budget exhausted"
                            );
                        }
                        return Err(err);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        retries_left = self.max_retries - attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
