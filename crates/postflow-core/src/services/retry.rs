//! Bounded retry with backoff for automatic (not user-initiated) work.

use std::future::Future;
use std::time::Duration;

use crate::error::ServiceError;

/// Delay between two consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    None,
    Fixed(Duration),
    /// Doubles after every failed attempt, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after the `failed_attempts`-th consecutive failure.
    pub fn delay(&self, failed_attempts: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(d) => d,
            Backoff::Exponential { initial, max } => {
                let shift = failed_attempts.saturating_sub(1).min(16);
                initial.saturating_mul(1 << shift).min(max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Exponential {
                initial: Duration::from_millis(500),
                max: Duration::from_secs(4),
            },
        }
    }
}

/// Attempts already spent against a [`RetryPolicy`]. Owned by whoever
/// scopes the budget (an editing session for image generation), so the cap
/// holds across several calls and not only within one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryBudget {
    used: u32,
}

impl RetryBudget {
    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self, policy: &RetryPolicy) -> u32 {
        policy.max_attempts.saturating_sub(self.used)
    }
}

/// Why a retried operation produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    /// The budget ran out. `last` is the error of the final attempt, if any
    /// attempt was made at all.
    Exhausted {
        attempts: u32,
        last: Option<ServiceError>,
    },
    /// A non-retryable error; returned as soon as it happens.
    Fatal(ServiceError),
}

fn is_retryable(err: &ServiceError) -> bool {
    match err {
        ServiceError::Transport(_) => true,
        ServiceError::Status { status, .. } => *status >= 500 || *status == 429,
        ServiceError::PlanSuspended | ServiceError::NotFound | ServiceError::Decode(_) => false,
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails fatally, or `budget` is spent.
    pub async fn run<T, F, Fut>(&self, budget: &mut RetryBudget, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut failures = 0;
        let mut last = None;

        while budget.remaining(self) > 0 {
            if failures > 0 {
                tokio::time::sleep(self.backoff.delay(failures)).await;
            }
            budget.used += 1;

            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !is_retryable(&err) => return Err(RetryError::Fatal(err)),
                Err(err) => {
                    failures += 1;
                    tracing::warn!(
                        attempt = budget.used,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Attempt failed"
                    );
                    last = Some(err);
                }
            }
        }

        Err(RetryError::Exhausted {
            attempts: budget.used,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let backoff = Backoff::Exponential {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(350),
        };
        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(350));
        assert_eq!(backoff.delay(40), Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_max_attempts() {
        let policy = RetryPolicy::default();
        let mut budget = RetryBudget::default();
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = policy
            .run(&mut budget, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::Transport("down".into()))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 3, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn budget_is_shared_across_runs() {
        let policy = RetryPolicy::default();
        let mut budget = RetryBudget::default();

        let first: Result<(), _> = policy
            .run(&mut budget, || async { Err(ServiceError::Transport("x".into())) })
            .await;
        assert!(first.is_err());

        let calls = AtomicU32::new(0);
        let counter = &calls;
        let second: Result<(), _> = policy
            .run(&mut budget, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            second,
            Err(RetryError::Exhausted {
                attempts: 3,
                last: None
            })
        );
    }

    #[tokio::test]
    async fn suspended_plan_is_not_retried() {
        let policy = RetryPolicy::default();
        let mut budget = RetryBudget::default();

        let result: Result<(), _> = policy
            .run(&mut budget, || async { Err(ServiceError::PlanSuspended) })
            .await;

        assert_eq!(result, Err(RetryError::Fatal(ServiceError::PlanSuspended)));
        assert_eq!(budget.used(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failure() {
        let policy = RetryPolicy::default();
        let mut budget = RetryBudget::default();
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = policy
            .run(&mut budget, move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ServiceError::Status {
                        status: 503,
                        message: "busy".into(),
                    })
                } else {
                    Ok("img")
                }
            })
            .await;

        assert_eq!(result, Ok("img"));
        assert_eq!(budget.used(), 2);
    }
}
