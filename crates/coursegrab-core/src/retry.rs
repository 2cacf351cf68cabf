//! Bounded-attempt executor for UI probes.
//!
//! The course page renders asynchronously and offers no way to ask how many
//! rows it has, so repeated confirmed absence is the only end-of-sequence
//! signal. [`RetryPolicy::attempt`] turns a failing probe into
//! [`Probe::Absent`] once its budget is spent. That is a value, not an error:
//! callers read it as "nothing at this position" and stop scanning. Only
//! non-retryable driver failures surface as `Err`.

use crate::driver::{DriverError, DriverResult};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::debug;

/// Position of one attempt within a policy invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 1-based
    pub number: u32,
    pub max_attempts: u32,
}

impl RetryAttempt {
    pub fn is_last(&self) -> bool {
        self.number >= self.max_attempts
    }
}

/// Result of a probe after its retry budget is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    /// Every attempt failed; carries the error of the final one
    Absent {
        attempts: u32,
        last_error: DriverError,
    },
}

impl<T> Probe<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Probe::Found(value) => Some(value),
            Probe::Absent { .. } => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Probe::Absent { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// A policy allowing at least one attempt
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Run `operation` against `target` until it succeeds or the budget is spent.
    ///
    /// `NotFound` and `Interaction` failures sleep for the backoff and retry, so
    /// `k` failing attempts cost `k - 1` delays. A `Session` failure aborts at
    /// once and is returned as `Err`.
    pub async fn attempt<S, T, F>(&self, target: &mut S, mut operation: F) -> DriverResult<Probe<T>>
    where
        S: ?Sized + Send,
        F: for<'s> FnMut(&'s mut S, RetryAttempt) -> BoxFuture<'s, DriverResult<T>>,
    {
        let mut number = 1;
        loop {
            let attempt = RetryAttempt {
                number,
                max_attempts: self.max_attempts,
            };

            match operation(&mut *target, attempt).await {
                Ok(value) => return Ok(Probe::Found(value)),
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) => {
                    debug!(
                        "Attempt {}/{} failed: {}",
                        attempt.number, attempt.max_attempts, error
                    );
                    if attempt.is_last() {
                        return Ok(Probe::Absent {
                            attempts: number,
                            last_error: error,
                        });
                    }
                    tokio::time::sleep(self.backoff).await;
                    number += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_operation_uses_whole_budget() {
        let policy = RetryPolicy::new(4, Duration::from_secs(1));
        let mut calls = 0u32;
        let started = Instant::now();

        let probe = policy
            .attempt(&mut calls, |calls, _| {
                Box::pin(async move {
                    *calls += 1;
                    Err::<(), _>(DriverError::NotFound("row".into()))
                })
            })
            .await
            .unwrap();

        assert_eq!(calls, 4);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        assert_eq!(
            probe,
            Probe::Absent {
                attempts: 4,
                last_error: DriverError::NotFound("row".into()),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_attempt_j_stops_retrying() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        let mut calls = 0u32;
        let started = Instant::now();

        let probe = policy
            .attempt(&mut calls, |calls, attempt| {
                Box::pin(async move {
                    *calls += 1;
                    if attempt.number < 3 {
                        Err(DriverError::Interaction("click intercepted".into()))
                    } else {
                        Ok(attempt.number)
                    }
                })
            })
            .await
            .unwrap();

        assert_eq!(probe, Probe::Found(3));
        assert_eq!(calls, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_error_is_not_retried() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let mut calls = 0u32;

        let result = policy
            .attempt(&mut calls, |calls, _| {
                Box::pin(async move {
                    *calls += 1;
                    Err::<(), _>(DriverError::Session("browser closed".into()))
                })
            })
            .await;

        assert_eq!(calls, 1);
        assert_eq!(result, Err(DriverError::Session("browser closed".into())));
    }

    #[test]
    fn test_zero_budget_is_raised_to_one() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_probe_found_accessor() {
        assert_eq!(Probe::Found(7).found(), Some(7));
        let absent: Probe<u32> = Probe::Absent {
            attempts: 1,
            last_error: DriverError::NotFound("x".into()),
        };
        assert!(absent.is_absent());
        assert_eq!(absent.found(), None);
    }
}
