// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fixed-interval polling with a wall-clock deadline

use crate::verify::Readiness;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSchedule {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

#[derive(Error, Debug)]
pub enum PollError {
    #[error("condition not met after {attempts} attempts within {timeout:?}; last outcome: {last}")]
    Timeout {
        attempts: u32,
        timeout: Duration,
        last: String,
    },

    #[error("aborted after {attempts} attempts: {source}")]
    Aborted {
        attempts: u32,
        #[source]
        source: Box<crate::error::E2eError>,
    },
}

/// Run `check` until it reports [`Readiness::Ready`].
///
/// The timeout is a wall-clock bound on the whole poll. Every attempt is polled at
/// least once, so the first attempt always runs even when the timeout is shorter than
/// the interval, but an attempt still pending at the deadline is dropped. No attempt
/// is started once the deadline has passed. With `fail_fast`, a transport error ends
/// polling at once; otherwise every outcome is retried.
/// Returns the number of attempts made.
pub async fn poll_until_ready<F, Fut>(
    schedule: PollSchedule,
    fail_fast: bool,
    mut check: F,
) -> Result<u32, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Readiness>,
{
    let deadline = Instant::now() + schedule.timeout;
    let timed_out = |attempts, last| PollError::Timeout {
        attempts,
        timeout: schedule.timeout,
        last,
    };
    let mut attempts = 0;

    loop {
        attempts += 1;
        let outcome = match timeout_at(deadline, check()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Attempt {} still pending at the deadline", attempts);
                return Err(timed_out(
                    attempts,
                    format!("attempt {} did not finish before the deadline", attempts),
                ));
            }
        };

        let last = match outcome {
            Readiness::Ready => return Ok(attempts),
            Readiness::TransportError(source) if fail_fast => {
                return Err(PollError::Aborted {
                    attempts,
                    source: Box::new(source),
                });
            }
            Readiness::TransportError(e) => {
                warn!("Attempt {} failed: {}", attempts, e);
                e.to_string()
            }
            Readiness::NotReady(reason) => {
                debug!("Attempt {}: {}", attempts, reason);
                reason
            }
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(timed_out(attempts, last));
        }
        sleep_until((now + schedule.interval).min(deadline)).await;
        if Instant::now() >= deadline {
            return Err(timed_out(attempts, last));
        }
    }
}
