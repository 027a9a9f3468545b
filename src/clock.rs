//! # Clock abstraction for timestamps and interruptible sleeps.
//!
//! [`Clock`] is the time collaborator the retry driver runs against:
//! wall-clock timestamps for attempt records, remaining-time queries for
//! the deadline pre-check, and a sleep that cancellation or the deadline
//! can cut short. [`TokioClock`] is the real implementation; tests swap in
//! their own to script time.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::time::{self, Instant};

use crate::context::RetryContext;

/// Time source for a retry run.
///
/// Read-only from the driver's perspective; one instance may be shared by
/// any number of concurrent drivers.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Wall-clock timestamp for attempt records.
    fn now(&self) -> SystemTime;

    /// Remaining time until `deadline`; zero if it already passed.
    fn time_until(&self, deadline: Instant) -> Duration;

    /// Sleeps for `dur`, waking early on cancellation or deadline expiry.
    ///
    /// Returns `true` if the full duration elapsed, `false` if the sleep
    /// was interrupted; on `false` the caller fetches the cause from the
    /// context.
    async fn sleep_for(&self, ctx: &RetryContext, dur: Duration) -> bool;
}

/// Real-time clock backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn time_until(&self, deadline: Instant) -> Duration {
        deadline.saturating_duration_since(Instant::now())
    }

    async fn sleep_for(&self, ctx: &RetryContext, dur: Duration) -> bool {
        if ctx.is_cancelled() {
            return false;
        }
        let sleep = time::sleep(dur);
        tokio::pin!(sleep);
        match ctx.deadline() {
            Some(deadline) => {
                tokio::select! {
                    _ = &mut sleep => true,
                    _ = ctx.cancelled() => false,
                    _ = time::sleep_until(deadline) => false,
                }
            }
            None => {
                tokio::select! {
                    _ = &mut sleep => true,
                    _ = ctx.cancelled() => false,
                }
            }
        }
    }
}
