//! # Retry driver.
//!
//! [`Retrier`] re-invokes a fallible async operation on a jittered
//! exponential backoff schedule, bounded by an attempt budget and the
//! context's deadline, recording every failure along the way.
//!
//! ## Control flow
//! ```text
//! run(ctx, op)
//!   ├─► clone + reset the backoff template
//!   └─► loop (step 0..max_steps):
//!        ├─► op(ctx) ─► Ok(v) ───────────────► return Ok(v)
//!        │             └─ Err(e)
//!        ├─► filter(e) == false ─────────────► Err(Rejected(e))
//!        ├─► record { at: clock.now(), e }
//!        ├─► delay = backoff.next()
//!        ├─► delay > time left to deadline ──► Err(Aborted(DeadlineExceeded))
//!        └─► sleep_for(ctx, delay) cut short ► Err(Aborted(cause))
//!   budget exhausted ───────────────────────► Err(Exhausted(history))
//! ```
//!
//! ## Rules
//! - Attempts run sequentially; the interruptible sleep is the only
//!   suspension point the driver owns.
//! - The operation receives a clone of the context and must honor it
//!   mid-attempt.
//! - Errors append in attempt order; the history's most-recent accessor is
//!   the last append.
//! - The deadline pre-check runs before the sleep, so an abort costs a
//!   check, not a cut-short sleep; a cancellation landing between check and
//!   sleep is still honored by the sleep itself.

use std::future::Future;
use std::sync::Arc;

use crate::clock::{Clock, TokioClock};
use crate::context::RetryContext;
use crate::error::{AbortCause, AttemptError, RetryError};
use crate::policies::BackoffPolicy;

/// Filter deciding whether an error is worth another attempt.
///
/// Returning `false` stops the run and surfaces that error verbatim.
pub type RetryFilter<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Drives repeated invocation of an operation with backoff between
/// failures.
///
/// A `Retrier` is a reusable template: every [`run`](Retrier::run) clones
/// and resets the backoff, so concurrent runs sharing one template never
/// interfere.
pub struct Retrier<E> {
    /// Backoff parameters for the wait between attempts.
    pub backoff: BackoffPolicy,
    /// Continue/stop decision per error; `None` always continues.
    pub filter: Option<RetryFilter<E>>,
    /// Maximum attempts; `0` never invokes the operation.
    pub max_steps: u32,
    /// Clock for attempt timestamps and interruptible sleeps.
    pub clock: Arc<dyn Clock>,
}

impl<E> Retrier<E>
where
    E: std::error::Error + 'static,
{
    /// Retrier with the default backoff, no filter, and the tokio clock.
    pub fn new(max_steps: u32) -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            filter: None,
            max_steps,
            clock: Arc::new(TokioClock),
        }
    }

    /// Sets the continue/stop filter.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Invokes `op` until it succeeds, the attempt budget runs out, the
    /// filter rejects an error, or the context is cancelled or out of
    /// time.
    ///
    /// The operation is called once per attempt with a clone of `ctx`.
    pub async fn run<T, F, Fut>(&self, ctx: &RetryContext, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(RetryContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut backoff = self.backoff.clone();
        backoff.reset();

        let mut errors: Vec<AttemptError<E>> = Vec::new();
        for step in 0..self.max_steps {
            let err = match op(ctx.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if let Some(filter) = &self.filter {
                if !filter(&err) {
                    return Err(RetryError::Rejected(err));
                }
            }
            log::debug!("attempt {} failed: {}", step + 1, err);
            errors.push(AttemptError {
                at: self.clock.now(),
                error: err,
            });

            let delay = backoff.next();
            if let Some(deadline) = ctx.deadline() {
                if delay > self.clock.time_until(deadline) {
                    log::debug!("backoff {:?} would overrun the deadline, aborting", delay);
                    return Err(RetryError::Aborted {
                        errors: errors.into(),
                        cause: AbortCause::DeadlineExceeded,
                    });
                }
            }
            log::debug!("retrying in {:?}", delay);
            if !self.clock.sleep_for(ctx, delay).await {
                let cause = ctx.cause().unwrap_or(AbortCause::Cancelled);
                return Err(RetryError::Aborted {
                    errors: errors.into(),
                    cause,
                });
            }
        }
        Err(RetryError::Exhausted(errors.into()))
    }
}

/// One-shot retry with an explicit backoff and attempt budget.
///
/// Builds a throwaway [`Retrier`] around `backoff` (taken by value, so the
/// caller's copy is never mutated) with no filter and the tokio clock.
pub async fn retry<T, E, F, Fut>(
    ctx: &RetryContext,
    backoff: BackoffPolicy,
    steps: u32,
    op: F,
) -> Result<T, RetryError<E>>
where
    E: std::error::Error + 'static,
    F: FnMut(RetryContext) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let retrier = Retrier {
        backoff,
        filter: None,
        max_steps: steps,
        clock: Arc::new(TokioClock),
    };
    retrier.run(ctx, op).await
}
