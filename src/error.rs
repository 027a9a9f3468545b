//! Error types for retry outcomes.
//!
//! This module defines the failure side of a retry run:
//!
//! - [`AttemptError`] one failed attempt, with the time it was observed.
//! - [`AttemptErrors`] the ordered history of failed attempts.
//! - [`AbortCause`] why a run stopped early (cancellation vs deadline).
//! - [`RetryError`] the driver's outcome: rejected, exhausted, or aborted.
//!
//! `AttemptErrors` supports chain inspection ([`AttemptErrors::matches`],
//! [`AttemptErrors::find`]) so a specific failure buried among retried
//! attempts stays detectable, and its [`Display`](std::fmt::Display) output
//! renders the full ordered list with timestamps.

use std::error::Error as StdError;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

fn unix_secs(at: &SystemTime) -> String {
    match at.duration_since(UNIX_EPOCH) {
        Ok(since) => format!("{:.3}s", since.as_secs_f64()),
        Err(_) => "<pre-epoch>".to_string(),
    }
}

/// A single failed attempt and when it happened.
///
/// Records are immutable once appended to an [`AttemptErrors`] history.
/// The underlying error is exposed as the [`source`](StdError::source).
#[derive(Debug, Error)]
#[error("attempt at {}: {error}", unix_secs(.at))]
pub struct AttemptError<E>
where
    E: StdError + 'static,
{
    /// When the failure was observed (driver clock).
    pub at: SystemTime,
    /// The error the operation returned.
    #[source]
    pub error: E,
}

/// Ordered history of failed attempts; insertion order is attempt order.
///
/// Built append-only by the driver while a run is in flight, immutable once
/// the run finishes. The [`source`](StdError::source) of the whole set is
/// its most recent attempt.
#[derive(Debug)]
pub struct AttemptErrors<E>
where
    E: StdError + 'static,
{
    errors: Vec<AttemptError<E>>,
}

impl<E> Default for AttemptErrors<E>
where
    E: StdError + 'static,
{
    fn default() -> Self {
        Self { errors: Vec::new() }
    }
}

impl<E> From<Vec<AttemptError<E>>> for AttemptErrors<E>
where
    E: StdError + 'static,
{
    fn from(errors: Vec<AttemptError<E>>) -> Self {
        Self { errors }
    }
}

impl<E> AttemptErrors<E>
where
    E: StdError + 'static,
{
    /// The full ordered history.
    pub fn attempts(&self) -> &[AttemptError<E>] {
        &self.errors
    }

    /// The most recent failed attempt, if any attempt was made.
    pub fn last(&self) -> Option<&AttemptError<E>> {
        self.errors.last()
    }

    /// Number of recorded attempts.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when no attempt was recorded (a zero-step run).
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates the history in attempt order.
    pub fn iter(&self) -> std::slice::Iter<'_, AttemptError<E>> {
        self.errors.iter()
    }

    /// True if any recorded error, or any link of its own source chain,
    /// satisfies the predicate.
    pub fn matches<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&(dyn StdError + 'static)) -> bool,
    {
        self.errors.iter().any(|attempt| {
            let mut link: Option<&(dyn StdError + 'static)> = Some(&attempt.error);
            while let Some(err) = link {
                if pred(err) {
                    return true;
                }
                link = err.source();
            }
            false
        })
    }

    /// First error of type `T` found in any recorded error's source chain,
    /// in attempt order.
    pub fn find<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        for attempt in &self.errors {
            let mut link: Option<&(dyn StdError + 'static)> = Some(&attempt.error);
            while let Some(err) = link {
                if let Some(hit) = err.downcast_ref::<T>() {
                    return Some(hit);
                }
                link = err.source();
            }
        }
        None
    }
}

impl<E> fmt::Display for AttemptErrors<E>
where
    E: StdError + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed attempts", self.errors.len())?;
        for (i, attempt) in self.errors.iter().enumerate() {
            write!(f, "; [{i}] {attempt}")?;
        }
        Ok(())
    }
}

impl<E> StdError for AttemptErrors<E>
where
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.errors
            .last()
            .map(|attempt| attempt as &(dyn StdError + 'static))
    }
}

/// Why a retry run stopped before its attempt budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortCause {
    /// The cancellation token fired.
    Cancelled,
    /// The deadline passed, or the next wait would have overrun it.
    DeadlineExceeded,
}

impl fmt::Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AbortCause::Cancelled => "cancelled",
            AbortCause::DeadlineExceeded => "deadline exceeded",
        })
    }
}

/// # Outcome of a retry run that did not succeed.
///
/// The three non-fatal outcomes are values a caller can branch on:
/// a filter veto surfaces the raw error, exhaustion and aborts carry the
/// recorded history (aborts additionally tagged with their [`AbortCause`]).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RetryError<E>
where
    E: StdError + 'static,
{
    /// The filter declared the error non-retryable; it is surfaced
    /// verbatim and nothing is aggregated.
    #[error(transparent)]
    Rejected(E),

    /// Every attempt in the budget failed.
    #[error("retry attempts exhausted: {0}")]
    Exhausted(#[source] AttemptErrors<E>),

    /// Cancellation or the deadline ended the run early.
    #[error("retry aborted ({cause}): {errors}")]
    Aborted {
        /// Attempts recorded before the abort.
        #[source]
        errors: AttemptErrors<E>,
        /// What ended the run.
        cause: AbortCause,
    },
}

impl<E> RetryError<E>
where
    E: StdError + 'static,
{
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tryvisor::{AttemptErrors, RetryError};
    ///
    /// let err: RetryError<std::io::Error> = RetryError::Exhausted(AttemptErrors::default());
    /// assert_eq!(err.as_label(), "retry_exhausted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Rejected(_) => "retry_rejected",
            RetryError::Exhausted(_) => "retry_exhausted",
            RetryError::Aborted {
                cause: AbortCause::Cancelled,
                ..
            } => "retry_cancelled",
            RetryError::Aborted {
                cause: AbortCause::DeadlineExceeded,
                ..
            } => "retry_deadline_exceeded",
        }
    }

    /// The recorded attempt history, when this outcome aggregated one.
    ///
    /// [`RetryError::Rejected`] carries none: a filter veto bypasses
    /// aggregation entirely.
    pub fn attempts(&self) -> Option<&AttemptErrors<E>> {
        match self {
            RetryError::Rejected(_) => None,
            RetryError::Exhausted(errors) => Some(errors),
            RetryError::Aborted { errors, .. } => Some(errors),
        }
    }

    /// The abort cause, when the run stopped on cancellation or deadline.
    pub fn abort_cause(&self) -> Option<AbortCause> {
        match self {
            RetryError::Aborted { cause, .. } => Some(*cause),
            _ => None,
        }
    }
}
