//! # Cancellation and deadline handle for retry runs.
//!
//! [`RetryContext`] bundles a [`CancellationToken`] with an optional
//! deadline. The driver threads it through every operation call and every
//! sleep; operations receive a clone and should honor it mid-attempt the
//! way a supervised task honors its token.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::error::AbortCause;

/// Cancellation/deadline handle threaded through a retry run.
///
/// Clones share the underlying token: cancelling any clone cancels them
/// all. The deadline is a plain value copied into clones.
#[derive(Clone, Debug, Default)]
pub struct RetryContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RetryContext {
    /// Context with a fresh token and no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an existing token (e.g. a runtime shutdown token).
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Sets an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Signals cancellation to every clone of this context.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once [`RetryContext::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the token is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// The deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why this context no longer permits waiting, if it doesn't.
    ///
    /// A passed deadline reports [`AbortCause::DeadlineExceeded`] even if
    /// the token has also fired; an explicit cancellation before the
    /// deadline reports [`AbortCause::Cancelled`].
    pub fn cause(&self) -> Option<AbortCause> {
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(AbortCause::DeadlineExceeded);
        }
        if self.token.is_cancelled() {
            return Some(AbortCause::Cancelled);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_has_no_cause() {
        let ctx = RetryContext::new();
        assert!(!ctx.is_cancelled());
        assert!(ctx.deadline().is_none());
        assert!(ctx.cause().is_none());
    }

    #[test]
    fn test_cancel_reports_cancelled() {
        let ctx = RetryContext::new();
        ctx.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.cause(), Some(AbortCause::Cancelled));
    }

    #[test]
    fn test_clones_share_the_token() {
        let ctx = RetryContext::new();
        let clone = ctx.clone();
        clone.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_external_token_drives_the_context() {
        let token = CancellationToken::new();
        let ctx = RetryContext::with_token(token.clone());
        token.cancel();
        assert_eq!(ctx.cause(), Some(AbortCause::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_passed_deadline_reports_deadline_exceeded() {
        let ctx = RetryContext::new().with_timeout(Duration::from_millis(10));
        assert!(ctx.cause().is_none());
        tokio::time::advance(Duration::from_millis(11)).await;
        assert_eq!(ctx.cause(), Some(AbortCause::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_wins_over_cancellation() {
        let ctx = RetryContext::new().with_timeout(Duration::from_millis(10));
        ctx.cancel();
        assert_eq!(ctx.cause(), Some(AbortCause::Cancelled));
        tokio::time::advance(Duration::from_millis(11)).await;
        assert_eq!(ctx.cause(), Some(AbortCause::DeadlineExceeded));
    }
}
