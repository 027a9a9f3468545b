//! # tryvisor
//!
//! **Tryvisor** is a small retry library for async Rust.
//!
//! It re-invokes a fallible operation on a jittered exponential backoff
//! schedule, bounded by an attempt budget and/or a deadline, and keeps the
//! full timestamped history of what went wrong. It is designed as a
//! building block for network clients, RPC callers, and job runners that
//! need uniform retry semantics without hand-rolling backoff math or
//! cancellation races.
//!
//! ## Lifecycle
//! ```text
//! Retrier::run(ctx, op)
//!
//! loop {
//!   ├─► op(ctx) ─► Ok ─────────────────► return value
//!   │            └─ Err(e)
//!   ├─► filter says stop ──────────────► RetryError::Rejected(e)
//!   ├─► record { clock.now(), e }
//!   ├─► delay = backoff.next()
//!   ├─► delay > time left to deadline ─► RetryError::Aborted(DeadlineExceeded)
//!   ├─► sleep(delay), interruptible ───► RetryError::Aborted(cause) if cut short
//!   └─► continue
//! }
//! budget exhausted ────────────────────► RetryError::Exhausted(history)
//! ```
//!
//! ## Features
//! | Area             | Description                                              | Key types                        |
//! |------------------|----------------------------------------------------------|----------------------------------|
//! | **Backoff**      | Jittered exponential delays clamped to an envelope.      | [`BackoffPolicy`]                |
//! | **Driving**      | Bounded retry of an async operation.                     | [`Retrier`], [`retry`]           |
//! | **Cancellation** | Token + deadline handle threaded through every call.     | [`RetryContext`]                 |
//! | **Clock**        | Injectable time source for deterministic tests.          | [`Clock`], [`TokioClock`]        |
//! | **Errors**       | Full ordered, timestamped failure history.               | [`RetryError`], [`AttemptErrors`]|
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tryvisor::{Retrier, RetryContext};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut retrier: Retrier<std::io::Error> = Retrier::new(5);
//!     retrier.backoff.min = Duration::from_millis(1);
//!
//!     let ctx = RetryContext::new();
//!     let value = retrier
//!         .run(&ctx, |_ctx| async { Ok::<_, std::io::Error>(42) })
//!         .await
//!         .expect("operation succeeds on the first attempt");
//!     assert_eq!(value, 42);
//! }
//! ```

mod clock;
mod context;
mod error;
mod policies;
mod retry;

pub use clock::{Clock, TokioClock};
pub use context::RetryContext;
pub use error::{AbortCause, AttemptError, AttemptErrors, RetryError};
pub use policies::BackoffPolicy;
pub use retry::{retry, Retrier, RetryFilter};
