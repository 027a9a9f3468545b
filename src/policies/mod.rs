//! Backoff policy.
//!
//! The knobs that control **how long** to wait between attempts.
//!
//! ## Contents
//! - [`BackoffPolicy`] jittered exponential delay generator (min / max / jitter / factor)
//!
//! Jitter draws live in the crate-private `jitter` module; seed them through
//! [`BackoffPolicy::with_seed`] when tests need deterministic delays.
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → min=1ms, max=60s, jitter=0.1, factor=1.2.

mod backoff;
pub(crate) mod jitter;

pub use backoff::BackoffPolicy;
