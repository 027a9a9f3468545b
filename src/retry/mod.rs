//! Retry driving.
//!
//! ## Contents
//! - [`Retrier`] the reusable driver (backoff + filter + budget + clock)
//! - [`retry`] one-shot convenience entry point
//! - [`RetryFilter`] continue/stop predicate alias

mod retrier;

pub use retrier::{retry, Retrier, RetryFilter};
