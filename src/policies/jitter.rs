//! # Jitter draws for backoff delays.
//!
//! [`JitterSource`] produces the random fraction applied to a computed
//! backoff delay. Three draw shapes exist, chosen by where the unjittered
//! delay landed relative to the configured envelope:
//!
//! - symmetric: fraction in `[-width, +width]` (delay strictly inside the envelope)
//! - downward: fraction in `[-width, 0]` (delay clamped to the cap)
//! - upward: fraction in `[0, +width]` (delay clamped to the floor)
//!
//! Every draw is mapped from a single unit sample, so a width outside the
//! intended `(0, 1)` domain yields oversized or inverted swings instead of
//! panicking.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of uniform jitter fractions.
///
/// Defaults to the thread-local generator. [`JitterSource::seeded`] swaps in
/// a deterministic stream; cloning a seeded source clones its state, so
/// clones replay the same sequence.
#[derive(Clone, Debug)]
pub(crate) enum JitterSource {
    /// Thread-local generator; clones draw independent streams.
    Thread,
    /// Deterministic stream from a fixed seed.
    Seeded(SmallRng),
}

impl Default for JitterSource {
    fn default() -> Self {
        JitterSource::Thread
    }
}

impl JitterSource {
    pub(crate) fn seeded(seed: u64) -> Self {
        JitterSource::Seeded(SmallRng::seed_from_u64(seed))
    }

    /// Uniform sample on `[0, 1)`.
    fn unit(&mut self) -> f64 {
        match self {
            JitterSource::Thread => rand::rng().random::<f64>(),
            JitterSource::Seeded(rng) => rng.random::<f64>(),
        }
    }

    /// Fraction on `[-width, +width]`.
    pub(crate) fn symmetric(&mut self, width: f64) -> f64 {
        width * (self.unit() - 0.5) * 2.0
    }

    /// Fraction on `[-width, 0]`; used when the delay sits at the cap.
    pub(crate) fn downward(&mut self, width: f64) -> f64 {
        -width * self.unit()
    }

    /// Fraction on `[0, +width]`; used when the delay sits at the floor.
    pub(crate) fn upward(&mut self, width: f64) -> f64 {
        width * self.unit()
    }
}
