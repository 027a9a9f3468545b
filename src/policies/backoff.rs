//! # Backoff delay generator.
//!
//! [`BackoffPolicy`] produces the sequence of waits between retry attempts.
//! It is parameterized by:
//! - [`BackoffPolicy::min`] the floor of the delay envelope (also the first delay);
//! - [`BackoffPolicy::max`] the cap of the delay envelope;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::jitter`] the fractional jitter width.
//!
//! The delay for step `n` is `min × factor^n` clamped to `[min, max]`, with
//! jitter applied on top. Jitter is symmetric inside the envelope and
//! one-sided at its edges: at the cap it only pulls down, at the floor it
//! only pushes up, so the sequence never leaves `[min, max]` while every
//! step still varies.
//!
//! The base delay is derived purely from the step index; jitter output never
//! feeds back into subsequent calculations.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use tryvisor::BackoffPolicy;
//!
//! let mut backoff = BackoffPolicy::default();
//! backoff.min = Duration::from_millis(100);
//! backoff.max = Duration::from_secs(10);
//! backoff.factor = 2.0;
//! backoff.jitter = 0.0;
//!
//! // Step 0 sits at the floor: exactly `min`.
//! assert_eq!(backoff.for_step(0), Duration::from_millis(100));
//!
//! // Step 1: min × factor^1 = 200ms.
//! assert_eq!(backoff.for_step(1), Duration::from_millis(200));
//!
//! // Step 10: 100ms × 2^10 = 102_400ms, capped at max = 10s.
//! assert_eq!(backoff.for_step(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterSource;

/// Jittered exponential backoff generator.
///
/// The four public fields are the configuration; the step counter and the
/// jitter source are internal. Cloning is a deep value copy (step and any
/// seeded jitter state included), so a clone can be advanced or reset
/// without affecting the original.
#[derive(Clone, Debug)]
pub struct BackoffPolicy {
    /// Floor of the delay envelope; also the unjittered first delay.
    pub min: Duration,
    /// Cap of the delay envelope. Must be `>= min`; equal bounds give a
    /// constant delay.
    pub max: Duration,
    /// Fractional jitter width. Intended domain is `(0, 1)`; values outside
    /// are accepted and produce oversized or inverted swings.
    pub jitter: f64,
    /// Multiplicative growth factor. Intended domain is `> 1`; values `<= 1`
    /// never grow (or shrink toward the floor).
    pub factor: f64,
    /// Nth-attempt index consumed by [`BackoffPolicy::next`].
    step: u32,
    rng: JitterSource,
}

impl Default for BackoffPolicy {
    /// Returns a generator with:
    /// - `min = 1ms`;
    /// - `max = 60s`;
    /// - `jitter = 0.1`;
    /// - `factor = 1.2`.
    fn default() -> Self {
        Self {
            min: Duration::from_millis(1),
            max: Duration::from_secs(60),
            jitter: 0.1,
            factor: 1.2,
            step: 0,
            rng: JitterSource::Thread,
        }
    }
}

impl BackoffPolicy {
    /// Creates a generator with explicit envelope and growth parameters.
    pub fn new(min: Duration, max: Duration, jitter: f64, factor: f64) -> Self {
        Self {
            min,
            max,
            jitter,
            factor,
            step: 0,
            rng: JitterSource::Thread,
        }
    }

    /// Replaces the jitter source with a deterministic seeded stream.
    ///
    /// Clones of a seeded generator replay the same delay sequence, which
    /// makes jitter bounds testable.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = JitterSource::seeded(seed);
        self
    }

    /// Computes the delay for the given step (0-indexed).
    ///
    /// Pure in `n` and the configuration fields: the internal step counter
    /// is neither read nor advanced. `&mut self` is only for the jitter
    /// draw.
    ///
    /// The unjittered magnitude `min × factor^n` is clamped to `[0, max]`
    /// on the nanosecond axis (non-finite overflow collapses to `max`).
    /// Where it lands picks the jitter shape:
    /// - at or above `max`: clamp to `max`, jitter downward only;
    /// - at or below `min`: clamp to `min`, jitter upward only;
    /// - otherwise: symmetric jitter.
    ///
    /// The jittered result is clamped to `[min, max]` once more before
    /// returning.
    ///
    /// # Panics
    /// Panics if `min > max`; that configuration has no meaningful delay
    /// and is treated as a programming error.
    pub fn for_step(&mut self, n: u32) -> Duration {
        assert!(
            self.min <= self.max,
            "min backoff ({:?}) exceeds max backoff ({:?})",
            self.min,
            self.max
        );

        let max_ns = self.max.as_nanos() as f64;
        let unclamped = self.min.as_nanos() as f64 * self.factor.powf(f64::from(n));
        let clamped_ns = if unclamped.is_finite() {
            unclamped.clamp(0.0, max_ns)
        } else {
            max_ns
        };

        let mut backoff = Duration::from_nanos(clamped_ns as u64);
        let frac = if backoff >= self.max {
            backoff = self.max;
            self.rng.downward(self.jitter)
        } else if backoff <= self.min {
            backoff = self.min;
            self.rng.upward(self.jitter)
        } else {
            self.rng.symmetric(self.jitter)
        };

        // Saturating cast: a fraction below -1.0 (jitter > 1) bottoms out at zero.
        let jittered_ns = backoff.as_nanos() as f64 * (1.0 + frac);
        Duration::from_nanos(jittered_ns as u64).clamp(self.min, self.max)
    }

    /// Returns the next delay in the sequence and advances the step counter.
    pub fn next(&mut self) -> Duration {
        let backoff = self.for_step(self.step);
        self.step += 1;
        backoff
    }

    /// Rewinds the step counter to zero; every other field is untouched.
    pub fn reset(&mut self) {
        self.step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds_policy(seed: u64) -> BackoffPolicy {
        let mut policy = BackoffPolicy::default().with_seed(seed);
        policy.min = Duration::from_secs(1);
        policy.max = Duration::from_secs(60);
        policy
    }

    #[test]
    fn test_step_zero_within_upward_band() {
        let mut policy = seconds_policy(11);
        for _ in 0..200 {
            let delay = policy.for_step(0);
            assert!(delay >= policy.min, "step 0 delay {:?} below floor", delay);
            assert!(
                delay <= Duration::from_millis(1100),
                "step 0 delay {:?} above min*(1+jitter)",
                delay
            );
        }
    }

    #[test]
    fn test_all_steps_stay_in_envelope() {
        let mut policy = seconds_policy(12);
        for n in 0..200 {
            let delay = policy.for_step(n);
            assert!(delay >= policy.min, "step {} delay {:?} below floor", n, delay);
            assert!(delay <= policy.max, "step {} delay {:?} above cap", n, delay);
        }
    }

    #[test]
    fn test_saturated_steps_within_downward_band() {
        let mut policy = seconds_policy(13);
        // 1s * 1.2^n passes 60s shortly after n = 22.
        for n in 30..80 {
            let delay = policy.for_step(n);
            assert!(
                delay >= Duration::from_secs(54),
                "saturated step {} delay {:?} below max*(1-jitter)",
                n,
                delay
            );
            assert!(delay <= policy.max, "saturated step {} delay {:?} above cap", n, delay);
        }
    }

    #[test]
    fn test_exponential_growth_no_jitter() {
        let mut policy = BackoffPolicy::new(
            Duration::from_millis(100),
            Duration::from_secs(30),
            0.0,
            2.0,
        );
        assert_eq!(policy.for_step(0), Duration::from_millis(100));
        assert_eq!(policy.for_step(1), Duration::from_millis(200));
        assert_eq!(policy.for_step(2), Duration::from_millis(400));
        assert_eq!(policy.for_step(3), Duration::from_millis(800));
        assert_eq!(policy.for_step(4), Duration::from_millis(1600));
    }

    #[test]
    fn test_unjittered_envelope_monotonic() {
        let mut policy =
            BackoffPolicy::new(Duration::from_millis(3), Duration::from_secs(10), 0.0, 1.7);
        let mut prev = Duration::ZERO;
        for n in 0..100 {
            let delay = policy.for_step(n);
            assert!(
                delay >= prev,
                "unjittered delay shrank at step {}: {:?} < {:?}",
                n,
                delay,
                prev
            );
            prev = delay;
        }
        assert_eq!(prev, Duration::from_secs(10));
    }

    #[test]
    fn test_constant_factor_stays_at_floor() {
        let mut policy =
            BackoffPolicy::new(Duration::from_millis(500), Duration::from_secs(30), 0.0, 1.0);
        for n in 0..10 {
            assert_eq!(
                policy.for_step(n),
                Duration::from_millis(500),
                "step {} should stay constant at 500ms",
                n
            );
        }
    }

    #[test]
    fn test_huge_step_clamps_to_max() {
        let mut policy =
            BackoffPolicy::new(Duration::from_millis(100), Duration::from_secs(60), 0.0, 2.0);
        assert_eq!(policy.for_step(100), Duration::from_secs(60));
    }

    #[test]
    fn test_non_finite_overflow_clamps_to_max() {
        let mut policy =
            BackoffPolicy::new(Duration::from_millis(100), Duration::from_secs(10), 0.0, 2.0);
        assert_eq!(policy.for_step(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    #[should_panic(expected = "exceeds max backoff")]
    fn test_inverted_envelope_panics() {
        let mut policy =
            BackoffPolicy::new(Duration::from_secs(10), Duration::from_secs(1), 0.1, 2.0);
        policy.for_step(0);
    }

    #[test]
    fn test_next_is_stateful() {
        let template = seconds_policy(21);
        let mut sequence = template.clone();
        let mut indexed = template.clone();

        // Same seed, one draw per call: next() must track for_step(0), for_step(1), ...
        assert_eq!(sequence.next(), indexed.for_step(0));
        assert_eq!(sequence.next(), indexed.for_step(1));
        assert_eq!(sequence.next(), indexed.for_step(2));
    }

    #[test]
    fn test_next_never_repeats_consecutively() {
        let mut policy = seconds_policy(31);
        policy.factor = 1.2;
        policy.jitter = 0.1;

        let mut prev = policy.next();
        for i in 1..1000 {
            let delay = policy.next();
            assert_ne!(delay, prev, "jitter produced identical consecutive delays at i={}", i);
            assert!(delay >= policy.min && delay <= policy.max);
            // 1s * 1.2^17 is past 20s; from there the sequence must not dip back.
            if i > 17 {
                assert!(
                    delay >= Duration::from_secs(20),
                    "delay {:?} below 20s after {} iterations",
                    delay,
                    i
                );
            }
            prev = delay;
        }
    }

    #[test]
    fn test_clone_and_reset_leave_original_untouched() {
        let mut original = BackoffPolicy::new(
            Duration::from_millis(100),
            Duration::from_secs(30),
            0.0,
            2.0,
        );
        original.next();
        original.next();

        let mut copy = original.clone();
        copy.reset();
        assert_eq!(copy.step, 0);
        assert_eq!(original.step, 2);

        // The original resumes at its own step, unaffected by the clone.
        assert_eq!(original.next(), Duration::from_millis(400));
        assert_eq!(copy.next(), Duration::from_millis(100));
    }

    #[test]
    fn test_seeded_clones_replay_identical_sequences() {
        let template = seconds_policy(99);
        let mut a = template.clone();
        let mut b = template.clone();
        for _ in 0..50 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.min, Duration::from_millis(1));
        assert_eq!(policy.max, Duration::from_secs(60));
        assert_eq!(policy.jitter, 0.1);
        assert_eq!(policy.factor, 1.2);
        assert_eq!(policy.step, 0);
    }
}
