//! Adaptive pacing for banner grabbing.
//!
//! Every attempt feeds a success/failure signal into one process-wide
//! [`RateController`]. Its factor scales every jittered delay, so a burst of
//! failures anywhere slows all workers down and a run of banners speeds
//! them back up.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Inclusive-exclusive jitter window in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterBounds {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl JitterBounds {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Scale both bounds by `factor`.
    pub fn scaled(self, factor: f64) -> (Duration, Duration) {
        (
            Duration::from_millis(self.min_ms).mul_f64(factor),
            Duration::from_millis(self.max_ms).mul_f64(factor),
        )
    }
}

/// Delay before the first connect of every task.
pub const STAGGER_JITTER: JitterBounds = JitterBounds::new(100, 500);
/// Delay after a failed connect or a silent attempt.
pub const RETRY_JITTER: JitterBounds = JitterBounds::new(1000, 3000);
/// Delay after each probe write and each successful read.
pub const PROBE_JITTER: JitterBounds = JitterBounds::new(500, 1000);

/// Shared feedback value scaling every jittered delay.
///
/// The factor lives in an `AtomicU64` as raw `f64` bits; updates are a
/// compare-and-swap loop so concurrent workers never lose an update.
#[derive(Debug)]
pub struct RateController {
    bits: AtomicU64,
}

impl RateController {
    pub const INITIAL: f64 = 1.0;
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 2.0;
    const SPEED_UP: f64 = 0.9;
    const SLOW_DOWN: f64 = 1.1;

    pub fn new() -> Self {
        Self {
            bits: AtomicU64::new(Self::INITIAL.to_bits()),
        }
    }

    /// Record the outcome of one attempt.
    pub fn record(&self, success: bool) {
        let multiplier = if success {
            Self::SPEED_UP
        } else {
            Self::SLOW_DOWN
        };

        // The closure always returns Some, so this never fails.
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let next = (f64::from_bits(bits) * multiplier).clamp(Self::MIN, Self::MAX);
                Some(next.to_bits())
            });
    }

    /// Current factor, always within `[MIN, MAX]`.
    pub fn factor(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl Default for RateController {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of randomized delays.
///
/// Production code uses [`RandomJitter`]; tests swap in [`NoJitter`] or a
/// recording implementation to avoid real waits.
pub trait Jitter: Send + Sync {
    /// Pick a delay in `[min, max]`.
    fn pick(&self, min: Duration, max: Duration) -> Duration;
}

/// Uniformly random delays from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn pick(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..max)
    }
}

/// Zero-length delays.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn pick(&self, _min: Duration, _max: Duration) -> Duration {
        Duration::ZERO
    }
}

/// Couples the shared rate factor with a jitter source.
#[derive(Clone)]
pub struct Pacer {
    rate: Arc<RateController>,
    jitter: Arc<dyn Jitter>,
}

impl Pacer {
    pub fn new(rate: Arc<RateController>, jitter: Arc<dyn Jitter>) -> Self {
        Self { rate, jitter }
    }

    /// Sleep for a jittered delay in `bounds`, scaled by the current factor.
    pub async fn pause(&self, bounds: JitterBounds) {
        let (min, max) = bounds.scaled(self.rate.factor());
        let delay = self.jitter.pick(min, max);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn record(&self, success: bool) {
        self.rate.record(success);
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(Arc::new(RateController::new()), Arc::new(RandomJitter))
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("factor", &self.rate.factor())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_starts_at_one() {
        assert_eq!(RateController::new().factor(), 1.0);
    }

    #[test]
    fn test_success_speeds_up() {
        let rate = RateController::new();
        rate.record(true);
        assert!((rate.factor() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_failure_slows_down() {
        let rate = RateController::new();
        rate.record(false);
        assert!((rate.factor() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_both_ways() {
        let rate = RateController::new();
        for _ in 0..100 {
            rate.record(false);
        }
        assert_eq!(rate.factor(), RateController::MAX);
        for _ in 0..100 {
            rate.record(true);
        }
        assert_eq!(rate.factor(), RateController::MIN);
    }

    #[test]
    fn test_concurrent_updates_stay_in_bounds() {
        let rate = Arc::new(RateController::new());
        let observed = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..16)
            .map(|worker| {
                let rate = Arc::clone(&rate);
                let observed = Arc::clone(&observed);
                std::thread::spawn(move || {
                    let mut seen = Vec::with_capacity(2000);
                    for i in 0..2000 {
                        // Mix of mostly-failing and mostly-succeeding workers.
                        let success = if worker % 2 == 0 { i % 5 == 0 } else { i % 5 != 0 };
                        rate.record(success);
                        seen.push(rate.factor());
                    }
                    observed.lock().unwrap().extend(seen);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let observed = observed.lock().unwrap();
        assert_eq!(observed.len(), 16 * 2000);
        assert!(observed
            .iter()
            .all(|f| (RateController::MIN..=RateController::MAX).contains(f)));
        assert!((RateController::MIN..=RateController::MAX).contains(&rate.factor()));
    }

    #[test]
    fn test_concurrent_failures_are_not_lost() {
        // 3 x 1.1 > 1.3; with no lost updates the factor must exceed it.
        let rate = Arc::new(RateController::new());
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let rate = Arc::clone(&rate);
                std::thread::spawn(move || rate.record(false))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!((rate.factor() - 1.331).abs() < 1e-9);
    }

    #[test]
    fn test_random_jitter_within_bounds() {
        let jitter = RandomJitter;
        let min = Duration::from_millis(500);
        let max = Duration::from_millis(1000);
        for _ in 0..1000 {
            let d = jitter.pick(min, max);
            assert!(d >= min && d <= max);
        }
        assert_eq!(jitter.pick(max, max), max);
    }

    #[test]
    fn test_bounds_scale_with_factor() {
        let (min, max) = RETRY_JITTER.scaled(2.0);
        assert_eq!(min, Duration::from_millis(2000));
        assert_eq!(max, Duration::from_millis(6000));
        let (min, max) = PROBE_JITTER.scaled(0.5);
        assert_eq!(min, Duration::from_millis(250));
        assert_eq!(max, Duration::from_millis(500));
    }
}
