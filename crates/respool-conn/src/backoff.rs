//! Exponential backoff calculation for retry scheduling.

use std::time::Duration;

/// Exponential backoff schedule.
///
/// The delay before the retry following the `n`-th failed attempt is
/// `base * 2^(n - 1)`, capped at a ceiling so repeated failures cannot grow
/// the delay without bound.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
}

impl Backoff {
    /// Default ceiling for a single delay.
    pub const DEFAULT_CAP: Duration = Duration::from_secs(30);

    /// Create a schedule with the default cap.
    #[must_use]
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            cap: Self::DEFAULT_CAP,
        }
    }

    /// Override the delay ceiling.
    #[must_use]
    pub fn cap(mut self, cap: Duration) -> Self {
        self.cap = cap;
        self
    }

    /// Delay to sleep after the `retry`-th failed attempt (1-based).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        // Exponent clamped so the shift stays in range; the cap takes over
        // long before that matters in practice.
        let exp = retry.saturating_sub(1).min(31);
        let factor = 1u32 << exp;
        self.base.saturating_mul(factor).min(self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_delay_doubles_from_base() {
        let backoff = Backoff::new(Duration::from_millis(1000));
        assert_eq!(backoff.delay(1), Duration::from_millis(1000));
        assert_eq!(backoff.delay(2), Duration::from_millis(2000));
        assert_eq!(backoff.delay(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_delay_respects_cap() {
        let backoff = Backoff::new(Duration::from_secs(10)).cap(Duration::from_secs(15));
        assert_eq!(backoff.delay(1), Duration::from_secs(10));
        assert_eq!(backoff.delay(2), Duration::from_secs(15));
        assert_eq!(backoff.delay(10), Duration::from_secs(15));
    }

    proptest! {
        #[test]
        fn prop_delay_is_monotonic(base_ms in 1u64..5_000, retry in 1u32..40) {
            let backoff = Backoff::new(Duration::from_millis(base_ms));
            prop_assert!(backoff.delay(retry + 1) >= backoff.delay(retry));
        }

        #[test]
        fn prop_delay_never_exceeds_cap(base_ms in 1u64..5_000, retry in 1u32..40) {
            let backoff = Backoff::new(Duration::from_millis(base_ms));
            prop_assert!(backoff.delay(retry) <= Backoff::DEFAULT_CAP);
        }
    }
}
