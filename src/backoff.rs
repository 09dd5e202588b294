//! Backoff schedule for the dispatcher's retry loop.
//!
//! Attempt semantics: attempt index `0` is the initial call (no delay), and retries start at
//! `attempt = 1`. With an exponential base of one second the waits between four attempts are
//! 1 s, 2 s and 4 s.
//!
//! ```rust
//! use std::time::Duration;
//! use riftline::Backoff;
//!
//! let backoff = Backoff::exponential(Duration::from_millis(1000));
//! assert_eq!(backoff.delay(0), Duration::ZERO);
//! assert_eq!(backoff.delay(1), Duration::from_millis(1000));
//! assert_eq!(backoff.delay(3), Duration::from_millis(4000));
//! ```
//!
//! Computations that would overflow saturate to [`MAX_BACKOFF`] (1 day).

use std::time::Duration;

/// Maximum delay used when calculations overflow (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Exponential delay schedule between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
}

impl Backoff {
    /// `base * 2^(attempt - 1)` before retry number `attempt`.
    pub fn exponential(base: Duration) -> Self {
        Self { base }
    }

    /// Delay before `attempt` (0-based; 0 = initial call, no delay).
    pub fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
        let multiplier = 2u128.saturating_pow(exponent);
        let nanos = self.base.as_nanos().saturating_mul(multiplier);
        Duration::from_nanos(nanos.min(MAX_BACKOFF.as_nanos()) as u64)
    }
}
