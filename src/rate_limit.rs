//! Client-side quota enforcement.
//!
//! A [`RateLimiter`] tracks three fixed windows that reset periodically rather than sliding:
//! - **per second**: 1000 ms window anchored at the first request after the previous rollover,
//! - **per two minutes**: 120 000 ms window with the same pattern,
//! - **per day** (optional): the local calendar day, rolling over at local midnight.
//!
//! Rollover uses `>=`: a request exactly on a window boundary belongs to the new window.
//! Expired windows are rolled over before any count is read or incremented, including inside
//! the read-style checks [`RateLimiter::can_make_request`] and [`RateLimiter::status`].
//!
//! State is in-memory, owned by one limiter, and lives as long as the limiter does. Construct
//! one limiter per credential/host pair; clones are not provided on purpose so two clients
//! cannot accidentally share a quota.
//!
//! ```rust
//! use riftline::clock::ManualClock;
//! use riftline::{RateLimitConfig, RateLimiter};
//!
//! let clock = ManualClock::new(1_700_000_000_000);
//! let limiter = RateLimiter::new(RateLimitConfig::new(2, 100)).unwrap().with_clock(clock.clone());
//! limiter.record_request();
//! limiter.record_request();
//! assert!(!limiter.can_make_request());
//! clock.advance(1000);
//! assert!(limiter.can_make_request());
//! ```

use crate::clock::{local_day_start, Clock, SystemClock};
use crate::error::{ConfigError, RateLimitError};
use crate::sleeper::{Sleeper, TokioSleeper};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub mod profile;
pub use profile::QuotaProfile;

/// Length of the short window.
pub const SECOND_WINDOW: Duration = Duration::from_millis(1000);
/// Length of the long window.
pub const TWO_MINUTE_WINDOW: Duration = Duration::from_millis(120_000);

const SECOND_WINDOW_MS: u64 = 1000;
const TWO_MINUTE_WINDOW_MS: u64 = 120_000;

/// Quota for one limiter. Immutable once the limiter is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub requests_per_two_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_day: Option<u32>,
}

impl RateLimitConfig {
    pub fn new(requests_per_second: u32, requests_per_two_minutes: u32) -> Self {
        Self { requests_per_second, requests_per_two_minutes, requests_per_day: None }
    }

    /// Add a per-day cap.
    pub fn with_daily_limit(mut self, requests_per_day: u32) -> Self {
        self.requests_per_day = Some(requests_per_day);
        self
    }

    /// Every configured limit must be greater than zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.requests_per_second == 0 {
            return Err(ConfigError::InvalidRateLimit { field: "requests_per_second" });
        }
        if self.requests_per_two_minutes == 0 {
            return Err(ConfigError::InvalidRateLimit { field: "requests_per_two_minutes" });
        }
        if self.requests_per_day == Some(0) {
            return Err(ConfigError::InvalidRateLimit { field: "requests_per_day" });
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        QuotaProfile::Default.config()
    }
}

/// Point-in-time view of a limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub can_make_request: bool,
    pub delay_until_next: Duration,
    /// Requests counted in the current two-minute window.
    pub requests_in_window: u32,
    /// Requests counted in the current per-second window.
    pub requests_in_last_second: u32,
    /// Requests counted today; stays 0 when no daily cap is configured.
    pub daily_requests: u32,
    /// Epoch millis of the most recent recorded request.
    pub last_request_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RateLimitState {
    second_window_start: u64,
    requests_in_last_second: u32,
    window_start_time: u64,
    request_count: u32,
    daily_window_start: u64,
    daily_request_count: u32,
    last_request_time: Option<u64>,
}

impl RateLimitState {
    fn fresh(now: u64) -> Self {
        Self {
            second_window_start: now,
            requests_in_last_second: 0,
            window_start_time: now,
            request_count: 0,
            daily_window_start: local_day_start(now),
            daily_request_count: 0,
            last_request_time: None,
        }
    }

    fn roll_windows(&mut self, now: u64, config: &RateLimitConfig) {
        if now.saturating_sub(self.second_window_start) >= SECOND_WINDOW_MS {
            self.second_window_start = now;
            self.requests_in_last_second = 0;
        }
        if now.saturating_sub(self.window_start_time) >= TWO_MINUTE_WINDOW_MS {
            self.window_start_time = now;
            self.request_count = 0;
        }
        if config.requests_per_day.is_some() {
            let today = local_day_start(now);
            if today != self.daily_window_start {
                self.daily_window_start = today;
                self.daily_request_count = 0;
            }
        }
    }

    fn daily_exhausted(&self, config: &RateLimitConfig) -> bool {
        config.requests_per_day.is_some_and(|limit| self.daily_request_count >= limit)
    }

    fn admits(&self, now: u64, config: &RateLimitConfig) -> bool {
        !self.daily_exhausted(config) && self.delay_millis(now, config) == 0
    }

    /// Time until both short windows admit again. Pure: no rollover.
    fn delay_millis(&self, now: u64, config: &RateLimitConfig) -> u64 {
        let in_second = now.saturating_sub(self.second_window_start);
        let second = if in_second < SECOND_WINDOW_MS
            && self.requests_in_last_second >= config.requests_per_second
        {
            SECOND_WINDOW_MS - in_second
        } else {
            0
        };

        let two_minutes = if self.request_count >= config.requests_per_two_minutes {
            TWO_MINUTE_WINDOW_MS.saturating_sub(now.saturating_sub(self.window_start_time))
        } else {
            0
        };

        second.max(two_minutes)
    }

    fn record(&mut self, now: u64, config: &RateLimitConfig) {
        self.last_request_time = Some(now);
        self.requests_in_last_second = self.requests_in_last_second.saturating_add(1);
        self.request_count = self.request_count.saturating_add(1);
        if config.requests_per_day.is_some() {
            self.daily_request_count = self.daily_request_count.saturating_add(1);
        }
    }
}

enum Admission {
    Admitted,
    Wait(Duration),
    Exhausted { limit: u32 },
}

/// Multi-window request gate.
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<RateLimitState>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("state", &*self.lock())
            .field("clock", &self.clock)
            .field("sleeper", &"<sleeper>")
            .finish()
    }
}

impl RateLimiter {
    /// Build a limiter, rejecting zero limits.
    pub fn new(config: RateLimitConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Build a limiter from a named preset.
    pub fn for_profile(profile: QuotaProfile) -> Self {
        Self::from_valid(profile.config())
    }

    pub(crate) fn from_valid(config: RateLimitConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let state = Mutex::new(RateLimitState::fresh(clock.now_millis()));
        Self { config, state, clock, sleeper: Arc::new(TokioSleeper) }
    }

    /// Override the clock; window anchors restart at the new clock's "now".
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.set_clock(Arc::new(clock));
        self
    }

    /// Override how the limiter waits.
    pub fn with_sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.set_sleeper(Arc::new(sleeper));
        self
    }

    pub(crate) fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
        self.state = Mutex::new(RateLimitState::fresh(self.clock.now_millis()));
    }

    pub(crate) fn set_sleeper(&mut self, sleeper: Arc<dyn Sleeper>) {
        self.sleeper = sleeper;
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// True when no configured limit is exhausted. Rolls expired windows over first.
    pub fn can_make_request(&self) -> bool {
        let now = self.clock.now_millis();
        let mut state = self.lock();
        state.roll_windows(now, &self.config);
        state.admits(now, &self.config)
    }

    /// Count one request against every window.
    pub fn record_request(&self) {
        let now = self.clock.now_millis();
        let mut state = self.lock();
        state.roll_windows(now, &self.config);
        state.record(now, &self.config);
    }

    /// Longest remaining wait across the per-second and two-minute windows.
    ///
    /// Daily exhaustion has no short-term recovery and is not reflected here; see
    /// [`can_make_request`](Self::can_make_request).
    pub fn delay_until_next_request(&self) -> Duration {
        let now = self.clock.now_millis();
        Duration::from_millis(self.lock().delay_millis(now, &self.config))
    }

    /// Suspend until [`delay_until_next_request`](Self::delay_until_next_request) has elapsed.
    pub async fn wait_for_next_request(&self) {
        let delay = self.delay_until_next_request();
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "rate limiter delaying request");
            self.sleeper.sleep(delay).await;
        }
    }

    /// Wait until admitted, then record the request in the same critical section.
    ///
    /// Waiters re-check after every wake-up; whichever re-checks first after a rollover wins.
    /// A spent daily quota is reported immediately instead of waiting for midnight.
    pub async fn acquire(&self) -> Result<(), RateLimitError> {
        loop {
            match self.try_admit() {
                Admission::Admitted => return Ok(()),
                Admission::Exhausted { limit } => {
                    tracing::warn!(limit, "daily request quota exhausted");
                    return Err(RateLimitError::DailyQuotaExhausted { limit });
                }
                Admission::Wait(delay) => {
                    tracing::debug!(
                        delay_ms = delay.as_millis() as u64,
                        "rate limiter delaying request"
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }

    fn try_admit(&self) -> Admission {
        let now = self.clock.now_millis();
        let mut state = self.lock();
        state.roll_windows(now, &self.config);
        if let Some(limit) = self.config.requests_per_day {
            if state.daily_exhausted(&self.config) {
                return Admission::Exhausted { limit };
            }
        }
        match state.delay_millis(now, &self.config) {
            0 => {
                state.record(now, &self.config);
                Admission::Admitted
            }
            delay => Admission::Wait(Duration::from_millis(delay)),
        }
    }

    /// Snapshot of the limiter. Rolls expired windows over first.
    pub fn status(&self) -> RateLimitStatus {
        let now = self.clock.now_millis();
        let mut state = self.lock();
        state.roll_windows(now, &self.config);
        RateLimitStatus {
            can_make_request: state.admits(now, &self.config),
            delay_until_next: Duration::from_millis(state.delay_millis(now, &self.config)),
            requests_in_window: state.request_count,
            requests_in_last_second: state.requests_in_last_second,
            daily_requests: state.daily_request_count,
            last_request_at: state.last_request_time,
        }
    }

    /// Zero every counter and re-anchor every window at "now".
    pub fn reset(&self) {
        let now = self.clock.now_millis();
        *self.lock() = RateLimitState::fresh(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sleeper::ClockSleeper;

    const T0: u64 = 1_700_000_000_000;

    fn limiter(config: RateLimitConfig) -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new(T0);
        let limiter = RateLimiter::new(config)
            .unwrap()
            .with_clock(clock.clone())
            .with_sleeper(ClockSleeper::new(clock.clone()));
        (limiter, clock)
    }

    #[test]
    fn rejects_zero_limits() {
        assert_eq!(
            RateLimiter::new(RateLimitConfig::new(0, 100)).unwrap_err(),
            ConfigError::InvalidRateLimit { field: "requests_per_second" }
        );
        assert!(RateLimiter::new(RateLimitConfig::new(1, 0)).is_err());
        assert!(RateLimiter::new(RateLimitConfig::new(1, 1).with_daily_limit(0)).is_err());
    }

    #[test]
    fn fresh_limiter_admits() {
        let (limiter, _) = limiter(RateLimitConfig::new(20, 100));
        assert!(limiter.can_make_request());
        assert_eq!(limiter.delay_until_next_request(), Duration::ZERO);
    }

    #[test]
    fn second_window_exhaustion_reports_remaining_time() {
        let (limiter, clock) = limiter(RateLimitConfig::new(3, 100));
        for _ in 0..3 {
            limiter.record_request();
        }
        clock.advance(400);
        assert!(!limiter.can_make_request());
        assert_eq!(limiter.delay_until_next_request(), Duration::from_millis(600));
    }

    #[test]
    fn boundary_request_belongs_to_new_window() {
        let (limiter, clock) = limiter(RateLimitConfig::new(1, 100));
        limiter.record_request();
        clock.advance(999);
        assert!(!limiter.can_make_request());
        clock.advance(1);
        assert!(limiter.can_make_request());
        assert_eq!(limiter.status().requests_in_last_second, 0);
    }

    #[test]
    fn two_minute_window_dominates_delay() {
        let (limiter, clock) = limiter(RateLimitConfig::new(5, 5));
        for _ in 0..5 {
            limiter.record_request();
        }
        clock.advance(20_000);
        assert!(!limiter.can_make_request());
        assert_eq!(limiter.delay_until_next_request(), Duration::from_millis(100_000));
    }

    #[test]
    fn delay_does_not_roll_windows() {
        let (limiter, clock) = limiter(RateLimitConfig::new(1, 100));
        limiter.record_request();
        clock.advance(5_000);
        assert_eq!(limiter.delay_until_next_request(), Duration::ZERO);
        // status() performs the rollover that the pure delay query skipped
        let snapshot = limiter.lock().clone();
        assert_eq!(snapshot.requests_in_last_second, 1);
        assert_eq!(limiter.status().requests_in_last_second, 0);
    }

    #[test]
    fn last_request_time_is_tracked() {
        let (limiter, clock) = limiter(RateLimitConfig::new(10, 100));
        assert_eq!(limiter.status().last_request_at, None);
        clock.advance(250);
        limiter.record_request();
        assert_eq!(limiter.status().last_request_at, Some(T0 + 250));
    }

    #[test]
    fn daily_limit_blocks_without_delay() {
        let (limiter, _) = limiter(RateLimitConfig::new(10, 100).with_daily_limit(2));
        limiter.record_request();
        limiter.record_request();
        let status = limiter.status();
        assert!(!status.can_make_request);
        assert_eq!(status.delay_until_next, Duration::ZERO);
        assert_eq!(status.daily_requests, 2);
    }

    #[test]
    fn daily_counter_stays_zero_without_cap() {
        let (limiter, _) = limiter(RateLimitConfig::new(10, 100));
        limiter.record_request();
        assert_eq!(limiter.status().daily_requests, 0);
    }

    #[tokio::test]
    async fn acquire_waits_for_rollover_then_records() {
        let (limiter, clock) = limiter(RateLimitConfig::new(1, 100));
        limiter.acquire().await.unwrap();
        limiter.acquire().await.unwrap();
        assert_eq!(clock.now_millis(), T0 + 1000);
        assert_eq!(limiter.status().requests_in_window, 2);
    }

    #[tokio::test]
    async fn acquire_refuses_spent_daily_quota() {
        let (limiter, _) = limiter(RateLimitConfig::new(10, 100).with_daily_limit(1));
        limiter.acquire().await.unwrap();
        assert_eq!(
            limiter.acquire().await,
            Err(RateLimitError::DailyQuotaExhausted { limit: 1 })
        );
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_admissible() {
        let clock = ManualClock::new(T0);
        let sleeper = ClockSleeper::new(clock.clone());
        let limiter = RateLimiter::new(RateLimitConfig::new(1, 100))
            .unwrap()
            .with_clock(clock.clone())
            .with_sleeper(sleeper.clone());

        limiter.wait_for_next_request().await;
        assert!(sleeper.calls().is_empty());

        limiter.record_request();
        limiter.wait_for_next_request().await;
        assert_eq!(sleeper.calls(), vec![Duration::from_millis(1000)]);
    }
}
