mod common;

use chrono::{Local, TimeZone};
use common::T0;
use riftline::{ClockSleeper, ManualClock, QuotaProfile, RateLimitConfig, RateLimiter};
use std::sync::Arc;
use std::time::Duration;

fn limiter(config: RateLimitConfig) -> (RateLimiter, ManualClock) {
    let clock = ManualClock::new(T0);
    let limiter = RateLimiter::new(config)
        .expect("valid config")
        .with_clock(clock.clone())
        .with_sleeper(ClockSleeper::new(clock.clone()));
    (limiter, clock)
}

fn local_millis(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> u64 {
    let at = Local
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .earliest()
        .expect("representable local time");
    u64::try_from(at.timestamp_millis()).expect("after epoch")
}

#[test]
fn per_second_window_rolls_over_after_one_second() {
    let (limiter, clock) = limiter(RateLimitConfig::new(5, 100));
    for _ in 0..5 {
        limiter.record_request();
    }
    assert!(!limiter.can_make_request());

    clock.advance(1000);
    assert!(limiter.can_make_request());
    assert_eq!(limiter.status().requests_in_last_second, 0);
}

#[test]
fn windows_are_independent() {
    // second window exhausted, two-minute window has room
    let (limiter, clock) = limiter(RateLimitConfig::new(2, 100));
    limiter.record_request();
    limiter.record_request();
    let status = limiter.status();
    assert!(!status.can_make_request);
    assert_eq!(status.requests_in_window, 2);
    clock.advance(1000);
    assert!(limiter.can_make_request());

    // two-minute window exhausted while the second window keeps rolling
    let (limiter, clock) = self::limiter(RateLimitConfig::new(10, 3));
    for _ in 0..3 {
        limiter.record_request();
        clock.advance(1000);
    }
    let status = limiter.status();
    assert_eq!(status.requests_in_last_second, 0);
    assert!(!status.can_make_request);
    assert_eq!(status.delay_until_next, Duration::from_millis(117_000));
}

#[test]
fn delay_is_zero_exactly_when_admissible() {
    let (limiter, clock) = limiter(RateLimitConfig::new(3, 7));
    for step in 0..40u64 {
        let delay = limiter.delay_until_next_request();
        let admissible = limiter.can_make_request();
        assert_eq!(delay.is_zero(), admissible, "step {step}");
        if admissible {
            limiter.record_request();
        }
        clock.advance(150 + step * 37);
    }
}

#[test]
fn daily_window_splits_at_local_midnight() {
    let before_midnight = local_millis(2024, 3, 14, 23, 59, 59);
    let after_midnight = local_millis(2024, 3, 15, 0, 0, 1);

    let clock = ManualClock::new(before_midnight);
    let limiter = RateLimiter::new(RateLimitConfig::new(10, 100).with_daily_limit(50))
        .unwrap()
        .with_clock(clock.clone());

    limiter.record_request();
    assert_eq!(limiter.status().daily_requests, 1);

    clock.set(after_midnight);
    limiter.record_request();
    assert_eq!(limiter.status().daily_requests, 1);
}

#[test]
fn reset_clears_an_exhausted_limiter() {
    let (limiter, _) = limiter(RateLimitConfig::new(2, 2).with_daily_limit(2));
    limiter.record_request();
    limiter.record_request();
    assert!(!limiter.can_make_request());

    limiter.reset();

    let status = limiter.status();
    assert!(status.can_make_request);
    assert_eq!(status.requests_in_last_second, 0);
    assert_eq!(status.requests_in_window, 0);
    assert_eq!(status.daily_requests, 0);
    assert_eq!(status.delay_until_next, Duration::ZERO);

    limiter.reset();
    assert!(limiter.can_make_request());
}

#[test]
fn two_minute_count_survives_second_rollover() {
    let (limiter, clock) = limiter(RateLimitConfig::new(2, 100));
    limiter.record_request();
    limiter.record_request();
    assert!(!limiter.can_make_request());

    clock.advance(1000);
    assert!(limiter.can_make_request());
    limiter.record_request();
    assert_eq!(limiter.status().requests_in_window, 3);
}

#[tokio::test]
async fn concurrent_acquirers_never_overrun_a_window() {
    let clock = ManualClock::new(T0);
    let sleeper = ClockSleeper::new(clock.clone());
    let limiter = Arc::new(
        RateLimiter::new(RateLimitConfig::new(3, 100))
            .unwrap()
            .with_clock(clock.clone())
            .with_sleeper(sleeper.clone()),
    );

    let tasks: Vec<_> = (0..9)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let status = limiter.status();
    assert_eq!(status.requests_in_window, 9);
    assert!(status.requests_in_last_second <= 3);
    assert!(!sleeper.calls().is_empty());
}

#[test]
fn profiles_build_limiters() {
    let limiter = RateLimiter::for_profile(QuotaProfile::Match);
    assert_eq!(*limiter.config(), RateLimitConfig::new(100, 2000));
    assert!(limiter.can_make_request());
}
