//! Clock abstractions used by the rate limiter's time windows.

use chrono::{Local, TimeZone};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Clock abstraction so window rollover can be faked in tests.
///
/// Readings are wall-clock milliseconds since the Unix epoch; the per-day window needs a
/// real calendar date, so a process-relative monotonic reading would not do.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now_millis(&self) -> u64;
}

/// Wall clock backed by `SystemTime::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}

/// Hand-driven clock for tests. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Start the clock at `millis` since the epoch.
    pub fn new(millis: u64) -> Self {
        Self { now: Arc::new(AtomicU64::new(millis)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Jump to an absolute reading.
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Epoch millis of local midnight for the calendar day containing `millis`.
///
/// When midnight does not exist locally (a DST gap) the earliest valid instant of the day is
/// used; if the timestamp cannot be represented at all it is returned unchanged.
pub fn local_day_start(millis: u64) -> u64 {
    let Ok(signed) = i64::try_from(millis) else {
        return millis;
    };
    let Some(instant) = Local.timestamp_millis_opt(signed).earliest() else {
        return millis;
    };
    let date = instant.date_naive();
    let start = date
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .or_else(|| {
            // midnight skipped by DST: first representable hour of the day
            (1..24).find_map(|h| {
                date.and_hms_opt(h, 0, 0)
                    .and_then(|t| Local.from_local_datetime(&t).earliest())
            })
        });
    match start {
        Some(start) => u64::try_from(start.timestamp_millis()).unwrap_or(millis),
        None => millis,
    }
}
