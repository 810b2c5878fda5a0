//! Clock port - time abstraction
//!
//! dispatch loop と intake はどちらも Clock から canonical zone の now を取る。
//! Tests swap in `FixedClock` or `ManualClock`.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::domain::CanonicalZone;
use crate::error::DeferralError;

/// Source of the current time in the canonical zone.
///
/// Resolution may fail (missing zone data, an external time source that is
/// down). Callers treat `DeferralError::Clock` as transient.
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<DateTime<Tz>, DeferralError>;
}

/// Wall-clock time, normalized to the canonical zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    zone: CanonicalZone,
}

impl SystemClock {
    pub fn new(zone: CanonicalZone) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Tz>, DeferralError> {
        Ok(self.zone.normalize(Utc::now()))
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Tz>,
}

impl FixedClock {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Result<DateTime<Tz>, DeferralError> {
        Ok(self.now)
    }
}

/// A clock that only moves when told to.
///
/// Stored as epoch milliseconds so it can be shared behind an `Arc` without
/// a lock.
#[derive(Debug)]
pub struct ManualClock {
    zone: CanonicalZone,
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Tz>) -> Self {
        Self {
            zone: CanonicalZone::new(start.timezone()),
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Tz>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<DateTime<Tz>, DeferralError> {
        let millis = self.millis.load(Ordering::SeqCst);
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|utc| self.zone.normalize(utc))
            .ok_or_else(|| DeferralError::Clock(format!("timestamp out of range: {millis}ms")))
    }
}
