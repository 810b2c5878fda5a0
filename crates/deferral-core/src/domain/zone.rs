//! The canonical time zone.
//!
//! Every schedule time is interpreted in one fixed zone, and due-ness is
//! evaluated against "now" in that same zone, independent of the server's
//! local settings.

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::error::DeferralError;

pub const DEFAULT_ZONE_NAME: &str = "Europe/Amsterdam";

/// Wire format of the `schedule_time` field: `YYYY-MM-DD HH:MM:SS`.
pub const SCHEDULE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalZone(Tz);

impl CanonicalZone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn amsterdam() -> Self {
        Self(chrono_tz::Europe::Amsterdam)
    }

    /// Resolve an IANA zone name such as `Europe/Amsterdam`.
    pub fn from_name(name: &str) -> Result<Self, DeferralError> {
        name.parse::<Tz>()
            .map(Self)
            .map_err(|_| DeferralError::UnknownTimeZone(name.to_string()))
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Express an instant in the canonical zone.
    pub fn normalize<Z: TimeZone>(&self, at: DateTime<Z>) -> DateTime<Tz> {
        at.with_timezone(&self.0)
    }

    /// Parse a `schedule_time` value as wall-clock time in this zone.
    ///
    /// DST edges:
    /// - a repeated local time (autumn fold) resolves to the later instant,
    ///   i.e. it is read as winter time (02:30 CET, 01:30 UTC)
    /// - a skipped local time (spring gap) is read with the offset in effect
    ///   before the gap, landing after it (02:30 becomes 03:30 summer time)
    ///
    /// 冬時間側に倒すので、fold 中の item が 1 時間早く発火することはない。
    pub fn parse_schedule_time(&self, raw: &str) -> Result<DateTime<Tz>, DeferralError> {
        let invalid = |reason: String| DeferralError::InvalidScheduleTime {
            value: raw.to_string(),
            reason,
        };

        let naive = NaiveDateTime::parse_from_str(raw, SCHEDULE_TIME_FORMAT)
            .map_err(|e| invalid(e.to_string()))?;

        match self.0.from_local_datetime(&naive) {
            LocalResult::Single(at) => Ok(at),
            LocalResult::Ambiguous(_, latest) => Ok(latest),
            LocalResult::None => {
                let before_gap = naive
                    .checked_sub_signed(TimeDelta::days(1))
                    .and_then(|probe| self.0.from_local_datetime(&probe).earliest())
                    .ok_or_else(|| invalid("local time does not exist".to_string()))?;
                let offset = before_gap.offset().fix().local_minus_utc();
                let utc = naive
                    .checked_sub_signed(TimeDelta::seconds(i64::from(offset)))
                    .ok_or_else(|| invalid("local time does not exist".to_string()))?;
                Ok(self.0.from_utc_datetime(&utc))
            }
        }
    }
}

impl Default for CanonicalZone {
    fn default() -> Self {
        Self::amsterdam()
    }
}
