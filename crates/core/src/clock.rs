//! Reference clock and the "today" range derived from it.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

/// Single source of "now" for the scheduling engine.
///
/// Production code uses [`SystemClock`]; tests pin time with [`FixedClock`]
/// so that "today" does not drift while a test runs.
pub trait ReferenceClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Half-open range covering the calendar day of `now()`.
    fn today(&self) -> DayBound {
        DayBound::containing(self.now())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ReferenceClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl ReferenceClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// `[start, end)` of one calendar day in the reference clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBound {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayBound {
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let start = Utc.from_utc_datetime(&instant.date_naive().and_time(NaiveTime::MIN));
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// 23:59:59 of the day, the latest instant a window may end at.
    pub fn last_second(&self) -> DateTime<Utc> {
        self.end - Duration::seconds(1)
    }

    /// True when `[start, end]` lies entirely inside the day.
    pub fn covers(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.start && end <= self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}
