// ── Clock abstraction ──
//
// All date and weekday decisions in a run go through a `Clock`, so tests
// can pin "now" and the zone policy is applied in exactly one place.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Utc};

use crate::config::ZonePolicy;
use crate::model::DayOfWeek;

/// Source of the current instant, already shifted into the run's zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock under a [`ZonePolicy`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: ZonePolicy,
}

impl SystemClock {
    pub fn new(zone: ZonePolicy) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.zone {
            ZonePolicy::Local => Local::now().fixed_offset(),
            ZonePolicy::FixedUtc8 => Utc::now().with_timezone(&ZonePolicy::fixed_offset()),
        }
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// One reading of the clock, taken at the start of an attempt loop.
///
/// Weekday, today and the target day are all derived from the same
/// instant in the same zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockContext {
    now: DateTime<FixedOffset>,
}

impl ClockContext {
    pub fn capture(clock: &dyn Clock) -> Self {
        Self { now: clock.now() }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }

    pub fn weekday(&self) -> DayOfWeek {
        self.now.weekday().into()
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// The calendar day a claim targets: today, or tomorrow when
    /// `next_day` is set.
    pub fn target_day(&self, next_day: bool) -> NaiveDate {
        let today = self.today();
        if next_day {
            today.succ_opt().unwrap_or(today)
        } else {
            today
        }
    }
}
