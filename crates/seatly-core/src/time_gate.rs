// ── Time gate ──
//
// Decides whether a user is scheduled to reserve today. Ineligible users
// are skipped before any request is made.

use std::collections::BTreeSet;

use crate::clock::{ClockContext, SystemClock};
use crate::config::ZonePolicy;
use crate::model::DayOfWeek;

/// `true` iff the context's weekday is one of `allowed`.
pub fn is_eligible(allowed: &BTreeSet<DayOfWeek>, ctx: &ClockContext) -> bool {
    allowed.contains(&ctx.weekday())
}

/// Check `allowed` against the system clock under `zone`.
pub fn is_eligible_today(allowed: &BTreeSet<DayOfWeek>, zone: ZonePolicy) -> bool {
    is_eligible(allowed, &ClockContext::capture(&SystemClock::new(zone)))
}
