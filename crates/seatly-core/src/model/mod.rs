// ── Domain model ──
//
// Schedule types (weekday, time slot) and run results (per-user outcome,
// aggregated report).

pub mod outcome;
pub mod schedule;

pub use outcome::{AttemptOutcome, FailureReason, RunReport};
pub use schedule::{DayOfWeek, TimeSlot};
