// ── Runtime configuration ──
//
// Values the dispatcher and attempt loops run on. They carry credentials
// and tunables but never touch disk: `seatly-config` reads the document
// and hands these in.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::FixedOffset;
use secrecy::SecretString;

use crate::model::{DayOfWeek, TimeSlot};

const UTC8_SECONDS: i32 = 8 * 3600;

/// Which wall clock decides "today".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZonePolicy {
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed UTC+8 offset, independent of the host.
    FixedUtc8,
}

impl ZonePolicy {
    /// Zone selected by the execution-mode (`--action`) flag.
    pub fn from_action(action: bool) -> Self {
        if action { Self::FixedUtc8 } else { Self::Local }
    }

    pub fn fixed_offset() -> FixedOffset {
        FixedOffset::east_opt(UTC8_SECONDS).expect("UTC+8 is a valid offset")
    }
}

/// One person's reservation target. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct UserReservation {
    pub username: String,
    pub password: SecretString,
    pub time_slot: TimeSlot,
    pub room_id: String,
    pub seat_id: String,
    pub allowed_days: BTreeSet<DayOfWeek>,
}

/// Tunables shared by every attempt loop in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Pause between consecutive submit attempts.
    pub delay: Duration,
    /// Upper bound on submit calls per user.
    pub max_attempts: u32,
    /// Ask the client to pass slider verification before submitting.
    pub enable_slider: bool,
    /// Claim tomorrow's slot instead of today's.
    pub reserve_next_day: bool,
    pub zone: ZonePolicy,
    /// Cap on concurrently running workers. `None` runs every user at once.
    pub max_parallel: Option<usize>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            max_attempts: 30,
            enable_slider: false,
            reserve_next_day: true,
            zone: ZonePolicy::Local,
            max_parallel: None,
        }
    }
}
