//! Reservation orchestration between `seatly-api` and the CLI.
//!
//! This crate owns the domain model and the control flow of a run:
//!
//! - **[`Clock`] / [`ClockContext`]** — "now" under a [`ZonePolicy`]
//!   (local time or fixed UTC+8). One snapshot is taken per user so the
//!   weekday check and the target date never disagree.
//!
//! - **[`time_gate`]** — decides whether a user is scheduled today.
//!
//! - **[`ReservationClient`]** — the contract the attempt loop drives:
//!   session probe, login, and a submit that yields a tagged
//!   [`SubmitOutcome`]. [`HttpClientFactory`] provides the real
//!   implementation on top of [`seatly_api::SeatClient`].
//!
//! - **[`attempt`]** — the per-user state machine: gate, authenticate
//!   once, then submit until reserved, rejected, exhausted or cancelled.
//!
//! - **[`Dispatcher`]** — one `tokio` task per user, faults isolated per
//!   task, outcomes returned in configuration order as a [`RunReport`].

pub mod attempt;
pub mod client;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod time_gate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{
    ClientFactory, HttpClientFactory, LoginStatus, ReservationClient, SubmitOutcome,
    SubmitRequest,
};
pub use clock::{Clock, ClockContext, FixedClock, SystemClock};
pub use config::{RunSettings, UserReservation, ZonePolicy};
pub use dispatcher::Dispatcher;
pub use error::CoreError;
pub use model::{AttemptOutcome, DayOfWeek, FailureReason, RunReport, TimeSlot};
