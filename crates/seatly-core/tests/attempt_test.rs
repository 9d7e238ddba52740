//! Attempt loop behaviour against a scripted client.
//!
//! Time is paused, so inter-attempt pacing is measured exactly.
#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use seatly_core::attempt::{attempt, run_user};
use seatly_core::{ClockContext, DayOfWeek, FailureReason, RunSettings, SubmitOutcome};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use common::{Probe, Script, ScriptedClient, ScriptedFactory, monday_morning, taken, user, weekday_user};

fn settings(max_attempts: u32) -> RunSettings {
    RunSettings {
        delay: Duration::from_millis(500),
        max_attempts,
        ..RunSettings::default()
    }
}

// ── Core scenarios ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn reserves_on_third_attempt_after_two_pauses() {
    let factory = ScriptedFactory::default().with(
        "alice",
        Script::outcomes(vec![taken(), taken(), SubmitOutcome::Reserved]),
    );

    let started = Instant::now();
    let outcome = run_user(
        &factory,
        &weekday_user("alice"),
        &settings(30),
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.reason, None);
    assert_eq!(factory.probe("alice").submits(), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn unscheduled_day_skips_without_any_request() {
    let factory = ScriptedFactory::default().with("bob", Script::reserved());
    let sunday_only = user("bob", &[DayOfWeek::Sunday]);

    let outcome = run_user(
        &factory,
        &sunday_only,
        &settings(30),
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.attempts, 0);
    assert_eq!(
        outcome.reason,
        Some(FailureReason::NotEligibleToday {
            weekday: DayOfWeek::Monday
        })
    );
    assert!(outcome.is_skipped());
    assert_eq!(factory.created(), 0);
    assert_eq!(factory.probe("bob").logins(), 0);
    assert_eq!(factory.probe("bob").submits(), 0);
}

#[tokio::test(start_paused = true)]
async fn always_taken_exhausts_the_cap() {
    let factory = ScriptedFactory::default().with("carol", Script::default());

    let started = Instant::now();
    let outcome = run_user(
        &factory,
        &weekday_user("carol"),
        &settings(5),
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.attempts, 5);
    assert_eq!(
        outcome.reason,
        Some(FailureReason::AttemptsExhausted { attempts: 5 })
    );
    assert_eq!(factory.probe("carol").submits(), 5);
    // Four pauses between five attempts, none after the last.
    assert_eq!(started.elapsed(), Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn fatal_rejection_stops_after_one_submit() {
    let factory = ScriptedFactory::default().with(
        "dave",
        Script::outcomes(vec![SubmitOutcome::FatalRejection {
            message: "blacklisted".into(),
        }]),
    );

    let started = Instant::now();
    let outcome = run_user(
        &factory,
        &weekday_user("dave"),
        &settings(30),
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(
        outcome.reason,
        Some(FailureReason::FatalRejection {
            message: "blacklisted".into()
        })
    );
    assert_eq!(factory.probe("dave").submits(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn login_failure_is_fatal_and_never_submits() {
    let factory = ScriptedFactory::default().with(
        "erin",
        Script {
            login_error: Some("wrong password".into()),
            ..Script::reserved()
        },
    );

    let outcome = run_user(
        &factory,
        &weekday_user("erin"),
        &settings(30),
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    assert!(!outcome.succeeded);
    assert!(matches!(
        outcome.reason,
        Some(FailureReason::AuthenticationFailed { ref message }) if message.contains("wrong password")
    ));
    assert_eq!(factory.probe("erin").logins(), 1);
    assert_eq!(factory.probe("erin").submits(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_session_probe_still_logs_in() {
    let factory = ScriptedFactory::default().with(
        "fay",
        Script {
            status_error: true,
            ..Script::reserved()
        },
    );

    let outcome = run_user(
        &factory,
        &weekday_user("fay"),
        &settings(30),
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    assert!(outcome.succeeded);
    assert_eq!(factory.probe("fay").logins(), 1);
}

#[tokio::test(start_paused = true)]
async fn client_construction_failure_is_a_worker_fault() {
    let factory = ScriptedFactory::default().with(
        "gus",
        Script {
            fail_create: true,
            ..Script::default()
        },
    );

    let outcome = run_user(
        &factory,
        &weekday_user("gus"),
        &settings(30),
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(
        outcome.reason,
        Some(FailureReason::WorkerFault { ref cause }) if cause.contains("no transport")
    ));
}

// ── Loop bounds and requests ────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn zero_attempt_cap_makes_no_submit() {
    let probe: Arc<Probe> = Arc::default();
    let client = ScriptedClient::new(Script::reserved(), Arc::clone(&probe));
    let ctx = ClockContext::capture(&monday_morning());

    let outcome = attempt(
        &client,
        &weekday_user("hal"),
        &settings(0),
        &ctx,
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(
        outcome.reason,
        Some(FailureReason::AttemptsExhausted { attempts: 0 })
    );
    assert_eq!(probe.submits(), 0);
    assert_eq!(probe.logins(), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_errors_are_retried() {
    let factory = ScriptedFactory::default().with(
        "ivy",
        Script::outcomes(vec![
            SubmitOutcome::TransientError {
                message: "timeout".into(),
            },
            SubmitOutcome::Reserved,
        ]),
    );

    let outcome = run_user(
        &factory,
        &weekday_user("ivy"),
        &settings(30),
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn submit_targets_the_next_day_from_the_snapshot() {
    let factory = ScriptedFactory::default().with("jo", Script::reserved());

    run_user(
        &factory,
        &weekday_user("jo"),
        &settings(30),
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    let requests = factory.probe("jo").requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.day, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
    assert!(request.target_next_day);
    assert_eq!(request.room_id, "2609");
    assert_eq!(request.seat_id, "017");
    assert_eq!(request.time_slot.to_string(), "08:00-10:00");
    assert!(!request.enable_slider);
}

#[tokio::test(start_paused = true)]
async fn same_day_mode_targets_today() {
    let factory = ScriptedFactory::default().with("kim", Script::reserved());
    let same_day = RunSettings {
        reserve_next_day: false,
        ..settings(30)
    };

    run_user(
        &factory,
        &weekday_user("kim"),
        &same_day,
        &monday_morning(),
        &CancellationToken::new(),
    )
    .await;

    let requests = factory.probe("kim").requests.lock().unwrap().clone();
    assert_eq!(requests[0].day, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_the_pause() {
    let factory = ScriptedFactory::default().with("lee", Script::default());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let outcome = run_user(
        &factory,
        &weekday_user("lee"),
        &settings(30),
        &monday_morning(),
        &cancel,
    )
    .await;

    assert_eq!(outcome.reason, Some(FailureReason::Cancelled));
    // Attempts at 0ms, 500ms and 1000ms; cancelled during the third pause.
    assert_eq!(outcome.attempts, 3);
    assert_eq!(factory.probe("lee").submits(), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(1200));
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_never_logs_in() {
    let factory = ScriptedFactory::default().with("max", Script::reserved());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = run_user(
        &factory,
        &weekday_user("max"),
        &settings(30),
        &monday_morning(),
        &cancel,
    )
    .await;

    assert_eq!(outcome.reason, Some(FailureReason::Cancelled));
    assert_eq!(outcome.attempts, 0);
    assert_eq!(factory.probe("max").logins(), 0);
}
