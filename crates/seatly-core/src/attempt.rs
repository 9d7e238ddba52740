// ── Per-user attempt loop ──
//
// Init -> Authenticated -> Retrying -> {Succeeded | Exhausted | FatalStop},
// or Skipped when the user is not scheduled today. Every exit produces an
// `AttemptOutcome`; nothing here returns an error.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{ClientFactory, ReservationClient, SubmitOutcome, SubmitRequest};
use crate::clock::{Clock, ClockContext};
use crate::config::{RunSettings, UserReservation};
use crate::model::{AttemptOutcome, FailureReason};
use crate::time_gate;

/// Run one user end to end: time gate, client construction, attempt loop.
///
/// The clock is read once; the same snapshot decides eligibility and the
/// target day.
#[tracing::instrument(name = "reserve", skip_all, fields(user = %user.username))]
pub async fn run_user<F: ClientFactory>(
    factory: &F,
    user: &UserReservation,
    settings: &RunSettings,
    clock: &dyn Clock,
    cancel: &CancellationToken,
) -> AttemptOutcome {
    let ctx = ClockContext::capture(clock);

    if !time_gate::is_eligible(&user.allowed_days, &ctx) {
        let weekday = ctx.weekday();
        info!(%weekday, "not scheduled today, skipping");
        return AttemptOutcome::failed(
            &user.username,
            0,
            FailureReason::NotEligibleToday { weekday },
        );
    }

    let client = match factory.create(user) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "could not create reservation client");
            return AttemptOutcome::failed(
                &user.username,
                0,
                FailureReason::WorkerFault {
                    cause: e.to_string(),
                },
            );
        }
    };

    attempt(&client, user, settings, &ctx, cancel).await
}

/// Authenticate once, then submit until reserved, rejected, exhausted
/// or cancelled.
///
/// Makes at most `settings.max_attempts` submit calls and sleeps
/// `settings.delay` between consecutive ones, never after the last.
pub async fn attempt<C: ReservationClient>(
    client: &C,
    user: &UserReservation,
    settings: &RunSettings,
    ctx: &ClockContext,
    cancel: &CancellationToken,
) -> AttemptOutcome {
    let username = user.username.as_str();

    // ── Init -> Authenticated ──
    match cancellable(cancel, client.check_login_status()).await {
        None => return AttemptOutcome::failed(username, 0, FailureReason::Cancelled),
        Some(Ok(status)) => debug!(?status, "session probed"),
        Some(Err(e)) => warn!(error = %e, "session probe failed, logging in anyway"),
    }

    match cancellable(cancel, client.login(username, &user.password)).await {
        None => return AttemptOutcome::failed(username, 0, FailureReason::Cancelled),
        Some(Ok(())) => info!("logged in"),
        Some(Err(e)) => {
            warn!(error = %e, "login failed");
            return AttemptOutcome::failed(
                username,
                0,
                FailureReason::AuthenticationFailed {
                    message: e.to_string(),
                },
            );
        }
    }

    // ── Retrying ──
    let request = SubmitRequest {
        username: user.username.clone(),
        time_slot: user.time_slot,
        room_id: user.room_id.clone(),
        seat_id: user.seat_id.clone(),
        target_next_day: settings.reserve_next_day,
        day: ctx.target_day(settings.reserve_next_day),
        enable_slider: settings.enable_slider,
    };

    let mut attempts = 0;
    while attempts < settings.max_attempts {
        attempts += 1;

        let Some(outcome) = cancellable(cancel, client.submit(&request)).await else {
            return AttemptOutcome::failed(username, attempts, FailureReason::Cancelled);
        };

        match outcome {
            SubmitOutcome::Reserved => {
                info!(attempt = attempts, day = %request.day, slot = %request.time_slot, "seat reserved");
                return AttemptOutcome::reserved(username, attempts);
            }
            SubmitOutcome::FatalRejection { message } => {
                warn!(attempt = attempts, reason = %message, "submit rejected, giving up");
                return AttemptOutcome::failed(
                    username,
                    attempts,
                    FailureReason::FatalRejection { message },
                );
            }
            SubmitOutcome::SeatTaken { message } => {
                debug!(attempt = attempts, reason = %message, "seat not available");
            }
            SubmitOutcome::TransientError { message } => {
                debug!(attempt = attempts, reason = %message, "transient submit failure");
            }
        }

        if attempts < settings.max_attempts
            && cancellable(cancel, tokio::time::sleep(settings.delay))
                .await
                .is_none()
        {
            return AttemptOutcome::failed(username, attempts, FailureReason::Cancelled);
        }
    }

    warn!(attempts, "attempts exhausted");
    AttemptOutcome::failed(username, attempts, FailureReason::AttemptsExhausted { attempts })
}

/// Drive `fut` unless `cancel` fires first, in which case `fut` is
/// dropped and `None` is returned.
async fn cancellable<T>(cancel: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        value = fut => Some(value),
    }
}
