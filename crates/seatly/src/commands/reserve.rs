//! `seatly reserve` -- run every configured user's reservation.

use seatly_core::time_gate::is_eligible_today;
use seatly_core::{
    AttemptOutcome, Dispatcher, FailureReason, RunReport, UserReservation, ZonePolicy,
};
use tabled::Tabled;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{GlobalOpts, ReserveArgs};
use crate::config::{self, CredentialMode, KeyringStore};
use crate::error::CliError;
use crate::output::{self, Status};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Attempts")]
    attempts: u32,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn status_of(outcome: &AttemptOutcome) -> (&'static str, Status) {
    if outcome.succeeded {
        ("reserved", Status::Ok)
    } else if outcome.is_skipped() {
        ("skipped", Status::Skipped)
    } else {
        ("failed", Status::Failed)
    }
}

fn scheduled_today(users: &[UserReservation], zone: ZonePolicy) -> usize {
    users
        .iter()
        .filter(|u| is_eligible_today(&u.allowed_days, zone))
        .count()
}

fn reason_text(reason: Option<&FailureReason>) -> String {
    reason.map(ToString::to_string).unwrap_or_default()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ReserveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (path, cfg) = config::load(global)?;
    info!(path = %path.display(), users = cfg.reserve.len(), action = args.action, "loaded config");

    let zone = ZonePolicy::from_action(args.action);
    let credentials = if args.action {
        CredentialMode::Provided(config::env_credentials(cfg.reserve.len())?)
    } else {
        CredentialMode::Stored(&KeyringStore)
    };
    let plan = config::build_plan(&cfg, zone, credentials)?;
    info!(
        scheduled = scheduled_today(&plan.users, zone),
        total = plan.users.len(),
        "users scheduled today"
    );

    let dispatcher = Dispatcher::new(plan.client_factory(), plan.settings.clone());
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling workers");
                cancel.cancel();
            }
        })
    };

    let report = dispatcher.run_all(plan.users, &cancel).await;
    interrupt.abort();

    render(&report, global);

    if cancel.is_cancelled() {
        return Err(CliError::Interrupted);
    }
    if report.is_failure() {
        return Err(CliError::ReservationFailed {
            failed: report.len() - report.succeeded_count(),
            total: report.len(),
        });
    }
    Ok(())
}

fn render(report: &RunReport, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        report.outcomes(),
        |o| {
            let (label, status) = status_of(o);
            OutcomeRow {
                user: o.username.clone(),
                result: output::status_cell(label, status, color),
                attempts: o.attempts,
                reason: reason_text(o.reason.as_ref()),
            }
        },
        |o| format!("{}\t{}", o.username, o.succeeded),
    );
    output::print_output(&out, global.quiet);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use seatly_core::DayOfWeek;

    use super::*;

    #[test]
    fn outcomes_map_to_result_labels() {
        let ok = AttemptOutcome::reserved("a", 2);
        let skipped = AttemptOutcome::failed(
            "b",
            0,
            FailureReason::NotEligibleToday {
                weekday: DayOfWeek::Sunday,
            },
        );
        let failed = AttemptOutcome::failed("c", 30, FailureReason::AttemptsExhausted { attempts: 30 });

        assert_eq!(status_of(&ok), ("reserved", Status::Ok));
        assert_eq!(status_of(&skipped), ("skipped", Status::Skipped));
        assert_eq!(status_of(&failed), ("failed", Status::Failed));
        assert_eq!(reason_text(failed.reason.as_ref()), "gave up after 30 attempts");
        assert_eq!(reason_text(ok.reason.as_ref()), "");
    }

    #[test]
    fn scheduled_count_skips_users_without_days() {
        let user = |name: &str, days: &[DayOfWeek]| UserReservation {
            username: name.to_owned(),
            password: "pw".to_owned().into(),
            time_slot: "08:00-10:00".parse().unwrap(),
            room_id: "1".into(),
            seat_id: "2".into(),
            allowed_days: days.iter().copied().collect(),
        };
        let users = vec![
            user("every", &DayOfWeek::all().collect::<Vec<_>>()),
            user("never", &[]),
        ];

        assert_eq!(scheduled_today(&users, ZonePolicy::Local), 1);
        assert_eq!(scheduled_today(&users, ZonePolicy::FixedUtc8), 1);
    }
}
