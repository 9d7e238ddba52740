// ── Multi-user dispatcher ──
//
// Fans out one attempt loop per user onto its own tokio task and joins
// them all before returning. A panicking worker is recorded against its
// user; the rest of the batch carries on.

use std::any::Any;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::attempt;
use crate::client::ClientFactory;
use crate::clock::{Clock, SystemClock};
use crate::config::{RunSettings, UserReservation};
use crate::model::{AttemptOutcome, FailureReason, RunReport};

/// Runs every configured user concurrently and collects their outcomes.
pub struct Dispatcher<F> {
    factory: Arc<F>,
    settings: Arc<RunSettings>,
    clock: Arc<dyn Clock>,
}

impl<F: ClientFactory> Dispatcher<F> {
    /// Dispatcher reading the system clock under `settings.zone`.
    pub fn new(factory: F, settings: RunSettings) -> Self {
        let clock = Arc::new(SystemClock::new(settings.zone));
        Self {
            factory: Arc::new(factory),
            settings: Arc::new(settings),
            clock,
        }
    }

    /// Replace the clock, e.g. with a [`FixedClock`](crate::FixedClock).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run every user's attempt loop and wait for all of them.
    ///
    /// The report has exactly one outcome per user, in input order,
    /// regardless of completion order. Cancelling `cancel` winds every
    /// worker down with a `Cancelled` outcome.
    pub async fn run_all(&self, users: Vec<UserReservation>, cancel: &CancellationToken) -> RunReport {
        let permits = self
            .settings
            .max_parallel
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        info!(
            users = users.len(),
            max_parallel = ?self.settings.max_parallel,
            "starting reservation run"
        );

        let mut usernames = Vec::with_capacity(users.len());
        let mut handles = Vec::with_capacity(users.len());

        for user in users {
            usernames.push(user.username.clone());

            let factory = Arc::clone(&self.factory);
            let settings = Arc::clone(&self.settings);
            let clock = Arc::clone(&self.clock);
            let permits = permits.clone();
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                let _permit = match permits {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                attempt::run_user(factory.as_ref(), &user, &settings, clock.as_ref(), &cancel).await
            }));
        }

        let results = futures_util::future::join_all(handles).await;

        let outcomes: Vec<AttemptOutcome> = results
            .into_iter()
            .zip(usernames)
            .map(|(result, username)| match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    let cause = join_error_cause(e);
                    error!(user = %username, %cause, "worker fault");
                    AttemptOutcome::failed(username, 0, FailureReason::WorkerFault { cause })
                }
            })
            .collect();

        let report = RunReport::new(outcomes);
        debug!(succeeded = report.succeeded_count(), total = report.len(), "run finished");
        report
    }
}

fn join_error_cause(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::panic_message;

    #[test]
    fn panic_payloads_are_rendered() {
        assert_eq!(panic_message(Box::new("boom")), "panicked: boom");
        assert_eq!(panic_message(Box::new(String::from("kaput"))), "panicked: kaput");
        assert_eq!(panic_message(Box::new(7_u8)), "panicked");
    }
}
