use serde::Serialize;
use thiserror::Error;

use super::schedule::DayOfWeek;

/// Why a user's run ended without a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The user is not scheduled on the current weekday. No request was made.
    #[error("not scheduled today ({weekday})")]
    NotEligibleToday { weekday: DayOfWeek },

    /// Login failed; the run stops without submitting.
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The site refused the claim in a way retrying cannot fix.
    #[error("rejected: {message}")]
    FatalRejection { message: String },

    /// Every allowed attempt came back taken or transient.
    #[error("gave up after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },

    /// The worker crashed or its client could not be built.
    #[error("worker fault: {cause}")]
    WorkerFault { cause: String },

    /// The run was cancelled before reaching a result.
    #[error("cancelled")]
    Cancelled,
}

impl FailureReason {
    /// Short machine-friendly label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotEligibleToday { .. } => "not_eligible_today",
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::FatalRejection { .. } => "fatal_rejection",
            Self::AttemptsExhausted { .. } => "attempts_exhausted",
            Self::WorkerFault { .. } => "worker_fault",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Terminal result of one user's attempt loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptOutcome {
    pub username: String,
    pub succeeded: bool,
    /// Number of submit calls made.
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

impl AttemptOutcome {
    pub fn reserved(username: impl Into<String>, attempts: u32) -> Self {
        Self {
            username: username.into(),
            succeeded: true,
            attempts,
            reason: None,
        }
    }

    pub fn failed(username: impl Into<String>, attempts: u32, reason: FailureReason) -> Self {
        Self {
            username: username.into(),
            succeeded: false,
            attempts,
            reason: Some(reason),
        }
    }

    /// `true` when the user was skipped because today is not scheduled.
    pub fn is_skipped(&self) -> bool {
        matches!(self.reason, Some(FailureReason::NotEligibleToday { .. }))
    }
}

/// Aggregated outcomes of one run, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RunReport {
    outcomes: Vec<AttemptOutcome>,
}

impl RunReport {
    pub fn new(outcomes: Vec<AttemptOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[AttemptOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// The success flags alone, one per configured user.
    pub fn success_list(&self) -> Vec<bool> {
        self.outcomes.iter().map(|o| o.succeeded).collect()
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    /// `true` when nobody succeeded for a reason other than not being
    /// scheduled today.
    pub fn is_failure(&self) -> bool {
        self.succeeded_count() == 0 && !self.outcomes.iter().all(AttemptOutcome::is_skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_list_preserves_order() {
        let report = RunReport::new(vec![
            AttemptOutcome::reserved("a", 1),
            AttemptOutcome::failed("b", 30, FailureReason::AttemptsExhausted { attempts: 30 }),
            AttemptOutcome::reserved("c", 4),
        ]);
        assert_eq!(report.success_list(), vec![true, false, true]);
        assert_eq!(report.succeeded_count(), 2);
        assert!(!report.is_failure());
    }

    #[test]
    fn all_skipped_is_not_a_failure() {
        let report = RunReport::new(vec![AttemptOutcome::failed(
            "a",
            0,
            FailureReason::NotEligibleToday {
                weekday: DayOfWeek::Sunday,
            },
        )]);
        assert!(!report.is_failure());
    }

    #[test]
    fn nothing_reserved_is_a_failure() {
        let report = RunReport::new(vec![
            AttemptOutcome::failed(
                "a",
                0,
                FailureReason::NotEligibleToday {
                    weekday: DayOfWeek::Sunday,
                },
            ),
            AttemptOutcome::failed("b", 1, FailureReason::Cancelled),
        ]);
        assert!(report.is_failure());
    }

    #[test]
    fn reason_messages_are_readable() {
        let reason = FailureReason::NotEligibleToday {
            weekday: DayOfWeek::Tuesday,
        };
        assert_eq!(reason.to_string(), "not scheduled today (Tuesday)");
        assert_eq!(reason.kind(), "not_eligible_today");
    }
}
