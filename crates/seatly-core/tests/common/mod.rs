//! Scripted in-memory reservation client shared by the core tests.
#![allow(clippy::unwrap_used, dead_code)]

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::DateTime;
use secrecy::SecretString;
use seatly_core::{
    ClientFactory, CoreError, DayOfWeek, FixedClock, LoginStatus, ReservationClient,
    SubmitOutcome, SubmitRequest, UserReservation,
};

// ── Fixtures ────────────────────────────────────────────────────────

/// Monday 2026-10-19, 06:59:30 in UTC+8.
pub fn monday_morning() -> FixedClock {
    FixedClock(DateTime::parse_from_rfc3339("2026-10-19T06:59:30+08:00").unwrap())
}

pub fn user(name: &str, days: &[DayOfWeek]) -> UserReservation {
    UserReservation {
        username: name.to_owned(),
        password: SecretString::from("hunter2".to_owned()),
        time_slot: "08:00-10:00".parse().unwrap(),
        room_id: "2609".into(),
        seat_id: "017".into(),
        allowed_days: days.iter().copied().collect::<BTreeSet<_>>(),
    }
}

pub fn weekday_user(name: &str) -> UserReservation {
    user(name, &[DayOfWeek::Monday, DayOfWeek::Tuesday])
}

pub fn taken() -> SubmitOutcome {
    SubmitOutcome::SeatTaken {
        message: "seat taken".into(),
    }
}

// ── Scripted client ─────────────────────────────────────────────────

/// Call counters observed by a test after the run.
#[derive(Debug, Default)]
pub struct Probe {
    pub status_checks: AtomicU32,
    pub logins: AtomicU32,
    pub submits: AtomicU32,
    pub requests: Mutex<Vec<SubmitRequest>>,
}

impl Probe {
    pub fn logins(&self) -> u32 {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn submits(&self) -> u32 {
        self.submits.load(Ordering::SeqCst)
    }
}

/// What one user's client will do.
#[derive(Debug, Clone)]
pub struct Script {
    /// Outcomes returned in order; `fallback` once drained.
    pub outcomes: Vec<SubmitOutcome>,
    pub fallback: SubmitOutcome,
    pub login_error: Option<String>,
    pub status_error: bool,
    /// Latency added to every submit.
    pub submit_latency: Duration,
    pub panic_on_submit: bool,
    pub fail_create: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
            fallback: taken(),
            login_error: None,
            status_error: false,
            submit_latency: Duration::ZERO,
            panic_on_submit: false,
            fail_create: false,
        }
    }
}

impl Script {
    pub fn outcomes(outcomes: Vec<SubmitOutcome>) -> Self {
        Self {
            outcomes,
            ..Self::default()
        }
    }

    pub fn reserved() -> Self {
        Self::outcomes(vec![SubmitOutcome::Reserved])
    }
}

pub struct ScriptedClient {
    script: Script,
    queue: Mutex<VecDeque<SubmitOutcome>>,
    probe: Arc<Probe>,
}

impl ScriptedClient {
    pub fn new(script: Script, probe: Arc<Probe>) -> Self {
        let queue = Mutex::new(script.outcomes.iter().cloned().collect());
        Self {
            script,
            queue,
            probe,
        }
    }
}

impl ReservationClient for ScriptedClient {
    async fn check_login_status(&self) -> Result<LoginStatus, CoreError> {
        self.probe.status_checks.fetch_add(1, Ordering::SeqCst);
        if self.script.status_error {
            return Err(CoreError::Api {
                message: "probe failed".into(),
            });
        }
        Ok(LoginStatus::Anonymous)
    }

    async fn login(&self, _username: &str, _password: &SecretString) -> Result<(), CoreError> {
        self.probe.logins.fetch_add(1, Ordering::SeqCst);
        match &self.script.login_error {
            Some(message) => Err(CoreError::AuthenticationFailed {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn submit(&self, request: &SubmitRequest) -> SubmitOutcome {
        self.probe.submits.fetch_add(1, Ordering::SeqCst);
        self.probe.requests.lock().unwrap().push(request.clone());
        assert!(!self.script.panic_on_submit, "scripted client fault");
        if !self.script.submit_latency.is_zero() {
            tokio::time::sleep(self.script.submit_latency).await;
        }
        let next = self.queue.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.script.fallback.clone())
    }
}

/// Hands out a [`ScriptedClient`] per username and keeps its probe.
///
/// Clones share probes, so a test can keep one handle and give the other
/// to the dispatcher.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    scripts: HashMap<String, Script>,
    probes: Arc<Mutex<HashMap<String, Arc<Probe>>>>,
    created: Arc<AtomicU32>,
}

impl ScriptedFactory {
    pub fn with(mut self, username: &str, script: Script) -> Self {
        self.scripts.insert(username.to_owned(), script);
        self
    }

    pub fn probe(&self, username: &str) -> Arc<Probe> {
        Arc::clone(
            self.probes
                .lock()
                .unwrap()
                .entry(username.to_owned())
                .or_default(),
        )
    }

    pub fn created(&self) -> u32 {
        self.created.load(Ordering::SeqCst)
    }
}

impl ClientFactory for ScriptedFactory {
    type Client = ScriptedClient;

    fn create(&self, user: &UserReservation) -> Result<ScriptedClient, CoreError> {
        let script = self.scripts.get(&user.username).cloned().unwrap_or_default();
        if script.fail_create {
            return Err(CoreError::ClientSetup {
                message: "no transport".into(),
            });
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedClient::new(script, self.probe(&user.username)))
    }
}
