// ── Reservation client contract ──
//
// The attempt loop only sees `ReservationClient`. The HTTP implementation
// adapts `seatly_api::SeatClient` and owns the decision of which site
// replies are worth retrying.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use secrecy::SecretString;
use seatly_api::{CaptchaSolver, Endpoints, SeatClient, SeatRequest, TransportConfig};
use tracing::debug;

use crate::config::UserReservation;
use crate::error::CoreError;
use crate::model::TimeSlot;

pub use seatly_api::LoginStatus;

/// Rejection messages that no amount of retrying will change.
///
/// Matched case-insensitively as substrings of the site's `msg`.
const FATAL_MARKERS: &[&str] = &[
    "黑名单",
    "权限",
    "已有预约",
    "参数",
    "禁止",
    "冻结",
    "blacklist",
    "permission",
    "blocked",
    "invalid parameter",
];

/// One submit call's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub username: String,
    pub time_slot: TimeSlot,
    pub room_id: String,
    pub seat_id: String,
    pub target_next_day: bool,
    /// Concrete calendar day, derived from the loop's clock snapshot.
    pub day: NaiveDate,
    pub enable_slider: bool,
}

/// Tagged result of one submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Reserved,
    SeatTaken { message: String },
    TransientError { message: String },
    FatalRejection { message: String },
}

impl SubmitOutcome {
    /// Whether the attempt loop should try again after this outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SeatTaken { .. } | Self::TransientError { .. })
    }
}

/// Session and submit operations the attempt loop drives.
pub trait ReservationClient: Send + Sync {
    fn check_login_status(&self) -> impl Future<Output = Result<LoginStatus, CoreError>> + Send;

    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn submit(&self, request: &SubmitRequest) -> impl Future<Output = SubmitOutcome> + Send;
}

/// Builds one independent client per worker.
pub trait ClientFactory: Send + Sync + 'static {
    type Client: ReservationClient + 'static;

    fn create(&self, user: &UserReservation) -> Result<Self::Client, CoreError>;
}

// ── HTTP implementation ──────────────────────────────────────────────

/// Factory for [`SeatClient`]s, each with a fresh cookie jar.
#[derive(Clone)]
pub struct HttpClientFactory {
    endpoints: Endpoints,
    transport: TransportConfig,
    captcha: Option<Arc<dyn CaptchaSolver>>,
}

impl HttpClientFactory {
    pub fn new(endpoints: Endpoints, transport: TransportConfig) -> Self {
        Self {
            endpoints,
            transport,
            captcha: None,
        }
    }

    pub fn with_captcha_solver(mut self, solver: Arc<dyn CaptchaSolver>) -> Self {
        self.captcha = Some(solver);
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

impl ClientFactory for HttpClientFactory {
    type Client = SeatClient;

    fn create(&self, user: &UserReservation) -> Result<SeatClient, CoreError> {
        // The shared config must not carry a jar: sessions stay per user.
        let mut transport = self.transport.clone();
        transport.cookie_jar = None;

        let client = SeatClient::new(self.endpoints.clone(), &transport)?;
        debug!(user = %user.username, "reservation client created");
        Ok(match &self.captcha {
            Some(solver) => client.with_captcha_solver(Arc::clone(solver)),
            None => client,
        })
    }
}

impl ReservationClient for SeatClient {
    async fn check_login_status(&self) -> Result<LoginStatus, CoreError> {
        Ok(self.login_status().await?)
    }

    async fn login(&self, username: &str, password: &SecretString) -> Result<(), CoreError> {
        Ok(SeatClient::login(self, username, password).await?)
    }

    async fn submit(&self, request: &SubmitRequest) -> SubmitOutcome {
        let seat = SeatRequest {
            room_id: request.room_id.clone(),
            seat_id: request.seat_id.clone(),
            start_time: request.time_slot.start_hhmm(),
            end_time: request.time_slot.end_hhmm(),
            day: request.day,
            captcha: request.enable_slider,
        };
        classify(SeatClient::submit(self, &seat).await)
    }
}

// ── Classification ───────────────────────────────────────────────────

/// Map a raw submit result onto the retry/fatal boundary.
pub(crate) fn classify(result: Result<seatly_api::SubmitResponse, seatly_api::Error>) -> SubmitOutcome {
    match result {
        Ok(reply) if reply.success => SubmitOutcome::Reserved,
        Ok(reply) => {
            let message = reply.msg.unwrap_or_default();
            if is_fatal_message(&message) {
                SubmitOutcome::FatalRejection { message }
            } else {
                SubmitOutcome::SeatTaken { message }
            }
        }
        Err(e) if e.is_transient() => SubmitOutcome::TransientError {
            message: e.to_string(),
        },
        Err(e) if e.is_auth_expired() => SubmitOutcome::FatalRejection {
            message: format!("session no longer valid, login again: {e}"),
        },
        Err(e) => SubmitOutcome::FatalRejection {
            message: e.to_string(),
        },
    }
}

fn is_fatal_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    FATAL_MARKERS.iter().any(|marker| lowered.contains(marker))
}
