// ── Core error types ──
//
// Errors raised while building runtime values or talking to a client.
// None of these escape the dispatcher: every one is folded into a
// per-user `FailureReason` before the report is produced.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Client errors ────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Reservation client setup failed: {message}")]
    ClientSetup { message: String },

    #[error("Booking site error: {message}")]
    Api { message: String },

    // ── Domain validation ────────────────────────────────────────────
    #[error("Invalid time slot '{value}': {reason}")]
    InvalidTimeSlot { value: String, reason: String },

    #[error("Unknown day of week '{value}'")]
    InvalidWeekday { value: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<seatly_api::Error> for CoreError {
    fn from(err: seatly_api::Error) -> Self {
        match err {
            seatly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            seatly_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            seatly_api::Error::ClientBuild(message) => CoreError::ClientSetup { message },
            seatly_api::Error::InvalidUrl(e) => CoreError::ClientSetup {
                message: format!("Invalid URL: {e}"),
            },
            other => CoreError::Api {
                message: other.to_string(),
            },
        }
    }
}
