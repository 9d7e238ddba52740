use thiserror::Error;

/// Top-level error type for the `seatly-api` crate.
///
/// Covers every failure mode of the booking site client: authentication,
/// transport, page scraping, captcha, and response decoding.
/// `seatly-core` classifies these into retryable and fatal outcomes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session cookie rejected by the booking site.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Building the underlying HTTP client failed.
    #[error("HTTP client setup failed: {0}")]
    ClientBuild(String),

    /// Non-success HTTP status that is not an auth failure.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Booking flow ────────────────────────────────────────────────
    /// The seat page did not carry a submit token (page not open yet,
    /// or the site served an interstitial).
    #[error("Seat page did not contain a submit token")]
    MissingToken,

    /// Slider verification is enabled but could not be completed.
    #[error("Captcha verification failed: {message}")]
    Captcha { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the session is no longer valid and a fresh
    /// login would be required.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::MissingToken | Self::Deserialization { .. } => true,
            _ => false,
        }
    }
}
