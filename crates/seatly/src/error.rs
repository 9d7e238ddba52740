//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` variants and failed runs into user-facing errors
//! with actionable help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use seatly_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    /// Nobody got a seat (and not everyone was simply off today).
    pub const RESERVATION_FAILED: i32 = 1;
    /// Argument errors; clap exits with this code itself.
    #[allow(dead_code)]
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const CREDENTIALS: i32 = 4;
    pub const IO: i32 = 5;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Run results ──────────────────────────────────────────────────

    #[error("No seat was reserved ({failed} of {total} users failed)")]
    #[diagnostic(
        code(seatly::reservation_failed),
        help("Re-run with -v (or -vv) to see every attempt and the site's replies.")
    )]
    ReservationFailed { failed: usize, total: usize },

    #[error("Interrupted before every reservation finished")]
    #[diagnostic(code(seatly::interrupted))]
    Interrupted,

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file not found")]
    #[diagnostic(
        code(seatly::no_config),
        help(
            "Create one at: {path}\n\
             Or point at an existing file with --user <PATH>."
        )
    )]
    NoConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(seatly::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(seatly::config))]
    Config(Box<figment::Error>),

    // ── Credentials ──────────────────────────────────────────────────

    #[error("No password configured for user '{username}'")]
    #[diagnostic(
        code(seatly::no_credentials),
        help(
            "Add a password to the entry, or store one with:\n\
             seatly config set-password {username}"
        )
    )]
    NoCredentials { username: String },

    #[error("Environment variable {name} is not set")]
    #[diagnostic(
        code(seatly::missing_env),
        help("--action reads comma-separated credentials from USERNAMES and PASSWORDS.")
    )]
    MissingEnv { name: String },

    #[error(
        "USERNAMES has {usernames} entries and PASSWORDS has {passwords}, \
         but the config lists {users} users"
    )]
    #[diagnostic(
        code(seatly::credential_mismatch),
        help("Give exactly one username and one password per [[reserve]] entry, in order.")
    )]
    CredentialMismatch {
        usernames: usize,
        passwords: usize,
        users: usize,
    },

    #[error("Keyring error: {message}")]
    #[diagnostic(code(seatly::keyring))]
    Keyring { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error("Password prompt failed: {0}")]
    #[diagnostic(code(seatly::prompt))]
    Prompt(#[source] std::io::Error),

    #[error("Failed to render config: {0}")]
    #[diagnostic(code(seatly::serialization))]
    Serialization(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ReservationFailed { .. } => exit_code::RESERVATION_FAILED,
            Self::Interrupted => exit_code::INTERRUPTED,
            Self::NoConfig { .. } | Self::Validation { .. } | Self::Config(_) => exit_code::CONFIG,
            Self::NoCredentials { .. }
            | Self::MissingEnv { .. }
            | Self::CredentialMismatch { .. }
            | Self::Keyring { .. } => exit_code::CREDENTIALS,
            Self::Prompt(_) | Self::Serialization(_) => exit_code::IO,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::NoCredentials { username } => CliError::NoCredentials { username },
            ConfigError::MissingEnv { name } => CliError::MissingEnv { name },
            ConfigError::CredentialMismatch {
                usernames,
                passwords,
                users,
            } => CliError::CredentialMismatch {
                usernames,
                passwords,
                users,
            },
            ConfigError::Keyring(message) => CliError::Keyring { message },
            ConfigError::Serialization(e) => CliError::Serialization(e),
            ConfigError::Figment(e) => CliError::Config(e),
        }
    }
}
