//! Configuration for the seatly CLI.
//!
//! A TOML or JSON document listing the users to reserve for, plus the run
//! tunables. This crate loads it (file + `SEATLY_*` environment), resolves
//! every user's password (document, keyring, or the `USERNAMES` /
//! `PASSWORDS` environment lists in action mode), validates it, and
//! translates it into the immutable runtime values `seatly-core` runs on.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use seatly_api::{Endpoints, TransportConfig};
use seatly_core::{
    DayOfWeek, HttpClientFactory, RunSettings, TimeSlot, UserReservation, ZonePolicy,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service name under which passwords are stored.
pub const KEYRING_SERVICE: &str = "seatly";

/// Environment variables holding comma-separated credentials in action mode.
pub const USERNAMES_ENV: &str = "USERNAMES";
pub const PASSWORDS_ENV: &str = "PASSWORDS";

/// Scalar tunables that `SEATLY_*` environment variables may override.
const ENV_TUNABLES: &[&str] = &[
    "delay_ms",
    "max_attempts",
    "enable_slider",
    "reserve_next_day",
    "max_parallel",
    "timeout",
];

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("no password configured for user '{username}'")]
    NoCredentials { username: String },

    #[error("environment variable {name} is not set")]
    MissingEnv { name: String },

    #[error(
        "credential lists do not match the config: {usernames} usernames, {passwords} passwords, {users} users"
    )]
    CredentialMismatch {
        usernames: usize,
        passwords: usize,
        users: usize,
    },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── Document structs ────────────────────────────────────────────────

/// The configuration document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Pause between submit attempts, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default)]
    pub enable_slider: bool,

    #[serde(default = "default_true")]
    pub reserve_next_day: bool,

    /// Cap on concurrently running users. Unset runs everyone at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,

    /// HTTP request timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub endpoints: EndpointConfig,

    #[serde(default)]
    pub reserve: Vec<UserEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_attempts: default_max_attempts(),
            enable_slider: false,
            reserve_next_day: true,
            max_parallel: None,
            timeout: default_timeout(),
            endpoints: EndpointConfig::default(),
            reserve: Vec::new(),
        }
    }
}

fn default_delay_ms() -> u64 {
    500
}
fn default_max_attempts() -> u32 {
    30
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    #[serde(default = "default_passport")]
    pub passport: String,

    #[serde(default = "default_office")]
    pub office: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            passport: default_passport(),
            office: default_office(),
        }
    }
}

fn default_passport() -> String {
    Endpoints::default().passport.to_string()
}
fn default_office() -> String {
    Endpoints::default().office.to_string()
}

/// One `[[reserve]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserEntry {
    pub username: String,

    /// Plaintext password. Prefer the keyring (`seatly config set-password`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// `"08:00-10:00"` or `["08:00", "10:00"]`.
    pub time: TimeSpec,

    #[serde(alias = "room_id")]
    pub roomid: Identifier,

    #[serde(alias = "seat_id")]
    pub seatid: Identifier,

    #[serde(alias = "days_of_week")]
    pub daysofweek: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TimeSpec {
    Range(String),
    Bounds([String; 2]),
}

impl TimeSpec {
    pub fn parse(&self) -> Result<TimeSlot, seatly_core::CoreError> {
        match self {
            Self::Range(range) => range.parse(),
            Self::Bounds([start, end]) => TimeSlot::from_bounds(start, end),
        }
    }
}

/// Room and seat ids may be written as strings or bare numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Identifier {
    Text(String),
    Number(u64),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl Config {
    /// A copy safe to print: every password replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for entry in &mut copy.reserve {
            if entry.password.is_some() {
                entry.password = Some(REDACTED.into());
            }
        }
        copy
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Default config file location via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "seatly", "seatly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("seatly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the document at `path` and apply `SEATLY_*` overrides.
///
/// `.json` files are read as JSON, anything else as TOML.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
    figment = if is_json {
        figment.merge(Json::file(path))
    } else {
        figment.merge(Toml::file(path))
    };
    figment = figment.merge(Env::prefixed("SEATLY_").only(ENV_TUNABLES));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), users = config.reserve.len(), "config loaded");
    Ok(config)
}

// ── Credentials ─────────────────────────────────────────────────────

/// A username and its password.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: SecretString,
}

/// Where passwords live when the document does not carry them.
pub trait PasswordStore {
    fn get(&self, username: &str) -> Result<Option<SecretString>, ConfigError>;
    fn set(&self, username: &str, password: &SecretString) -> Result<(), ConfigError>;
}

/// The platform keyring, one entry per username under [`KEYRING_SERVICE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl PasswordStore for KeyringStore {
    fn get(&self, username: &str) -> Result<Option<SecretString>, ConfigError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, username)?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(SecretString::from(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, username: &str, password: &SecretString) -> Result<(), ConfigError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, username)?;
        entry.set_password(password.expose_secret())?;
        Ok(())
    }
}

/// Read the action-mode credential lists from the environment.
pub fn env_credentials(expected: usize) -> Result<Vec<Credential>, ConfigError> {
    let read = |name: &str| {
        std::env::var(name).map_err(|_| ConfigError::MissingEnv { name: name.into() })
    };
    let usernames = read(USERNAMES_ENV)?;
    let passwords = read(PASSWORDS_ENV)?;
    split_credentials(&usernames, &passwords, expected)
}

/// Pair comma-separated usernames and passwords by index.
///
/// Both lists must have exactly `expected` items.
pub fn split_credentials(
    usernames: &str,
    passwords: &str,
    expected: usize,
) -> Result<Vec<Credential>, ConfigError> {
    let names: Vec<&str> = usernames.split(',').map(str::trim).collect();
    let secrets: Vec<&str> = passwords.split(',').collect();

    if names.len() != expected || secrets.len() != expected {
        return Err(ConfigError::CredentialMismatch {
            usernames: names.len(),
            passwords: secrets.len(),
            users: expected,
        });
    }

    Ok(names
        .into_iter()
        .zip(secrets)
        .map(|(username, password)| Credential {
            username: username.to_owned(),
            password: SecretString::from(password.to_owned()),
        })
        .collect())
}

/// Resolve one entry's password: document field, then the store.
pub fn resolve_password(
    entry: &UserEntry,
    store: &dyn PasswordStore,
) -> Result<SecretString, ConfigError> {
    if let Some(ref pw) = entry.password {
        return Ok(SecretString::from(pw.clone()));
    }

    if let Some(secret) = store.get(&entry.username)? {
        debug!(user = %entry.username, "password read from keyring");
        return Ok(secret);
    }

    Err(ConfigError::NoCredentials {
        username: entry.username.clone(),
    })
}

// ── Translation to runtime values ───────────────────────────────────

/// Everything a reservation run needs, validated.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub settings: RunSettings,
    pub users: Vec<UserReservation>,
    pub endpoints: Endpoints,
    pub transport: TransportConfig,
}

impl RunPlan {
    pub fn client_factory(&self) -> HttpClientFactory {
        HttpClientFactory::new(self.endpoints.clone(), self.transport.clone())
    }
}

/// How passwords are supplied for a run.
pub enum CredentialMode<'a> {
    /// Per entry: document password, then the store.
    Stored(&'a dyn PasswordStore),
    /// Positional credentials replacing each entry's username and password.
    Provided(Vec<Credential>),
}

/// Validate `config` and build the run plan.
///
/// Fails on the first problem found; no partial plan is returned.
pub fn build_plan(
    config: &Config,
    zone: ZonePolicy,
    credentials: CredentialMode<'_>,
) -> Result<RunPlan, ConfigError> {
    if config.reserve.is_empty() {
        return Err(ConfigError::Validation {
            field: "reserve".into(),
            reason: "at least one user entry is required".into(),
        });
    }

    let settings = run_settings(config, zone)?;
    let endpoints = endpoints(&config.endpoints)?;
    let transport = TransportConfig {
        timeout: Duration::from_secs(config.timeout),
        ..TransportConfig::default()
    };

    let credentials = match credentials {
        CredentialMode::Provided(list) => {
            if list.len() != config.reserve.len() {
                return Err(ConfigError::CredentialMismatch {
                    usernames: list.len(),
                    passwords: list.len(),
                    users: config.reserve.len(),
                });
            }
            list
        }
        CredentialMode::Stored(store) => config
            .reserve
            .iter()
            .map(|entry| {
                Ok(Credential {
                    username: entry.username.clone(),
                    password: resolve_password(entry, store)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?,
    };

    let users = config
        .reserve
        .iter()
        .zip(credentials)
        .enumerate()
        .map(|(index, (entry, credential))| user_reservation(index, entry, credential))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RunPlan {
        settings,
        users,
        endpoints,
        transport,
    })
}

/// Tunables from the document, under the given zone policy.
pub fn run_settings(config: &Config, zone: ZonePolicy) -> Result<RunSettings, ConfigError> {
    if config.max_parallel == Some(0) {
        return Err(ConfigError::Validation {
            field: "max_parallel".into(),
            reason: "must be at least 1".into(),
        });
    }
    if config.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    Ok(RunSettings {
        delay: Duration::from_millis(config.delay_ms),
        max_attempts: config.max_attempts,
        enable_slider: config.enable_slider,
        reserve_next_day: config.reserve_next_day,
        zone,
        max_parallel: config.max_parallel,
    })
}

fn endpoints(cfg: &EndpointConfig) -> Result<Endpoints, ConfigError> {
    let parse = |field: &str, raw: &str| {
        raw.parse::<url::Url>().map_err(|e| ConfigError::Validation {
            field: format!("endpoints.{field}"),
            reason: format!("invalid URL '{raw}': {e}"),
        })
    };
    Ok(Endpoints {
        passport: parse("passport", &cfg.passport)?,
        office: parse("office", &cfg.office)?,
    })
}

fn user_reservation(
    index: usize,
    entry: &UserEntry,
    credential: Credential,
) -> Result<UserReservation, ConfigError> {
    let field = |name: &str| format!("reserve[{index}].{name}");
    let invalid = |name: &str, reason: String| ConfigError::Validation {
        field: field(name),
        reason,
    };

    if credential.username.trim().is_empty() {
        return Err(invalid("username", "must not be empty".into()));
    }

    let time_slot = entry
        .time
        .parse()
        .map_err(|e| invalid("time", e.to_string()))?;

    let room_id = entry.roomid.to_string();
    if room_id.trim().is_empty() {
        return Err(invalid("roomid", "must not be empty".into()));
    }
    let seat_id = entry.seatid.to_string();
    if seat_id.trim().is_empty() {
        return Err(invalid("seatid", "must not be empty".into()));
    }

    let allowed_days = entry
        .daysofweek
        .iter()
        .map(|day| DayOfWeek::parse(day))
        .collect::<Result<BTreeSet<_>, _>>()
        .map_err(|e| invalid("daysofweek", e.to_string()))?;

    Ok(UserReservation {
        username: credential.username,
        password: credential.password,
        time_slot,
        room_id,
        seat_id,
        allowed_days,
    })
}
