//! Clap derive structures for the `seatly` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// seatly -- reserve library seats for a list of users
#[derive(Debug, Parser)]
#[command(
    name = "seatly",
    version,
    about = "Reserve library seats for every configured user",
    long_about = "Logs each configured user in to the seat booking site and submits \
        their reservation concurrently, retrying until the seat is claimed, the \
        attempt cap is reached, or the site refuses for good.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// User config file (TOML or JSON)
    #[arg(long, short = 'u', env = "SEATLY_CONFIG", global = true)]
    pub user: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SEATLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one user per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reserve seats for every configured user now
    #[command(alias = "r")]
    Reserve(ReserveArgs),

    /// Inspect the configuration and manage stored passwords
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Reserve ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReserveArgs {
    /// Scheduled-runner mode: use UTC+8 for "today" and read credentials
    /// from the USERNAMES / PASSWORDS environment variables
    #[arg(long, short = 'a')]
    pub action: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration (passwords redacted)
    Show,

    /// Print the config file path in use
    Path,

    /// Store a user's password in the system keyring
    SetPassword {
        /// Username the password belongs to
        username: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
