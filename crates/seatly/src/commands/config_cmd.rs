//! Config subcommand handlers.

use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, KeyringStore, PasswordStore};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let (path, cfg) = config::load(global)?;
            let redacted = cfg.redacted();

            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    format!("# {}\n{}", path.display(), redacted.to_toml()?)
                }
                _ => output::render_single(&global.output, &redacted, |_| String::new()),
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            let path = config::resolve_path(global);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { username } => {
            let secret = rpassword::prompt_password(format!("Password for {username}: "))
                .map_err(CliError::Prompt)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            KeyringStore.set(&username, &SecretString::from(secret))?;
            if !global.quiet {
                eprintln!("✓ password for {username} stored in system keyring");
            }
            Ok(())
        }
    }
}
