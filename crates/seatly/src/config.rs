//! CLI-side configuration helpers.
//!
//! Re-exports the shared `seatly-config` crate and adds the
//! `GlobalOpts`-aware path resolution on top.

use std::path::PathBuf;

pub use seatly_config::*;

use crate::cli::GlobalOpts;

/// The config file for this invocation: `--user` / `SEATLY_CONFIG`, else
/// the platform default.
pub fn resolve_path(global: &GlobalOpts) -> PathBuf {
    global.user.clone().unwrap_or_else(config_path)
}

/// Load the config file selected by the global options.
pub fn load(global: &GlobalOpts) -> Result<(PathBuf, Config), ConfigError> {
    let path = resolve_path(global);
    let config = load_config(&path)?;
    Ok((path, config))
}
