//! CLI configuration -- thin wrapper around `lwscout_config` shared types.
//!
//! Re-exports the shared types and layers `GlobalOpts` flag overrides
//! (--rest-port, --timeout, --models, ...) on top of file + env values.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use lwscout_core::ScoutConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use lwscout_config::{Config, config_path, load_config_from, save_config_to};

// ── Resolved settings ───────────────────────────────────────────────

/// Everything a command handler needs, flags already applied.
#[derive(Debug)]
pub struct Settings {
    pub scout: ScoutConfig,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

/// The config file in effect: `--config` / `LWSCOUT_CONFIG`, else the
/// platform default.
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file and environment without flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&active_config_path(global))?)
}

/// Build `Settings` from config file, environment and global flags.
///
/// CLI flag overrides take priority over file values.
pub fn resolve(global: &GlobalOpts) -> Result<Settings, CliError> {
    let cfg = load(global)?;
    let mut scout = cfg.to_scout_config()?;

    if let Some(port) = global.rest_port {
        if port == 0 {
            return Err(CliError::Validation {
                field: "rest-port".into(),
                reason: "must be between 1 and 65535".into(),
            });
        }
        scout.rest_port = port;
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        scout.connect_timeout = Duration::from_secs(secs);
        scout.read_timeout = Duration::from_secs(secs);
    }
    if let Some(ref dir) = global.models {
        scout.model_dir.clone_from(dir);
    }

    let output = match global.output {
        Some(format) => format,
        None => parse_setting::<OutputFormat>("defaults.output", &cfg.defaults.output)?,
    };
    let color = match global.color {
        Some(mode) => mode,
        None => parse_setting::<ColorMode>("defaults.color", &cfg.defaults.color)?,
    };

    Ok(Settings {
        scout,
        output,
        color: should_color(color),
        quiet: global.quiet,
    })
}

fn parse_setting<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Determine whether color output should be enabled.
fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}
