//! Shared configuration for the lwscout CLI.
//!
//! TOML config file plus `LWSCOUT_` environment overrides, and
//! translation to `lwscout_core::ScoutConfig`. The CLI layers its
//! global flags on top of the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lwscout_core::ScoutConfig;
use lwscout_core::config::{DEFAULT_NAME_FILTER, DEFAULT_REDISCOVER_INTERVAL, DEFAULT_SERVICE_TYPE};

/// Environment variable prefix. Nested keys use `__`, e.g.
/// `LWSCOUT_GATEWAY__REST_PORT=8080`.
pub const ENV_PREFIX: &str = "LWSCOUT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Output preferences.
    #[serde(default)]
    pub defaults: Defaults,

    /// mDNS browsing.
    #[serde(default)]
    pub discovery: DiscoverySettings,

    /// Gateway REST bridge.
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Object schema assets.
    #[serde(default)]
    pub models: ModelSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiscoverySettings {
    /// Service type to browse, e.g. `_lwm2m._udp.`.
    #[serde(default = "default_service_type")]
    pub service_type: String,

    /// Case-insensitive fragment a gateway's service name must contain.
    #[serde(default = "default_name_filter")]
    pub name_filter: String,

    /// Seconds between discovery re-arms. 0 disables re-arming.
    #[serde(default = "default_rediscover_secs")]
    pub rediscover_secs: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            service_type: default_service_type(),
            name_filter: default_name_filter(),
            rediscover_secs: default_rediscover_secs(),
        }
    }
}

fn default_service_type() -> String {
    DEFAULT_SERVICE_TYPE.into()
}
fn default_name_filter() -> String {
    DEFAULT_NAME_FILTER.into()
}
fn default_rediscover_secs() -> u64 {
    DEFAULT_REDISCOVER_INTERVAL.as_secs()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GatewaySettings {
    /// REST bridge port on every gateway.
    #[serde(default = "default_rest_port")]
    pub rest_port: u16,

    #[serde(default = "default_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_timeout")]
    pub read_timeout_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            rest_port: default_rest_port(),
            connect_timeout_secs: default_timeout(),
            read_timeout_secs: default_timeout(),
        }
    }
}

fn default_rest_port() -> u16 {
    lwscout_core::config::DEFAULT_REST_PORT
}
fn default_timeout() -> u64 {
    5
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModelSettings {
    /// Directory containing `models/{id}.xml`. Defaults to the working
    /// directory.
    pub dir: Option<PathBuf>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "lwscout", "lwscout").map_or_else(
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
    p.push("lwscout");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from an explicit file + environment. A missing file is not an
/// error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and build the runtime config.
    pub fn to_scout_config(&self) -> Result<ScoutConfig, ConfigError> {
        let discovery = &self.discovery;
        let gateway = &self.gateway;

        if discovery.service_type.trim_matches('.').is_empty() {
            return Err(invalid("discovery.service_type", "must not be empty"));
        }
        if gateway.rest_port == 0 {
            return Err(invalid("gateway.rest_port", "must be between 1 and 65535"));
        }
        if gateway.connect_timeout_secs == 0 {
            return Err(invalid("gateway.connect_timeout_secs", "must be at least 1"));
        }
        if gateway.read_timeout_secs == 0 {
            return Err(invalid("gateway.read_timeout_secs", "must be at least 1"));
        }

        let mut scout = ScoutConfig {
            service_type: discovery.service_type.clone(),
            name_filter: discovery.name_filter.clone(),
            rest_port: gateway.rest_port,
            connect_timeout: Duration::from_secs(gateway.connect_timeout_secs),
            read_timeout: Duration::from_secs(gateway.read_timeout_secs),
            rediscover_interval: Duration::from_secs(discovery.rediscover_secs),
            ..ScoutConfig::default()
        };
        if let Some(ref dir) = self.models.dir {
            scout.model_dir.clone_from(dir);
        }
        Ok(scout)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_runtime_defaults() {
        let scout = Config::default().to_scout_config().unwrap();
        let expected = ScoutConfig::default();

        assert_eq!(scout.service_type, expected.service_type);
        assert_eq!(scout.name_filter, expected.name_filter);
        assert_eq!(scout.rest_port, 8088);
        assert_eq!(scout.connect_timeout, Duration::from_secs(5));
        assert_eq!(scout.read_timeout, Duration::from_secs(5));
        assert_eq!(scout.rediscover_interval, Duration::from_secs(30));
        assert_eq!(scout.model_dir, expected.model_dir);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[gateway]\nrest_port = 9000\n\n[models]\ndir = \"/opt/lwscout\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();

        assert_eq!(cfg.gateway.rest_port, 9000);
        assert_eq!(cfg.gateway.read_timeout_secs, 5);
        assert_eq!(cfg.discovery, DiscoverySettings::default());
        assert_eq!(cfg.models.dir, Some(PathBuf::from("/opt/lwscout")));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults, Defaults::default());
        assert_eq!(cfg.gateway, GatewaySettings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway]\nrest_port = \"eighty\"\n").unwrap();

        assert!(matches!(load_config_from(&path), Err(ConfigError::Figment(_))));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.discovery.rediscover_secs = 0;
        cfg.defaults.output = "json".into();

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.discovery.rediscover_secs, 0);
        assert_eq!(loaded.defaults.output, "json");
    }

    #[test]
    fn zero_rediscover_disables_rearm() {
        let mut cfg = Config::default();
        cfg.discovery.rediscover_secs = 0;
        assert!(cfg.to_scout_config().unwrap().rediscover_interval.is_zero());
    }

    #[test]
    fn rejects_invalid_values() {
        let mut cfg = Config::default();
        cfg.gateway.rest_port = 0;
        let err = cfg.to_scout_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "gateway.rest_port"));

        let mut cfg = Config::default();
        cfg.discovery.service_type = "..".into();
        assert!(cfg.to_scout_config().is_err());

        let mut cfg = Config::default();
        cfg.gateway.read_timeout_secs = 0;
        assert!(cfg.to_scout_config().is_err());
    }

    #[test]
    fn config_path_ends_with_file_name() {
        assert!(config_path().ends_with("config.toml"));
    }
}
