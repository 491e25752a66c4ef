//! Clap derive structures for the `lwscout` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lwscout -- find LwM2M gateways on the local network and inspect their devices
#[derive(Debug, Parser)]
#[command(
    name = "lwscout",
    version,
    about = "Discover LwM2M gateways and browse their devices",
    long_about = "Browses mDNS for LwM2M gateways, aggregates the devices registered\n\
        with each one through the gateway REST bridge, and reads or writes\n\
        individual device resources.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "LWSCOUT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// REST bridge port on the gateways
    #[arg(long, env = "LWSCOUT_REST_PORT", global = true)]
    pub rest_port: Option<u16>,

    /// Connect and read timeout in seconds
    #[arg(long, env = "LWSCOUT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Directory containing models/{id}.xml object schemas
    #[arg(long, env = "LWSCOUT_MODELS", global = true)]
    pub models: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', env = "LWSCOUT_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Discover gateways and list their registered devices
    #[command(alias = "dev", alias = "d")]
    Devices(DiscoverArgs),

    /// Discover gateways and list them
    #[command(alias = "gw", alias = "g")]
    Gateways(DiscoverArgs),

    /// Show the object instances a device exposes
    #[command(alias = "obj")]
    Objects(DeviceArgs),

    /// List the resources an object type defines
    #[command(alias = "res")]
    Resources(ResourcesArgs),

    /// Read one resource through its gateway
    Read(ReadArgs),

    /// Write one resource through its gateway
    Write(WriteArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Discovery ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// How long to browse before printing (e.g. 5s, 1m)
    #[arg(long, short = 'd', default_value = "5s", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Keep browsing and re-print on every change until Ctrl+C
    #[arg(long, short = 'w')]
    pub watch: bool,
}

// ── Device access ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Gateway address (IPv4, IPv6 or hostname)
    pub host: String,

    /// Device endpoint name
    pub endpoint: String,
}

#[derive(Debug, Args)]
pub struct ResourcesArgs {
    /// Object type id, e.g. 3303
    pub object_id: u16,
}

#[derive(Debug, Args)]
pub struct ResourcePath {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Object id
    pub object_id: u16,

    /// Object instance id
    pub instance_id: u16,

    /// Resource id
    pub resource_id: u16,
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    #[command(flatten)]
    pub path: ResourcePath,

    /// Refuse unless the object schema marks the resource readable
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct WriteArgs {
    #[command(flatten)]
    pub path: ResourcePath,

    /// Value sent as the text/plain request body
    pub value: String,

    /// Refuse unless the object schema marks the resource writable
    #[arg(long)]
    pub strict: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
