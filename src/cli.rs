//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, init, validate, probe), and their associated
//! argument structs. Most flags have an environment variable equivalent
//! for container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "ceno-proxy",
    version,
    about = "Local bundle-retrieval proxy node",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        ceno-proxy init -i                   Create a config interactively\n  \
        ceno-proxy probe                     Check the cache and request servers\n  \
        ceno-proxy run                       Start with ./ceno.json"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Run(RunArgs),

    /// Generate a starter config file
    Init(InitArgs),

    /// Validate a config file without starting
    Validate(ValidateArgs),

    /// Check that the cache and request servers are reachable
    Probe(ProbeArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        ceno-proxy run                               Auto-detect config\n  \
        ceno-proxy run -c ceno.yaml                  Specific config file\n  \
        ceno-proxy run -c ceno.json -p 8080 --pretty Local dev mode")]
pub struct RunArgs {
    /// Config file path (.json, .yaml, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Listen port (overrides the config file)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Never prompt for a missing config, fail instead
    #[arg(long)]
    pub no_interactive: bool,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Upstream deadline budget per request in milliseconds (overrides the config file)
    #[arg(long, env = "REQUEST_TIMEOUT_MS", help_heading = "Tuning")]
    pub timeout: Option<u64>,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        ceno-proxy init                          Quick start config (json)\n  \
        ceno-proxy init -i                       Interactive wizard\n  \
        ceno-proxy init -f yaml -o ceno.yaml     Non-interactive, YAML format")]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include every field with its default value (non-interactive only)
    #[arg(long, conflicts_with = "interactive")]
    pub full: bool,

    /// Launch interactive wizard to build config step by step
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "ceno.json")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// Config file path (.json, .yaml, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Per-service timeout in milliseconds (defaults to the config value)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
