//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (probe, headers, validate), and their associated argument
//! structs. Flags that matter in a container have an environment variable
//! equivalent.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "suture",
    version,
    about = "Stamp outgoing HTTP requests with the Suture_ID tracing header",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        SUTURE_ID=abc suture headers                 Show the headers that would be sent\n  \
        suture probe https://example.com/healthz     Send a request through the transport\n  \
        suture validate suture.yaml                  Check a config file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty", global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one request through the header-injecting transport
    Probe(ProbeArgs),

    /// Print the headers the transport would set, without sending anything
    Headers(HeadersArgs),

    /// Validate a config file
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        suture probe https://api.example.com/healthz          Absolute URL\n  \
        suture probe /api/v1/namespaces --host https://k8s    Path joined onto the host\n  \
        suture probe https://echo.local -X POST -d '{}'       Request with a JSON body")]
pub struct ProbeArgs {
    /// Absolute URL, or a path joined onto the configured host
    pub target: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request body
    #[arg(short, long)]
    pub data: Option<String>,

    #[command(flatten)]
    pub transport: TransportArgs,

    /// Request timeout in milliseconds (overrides the config file)
    #[arg(long, env = "REQUEST_TIMEOUT_MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Print only the response body
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct HeadersArgs {
    /// Pretend the request carries this body
    #[arg(short, long)]
    pub data: Option<String>,

    #[command(flatten)]
    pub transport: TransportArgs,
}

/// Options shared by commands that build a transport.
#[derive(Args)]
pub struct TransportArgs {
    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "SUTURE_CONFIG")]
    pub config: Option<PathBuf>,

    /// API server base URL (overrides the config file)
    #[arg(long, env = "SUTURE_HOST")]
    pub host: Option<String>,

    /// Extra static header, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME=VALUE", value_parser = parse_header_pair)]
    pub headers: Vec<(String, String)>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "suture.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

/// Parse a `name=value` (or `name: value`) header flag.
pub fn parse_header_pair(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .or_else(|| raw.split_once(':'))
        .ok_or_else(|| format!("'{raw}' is not in NAME=VALUE form"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("'{raw}' has an empty header name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
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
pub enum ValidateFormat {
    Text,
    Json,
}
