//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// llmroute - Route LLM requests by cost, latency, privacy and budget.
#[derive(Parser, Debug)]
#[command(name = "llmroute")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (overrides LLMROUTE_CONFIG)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick a provider for a request
    Route(RouteArgs),

    /// List configured providers
    Providers(ProvidersArgs),

    /// Check whether messages would be treated as sensitive
    CheckSensitive(CheckSensitiveArgs),

    /// Show resolved configuration and where each value came from
    Config,

    /// Route a batch of requests and print the analytics summary
    Simulate(SimulateArgs),
}

/// Arguments for the `route` command.
#[derive(Parser, Debug)]
pub struct RouteArgs {
    /// Strategy override: cheapest, fastest, balanced, privacy-first, reliability
    #[arg(long, short, value_name = "STRATEGY")]
    pub strategy: Option<String>,

    /// Daily budget in USD (overrides config)
    #[arg(long, value_name = "USD")]
    pub daily_limit: Option<f64>,

    /// System message prepended to the conversation
    #[arg(long, value_name = "TEXT")]
    pub system: Option<String>,

    /// Show every candidate with its score
    #[arg(long)]
    pub explain: bool,

    /// Forward the request to the chosen provider and print the reply
    #[arg(long)]
    pub send: bool,

    /// User messages, in order
    #[arg(value_name = "MESSAGE")]
    pub message: Vec<String>,
}

/// Arguments for the `providers` command.
#[derive(Parser, Debug)]
pub struct ProvidersArgs {
    /// Probe each provider's health endpoint once
    #[arg(long)]
    pub probe: bool,
}

/// Arguments for the `check-sensitive` command.
#[derive(Parser, Debug)]
pub struct CheckSensitiveArgs {
    /// Messages to classify
    #[arg(value_name = "MESSAGE", required = true)]
    pub message: Vec<String>,
}

/// Arguments for the `simulate` command.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// JSON-lines file of requests, or "-" for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Default strategy (overrides config)
    #[arg(long, short, value_name = "STRATEGY")]
    pub strategy: Option<String>,

    /// Daily budget in USD (overrides config)
    #[arg(long, value_name = "USD")]
    pub daily_limit: Option<f64>,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output for scripts
    Json,
}
