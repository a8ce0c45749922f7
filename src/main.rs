//! llmroute - LLM provider routing engine
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use llmroute::cli::{self, Cli, Commands, GlobalOptions};
use llmroute::core::logging::{self, LogFormat, LogLevel, LogSettings};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let settings = LogSettings::resolve(
        cli.log_level.as_deref().and_then(LogLevel::from_arg),
        cli.json_output.then_some(LogFormat::Json),
        None,
        cli.verbose,
    );
    logging::init(&settings);

    if !should_use_color(cli.no_color) {
        colored::control::set_override(false);
    }

    let opts = GlobalOptions::from_cli(&cli);
    match run(&cli, opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, code = e.error_code(), "Command failed");
            eprintln!(
                "{}",
                llmroute::render::error::render_error(&e, opts.format, opts.pretty)
            );
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: &Cli, opts: GlobalOptions<'_>) -> llmroute::Result<()> {
    match &cli.command {
        None => {
            print_quickstart();
            Ok(())
        }
        Some(Commands::Route(args)) => cli::route::execute(args, opts).await,
        Some(Commands::Providers(args)) => cli::providers::execute(args, opts).await,
        Some(Commands::CheckSensitive(args)) => cli::sensitive::execute(args, opts),
        Some(Commands::Config) => cli::config::execute(opts),
        Some(Commands::Simulate(args)) => cli::simulate::execute(args, opts),
    }
}

fn should_use_color(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn print_quickstart() {
    println!(
        r#"llmroute - Route LLM requests by cost, latency, privacy and budget

USAGE:
    llmroute [OPTIONS] <COMMAND>

COMMANDS:
    route            Pick a provider for a request
    providers        List configured providers
    check-sensitive  Check whether messages would be treated as sensitive
    config           Show resolved configuration
    simulate         Route a batch of requests and print the summary

QUICK START:
    llmroute route "summarize this"                 # Route with the default strategy
    llmroute route -s fastest --explain "hi"        # Show every candidate
    llmroute route --daily-limit 1 "long prompt"    # Enforce a budget
    llmroute check-sensitive "my password is x"     # Explain privacy routing
    llmroute providers --probe                      # Probe health endpoints

ROBOT MODE (for scripts and agents):
    llmroute route --json "hi"                      # JSON envelope on stdout

For more help: llmroute --help"#
    );
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
}
