//! # quetzal CLI entry point
//!
//! Offline tooling around a policy file: check it, or replay a stored
//! webhook delivery against it without touching the remote system.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use quetzal::{config, ConfigError, DispatchResult, Dispatcher, DryRunClient, EventAdapter, Webhook};

/// Quetzal policy tooling.
#[derive(Parser, Debug)]
#[command(name = "quetzal", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a policy file and report every invalid policy.
    Validate(ValidateArgs),

    /// Dispatch a stored webhook body against a policy file (dry run).
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Path to the policy file.
    #[arg(long, env = "QUETZAL_CONFIG")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Path to the policy file.
    #[arg(long, env = "QUETZAL_CONFIG")]
    config: PathBuf,

    /// Path to a JSON webhook body.
    #[arg(long)]
    event: PathBuf,

    /// The `X-Gitlab-Event` header value the body was delivered with.
    #[arg(long)]
    kind: Option<String>,
}

#[derive(Serialize)]
struct ReplayReport {
    kind: String,
    matches: Vec<DispatchResult>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Replay(args) => run_replay(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_validate(args: &ValidateArgs) -> anyhow::Result<u8> {
    match config::load(&args.config) {
        Ok(cfg) => {
            println!("{}: {} policies OK", args.config.display(), cfg.policies.len());
            Ok(0)
        }
        Err(ConfigError::InvalidPolicies(invalid)) => {
            for policy in &invalid {
                println!("policy `{}`:", policy.policy);
                for err in &policy.errors {
                    println!("  - {err}");
                }
            }
            println!("{} invalid", invalid.len());
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| format!("loading {}", args.config.display())),
    }
}

fn run_replay(args: &ReplayArgs) -> anyhow::Result<u8> {
    let cfg = config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let body = std::fs::read(&args.event)
        .with_context(|| format!("reading {}", args.event.display()))?;
    let hook = Webhook::decode(args.kind.as_deref(), &body)
        .with_context(|| format!("decoding {}", args.event.display()))?;
    let kind = hook.resource_type().to_string();

    let matches = Dispatcher::new(cfg.dispatcher.clone())
        .dispatch_all(
            cfg.shared_policies(),
            Arc::new(hook),
            Arc::new(DryRunClient::new()),
        )
        .context("dispatching")?;

    let report = ReplayReport { kind, matches };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}
