//! mempool-cli: submit or test-accept a transaction package from a fixture.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mempool::{MempoolConfig, StandardVerifierAdapter, ValidationMode};
use mempool_cli::{run, CliVerifier, Fixture};
use node_telemetry::{init_logging, LogConfig};

/// Package admission from JSON fixtures
#[derive(Parser, Debug)]
#[command(name = "mempool-cli")]
#[command(about = "Validate transaction packages against a fixture chain state")]
struct Cli {
    /// Emit logs as JSON objects
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report what admitting the package would do, without admitting it
    Testaccept(FixtureArgs),
    /// Admit the package into a pool seeded from the fixture
    Submit(FixtureArgs),
}

#[derive(Args, Debug)]
struct FixtureArgs {
    /// Fixture file (JSON)
    #[arg(short, long)]
    fixture: PathBuf,

    /// Accept every script instead of verifying signatures
    #[arg(long)]
    skip_scripts: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_config = LogConfig::for_service("mempool-cli").with_json_logs(cli.json_logs);
    init_logging(&log_config).context("Failed to initialize logging")?;

    let (args, mode) = match &cli.command {
        Command::Testaccept(args) => (args, ValidationMode::DryRun),
        Command::Submit(args) => (args, ValidationMode::Commit),
    };

    let fixture = Fixture::load(&args.fixture)?;
    let config = MempoolConfig::from_env();
    config.validate().context("Invalid mempool configuration")?;

    let verifier = if args.skip_scripts {
        CliVerifier::Skip
    } else {
        CliVerifier::Standard(StandardVerifierAdapter::default())
    };

    let result = run(&fixture, config, verifier, mode)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("Failed to encode result")?
    );

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
