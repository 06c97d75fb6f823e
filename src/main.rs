//! Route audit - delivery route chronology and revisit auditor
//!
//! Reads driver routes as JSONL, checks each one for chronological order and
//! revisited pickup locations, and writes one JSONL report per route.
//!
//! Module structure:
//! - `domain/` - Core route types (VisitRecord, RouteChain)
//! - `io/` - Route input and report output
//! - `services/` - Business logic (RouteAuditor, scenarios, batch run)
//! - `infra/` - Infrastructure (Config, Metrics, Logging)

use clap::{Parser, Subcommand};
use route_audit::infra::{logging, AuditMetrics, Config};
use route_audit::io::{color_enabled, print_scenario_outcome, ReportWriter, RouteReader};
use route_audit::services::{run_batch, scenarios};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Route audit - detects revisits and time travel in delivery routes
#[derive(Parser, Debug)]
#[command(name = "route-audit", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit routes from a JSONL file and write JSONL reports
    Audit {
        /// Route input file ("-" for stdin)
        #[arg(short, long)]
        input: Option<String>,

        /// Report output file ("-" for stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Reject routes with more visits than this (0 = unlimited)
        #[arg(long)]
        max_visits: Option<usize>,
    },
    /// Run the built-in named scenarios and print pass/fail lines
    SelfCheck {
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config_path = Config::resolve_config_path(args.config.as_deref());
    let config = Config::load_from_path(&config_path);

    logging::init(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        config_file = %config.config_file(),
        "route_audit_starting"
    );

    match args.command {
        Command::Audit { input, output, max_visits } => {
            let mut config = config;
            if let Some(input) = input {
                config = config.with_input_path(input);
            }
            if let Some(output) = output {
                config = config.with_output_path(output);
            }
            if let Some(max) = max_visits {
                config = config.with_max_visits_per_route(max);
            }
            audit(&config)
        }
        Command::SelfCheck { no_color } => {
            let config = if no_color { config.with_color(false) } else { config };
            self_check(&config)
        }
    }
}

fn audit(config: &Config) -> anyhow::Result<ExitCode> {
    info!(
        input = %config.input_path(),
        output = %config.output_path(),
        max_visits_per_route = %config.max_visits_per_route(),
        "audit_started"
    );

    let reader = RouteReader::open(config.input_path())?;
    let mut writer = ReportWriter::open(config.output_path())?;
    let metrics = Arc::new(AuditMetrics::new());

    let summary = run_batch(reader, &mut writer, config, metrics)?;
    summary.log();

    Ok(ExitCode::SUCCESS)
}

fn self_check(config: &Config) -> anyhow::Result<ExitCode> {
    let outcomes = scenarios::run_all()?;

    let stdout = std::io::stdout();
    let color = color_enabled(config.color(), &stdout);
    let mut out = stdout.lock();
    for outcome in &outcomes {
        print_scenario_outcome(&mut out, outcome, color)?;
    }
    out.flush()?;

    let failed = outcomes.iter().filter(|o| !o.passed).count();
    if failed > 0 {
        error!(failed = %failed, total = %outcomes.len(), "self_check_failed");
        return Ok(ExitCode::FAILURE);
    }

    info!(total = %outcomes.len(), "self_check_passed");
    Ok(ExitCode::SUCCESS)
}
