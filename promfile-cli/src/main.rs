// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  promfile — one measurement in, one Prometheus textfile out
//
//  Sources: speedtest CLI (subprocess) / weatherapi.com (HTTP GET)
//  Output:  <NODE_EXPORTER_DIR>/<source>.prom, replaced each run
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use anyhow::Context;
use clap::{Parser, Subcommand};
use promfile_core::{ExporterConfig, ExporterError};
use promfile_sources::{Source, Speedtest, Weather};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "promfile", version, about = "Write one measurement as a Prometheus textfile")]
struct Cli {
    #[command(subcommand)]
    source: SourceCommand,

    /// Optional YAML configuration file (environment variables override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory scraped by the node exporter textfile collector
    /// (overrides NODE_EXPORTER_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum SourceCommand {
    /// Run `speedtest -f json` and export bandwidth/latency gauges
    Speedtest,
    /// Fetch current conditions and air quality from weatherapi.com
    Weather,
}

impl SourceCommand {
    fn source(self) -> &'static dyn Source {
        match self {
            SourceCommand::Speedtest => &Speedtest,
            SourceCommand::Weather => &Weather,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<ExporterError>()
                .map(|e| {
                    error!(kind = ?e.kind(), "Export failed");
                    e.exit_code()
                })
                .unwrap_or(1);
            eprintln!("Error: {err:#}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = ExporterConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        config = config.with_output_dir(dir);
    }

    let source = cli.source.source();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        source = source.name(),
        output_dir = %config.node_exporter_dir.display(),
        "promfile starting"
    );

    let summary = promfile_sources::export(source, &config)
        .with_context(|| format!("{} export failed", source.name()))?;
    info!(path = %summary.path.display(), metrics = summary.metrics, "Done");
    Ok(())
}
