//! systemd-resolved-exporter - Prometheus exporter for systemd-resolved.
//!
//! Reads resolver statistics on every scrape, either over the system bus
//! (default) or by parsing `systemd-resolve --statistics`, and serves them in
//! the Prometheus text format.
//!
//! Usage:
//!   systemd-resolved-exporter                      # bus mode on :9924
//!   systemd-resolved-exporter --mode cli --dnssec  # parse command output, with DNSSEC verdicts
//!   systemd-resolved-exporter --listen 127.0.0.1:9924 --debug

use std::process;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use resolved_exporter::collector::AcquisitionMode;
use resolved_exporter::exporter::config::{DEFAULT_LISTEN, DEFAULT_METRICS_PATH};
use resolved_exporter::exporter::{ExporterConfig, parse_listen_addr, run};

/// Prometheus exporter for systemd-resolved statistics.
#[derive(Parser)]
#[command(
    name = "systemd-resolved-exporter",
    about = "Prometheus exporter for systemd-resolved statistics",
    version
)]
struct Args {
    /// Listen address (`host:port`, or `:port` for all interfaces).
    #[arg(long, default_value = DEFAULT_LISTEN, env = "RESOLVED_EXPORTER_LISTEN")]
    listen: String,

    /// Path of the metrics endpoint.
    #[arg(long, default_value = DEFAULT_METRICS_PATH, env = "RESOLVED_EXPORTER_METRICS_PATH")]
    metrics_path: String,

    /// How statistics are acquired: `dbus` (system bus) or `cli` (command output).
    #[arg(long, default_value = "dbus", env = "RESOLVED_EXPORTER_MODE")]
    mode: AcquisitionMode,

    /// Export DNSSEC verdict counters.
    #[arg(long, env = "RESOLVED_EXPORTER_DNSSEC")]
    dnssec: bool,

    /// Enable debug logging.
    #[arg(long, env = "RESOLVED_EXPORTER_DEBUG")]
    debug: bool,

    /// Statistics command used in `cli` mode.
    #[arg(long, default_value = "systemd-resolve", env = "RESOLVED_EXPORTER_COMMAND")]
    resolved_command: String,

    /// Comma-separated arguments for the statistics command.
    #[arg(
        long,
        default_value = "--statistics",
        env = "RESOLVED_EXPORTER_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    resolved_args: Vec<String>,

    /// Seconds a scrape may wait for the resolver before answering 504.
    #[arg(long, value_name = "SECONDS", env = "RESOLVED_EXPORTER_SCRAPE_TIMEOUT")]
    scrape_timeout: Option<u64>,
}

/// Initializes the tracing subscriber. Default level is INFO, DEBUG with `--debug`.
fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::from_default_env()
        .add_directive(
            format!("systemd_resolved_exporter={}", level)
                .parse()
                .expect("static directive"),
        )
        .add_directive(
            format!("resolved_exporter={}", level)
                .parse()
                .expect("static directive"),
        );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: Args) -> Result<ExporterConfig, Box<dyn std::error::Error>> {
    let config = ExporterConfig {
        listen: parse_listen_addr(&args.listen)?,
        metrics_path: args.metrics_path,
        mode: args.mode,
        include_dnssec: args.dnssec,
        command: args.resolved_command,
        command_args: args.resolved_args,
        scrape_timeout: args.scrape_timeout.map(Duration::from_secs),
    };
    config.validate()?;
    Ok(config)
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            process::exit(2);
        }
    };

    info!("systemd-resolved-exporter {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        mode = %config.mode,
        dnssec = config.include_dnssec,
        listen = %config.listen,
        "config"
    );
    if config.mode == AcquisitionMode::Cli {
        info!(command = %config.command, args = ?config.command_args, "statistics command");
    }

    let collector = config.build_collector();

    if let Err(e) = run(&config, collector) {
        error!(error = %e, "exiting");
        process::exit(1);
    }

    info!("stopped");
}
