//! Validated exporter settings.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::collector::text::{DEFAULT_ARGS, DEFAULT_COMMAND, TextStatsReader};
use crate::collector::{
    AcquisitionMode, MetricRegistry, RealCommand, StatsCollector, SystemBus,
};

/// Default listen address, in the `:PORT` form.
pub const DEFAULT_LISTEN: &str = ":9924";
/// Default path of the metrics endpoint.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Error type for invalid settings.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The listen address could not be resolved.
    InvalidListen { value: String, message: String },
    /// The metrics path is not usable as a route.
    InvalidMetricsPath(String),
    /// A zero scrape timeout was requested.
    ZeroTimeout,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidListen { value, message } => {
                write!(f, "invalid listen address '{}': {}", value, message)
            }
            ConfigError::InvalidMetricsPath(path) => write!(
                f,
                "invalid metrics path '{}': must start with '/' and not be '/' or '/health'",
                path
            ),
            ConfigError::ZeroTimeout => write!(f, "scrape timeout must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parses a listen address.
///
/// Accepts `host:port`, `[v6]:port` and the `:port` shorthand, which binds
/// every IPv4 interface.
pub fn parse_listen_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    let value = value.trim();
    let candidate = if value.starts_with(':') {
        format!("0.0.0.0{}", value)
    } else {
        value.to_string()
    };

    let invalid = |message: String| ConfigError::InvalidListen {
        value: value.to_string(),
        message,
    };

    if let Ok(addr) = candidate.parse::<SocketAddr>() {
        return Ok(addr);
    }

    candidate
        .to_socket_addrs()
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("address resolved to nothing".to_string()))
}

/// Exporter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterConfig {
    pub listen: SocketAddr,
    pub metrics_path: String,
    pub mode: AcquisitionMode,
    pub include_dnssec: bool,
    /// Diagnostic command used in `cli` mode.
    pub command: String,
    pub command_args: Vec<String>,
    /// Upper bound on how long a request waits for acquisition.
    pub scrape_timeout: Option<Duration>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 9924)),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
            mode: AcquisitionMode::default(),
            include_dnssec: false,
            command: DEFAULT_COMMAND.to_string(),
            command_args: DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
            scrape_timeout: None,
        }
    }
}

impl ExporterConfig {
    /// Checks settings that cannot be expressed in their types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = self.metrics_path.as_str();
        if !path.starts_with('/') || path == "/" || path == "/health" {
            return Err(ConfigError::InvalidMetricsPath(self.metrics_path.clone()));
        }
        if self.scrape_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Builds the production collector for the configured mode.
    pub fn build_collector(&self) -> StatsCollector {
        let registry = MetricRegistry::build(self.include_dnssec);
        match self.mode {
            AcquisitionMode::Cli => StatsCollector::new(
                registry,
                TextStatsReader::new(RealCommand::new())
                    .with_command(self.command.clone(), self.command_args.clone()),
            ),
            AcquisitionMode::Dbus => StatsCollector::dbus(SystemBus::new(), self.include_dnssec),
        }
    }
}
