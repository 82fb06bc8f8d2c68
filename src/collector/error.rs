//! Acquisition errors.
//!
//! Every variant is fatal for the scrape that produced it. Whether the process
//! survives is decided by the caller (see `exporter::server`).

use std::process::ExitStatus;

/// Coarse classification of an acquisition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The acquisition channel (subprocess, bus connection) could not be opened.
    Start,
    /// The channel answered, but not in the expected shape.
    Protocol,
}

/// Error type for statistics acquisition.
#[derive(Debug)]
pub enum CollectError {
    /// The diagnostic command could not be started.
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The diagnostic command exited unsuccessfully.
    CommandExit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    /// The diagnostic command wrote something that is not UTF-8 text.
    InvalidOutput { program: String },
    /// Connecting to the system bus failed.
    BusConnect(String),
    /// The resolver service is not reachable on the bus.
    ServiceUnavailable(String),
    /// Reading a property failed.
    PropertyRead { property: String, message: String },
    /// A property holds a value of an unexpected type.
    PropertyType { property: String, message: String },
    /// A property holds fewer values than expected.
    ShortProperty {
        property: String,
        expected: usize,
        actual: usize,
    },
}

impl CollectError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CollectError::Spawn { .. }
            | CollectError::CommandExit { .. }
            | CollectError::BusConnect(_)
            | CollectError::ServiceUnavailable(_) => FailureKind::Start,
            CollectError::InvalidOutput { .. }
            | CollectError::PropertyRead { .. }
            | CollectError::PropertyType { .. }
            | CollectError::ShortProperty { .. } => FailureKind::Protocol,
        }
    }
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Spawn { program, source } => {
                write!(f, "failed to run {}: {}", program, source)
            }
            CollectError::CommandExit {
                program,
                status,
                stderr,
            } => {
                if stderr.is_empty() {
                    write!(f, "{} exited with {}", program, status)
                } else {
                    write!(f, "{} exited with {}: {}", program, status, stderr)
                }
            }
            CollectError::InvalidOutput { program } => {
                write!(f, "{} produced non UTF-8 output", program)
            }
            CollectError::BusConnect(msg) => write!(f, "system bus connection failed: {}", msg),
            CollectError::ServiceUnavailable(msg) => {
                write!(f, "resolver service unavailable: {}", msg)
            }
            CollectError::PropertyRead { property, message } => {
                write!(f, "failed to read property {}: {}", property, message)
            }
            CollectError::PropertyType { property, message } => {
                write!(f, "unexpected type for property {}: {}", property, message)
            }
            CollectError::ShortProperty {
                property,
                expected,
                actual,
            } => write!(
                f,
                "property {} holds {} values, expected {}",
                property, actual, expected
            ),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
