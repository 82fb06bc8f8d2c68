//! Abstractions over the resolver's acquisition channels.
//!
//! `CommandRunner` runs the diagnostic command and `ResolverBus` reads
//! statistics properties from the bus. Both have real implementations for
//! production and in-memory mocks (see `collector::mock`) for tests.

use std::process::{Command, Stdio};

use crate::collector::error::CollectError;

/// Runs an external command and returns its standard output.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` to completion.
    ///
    /// # Returns
    /// Captured stdout, or an error if the command could not be started,
    /// exited unsuccessfully, or wrote non UTF-8 output.
    fn run(&self, program: &str, args: &[String]) -> Result<String, CollectError>;
}

/// Reads statistics properties of the resolver manager object.
pub trait ResolverBus: Send + Sync {
    /// Reads the named properties in one session.
    ///
    /// Each property decodes to an ordered sequence of `u64`. The result has
    /// one entry per requested property, in request order. Any resource
    /// opened for the read is released before returning.
    fn read_statistics(&self, properties: &[&str]) -> Result<Vec<Vec<u64>>, CollectError>;
}

/// Command runner backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealCommand;

impl RealCommand {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for RealCommand {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CollectError> {
        // `output()` drains both pipes and waits, so nothing outlives the call.
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CollectError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CollectError::CommandExit {
                program: program.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| CollectError::InvalidOutput {
            program: program.to_string(),
        })
    }
}
