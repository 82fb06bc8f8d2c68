//! Runs the diagnostic command and parses its output.

use tracing::{debug, warn};

use super::parser::parse_statistics;
use crate::collector::error::CollectError;
use crate::collector::snapshot::StatSnapshot;
use crate::collector::traits::CommandRunner;

/// Default diagnostic command.
pub const DEFAULT_COMMAND: &str = "systemd-resolve";

/// Default arguments for [`DEFAULT_COMMAND`].
pub const DEFAULT_ARGS: &[&str] = &["--statistics"];

/// Acquires statistics by running the resolver's diagnostic command.
pub struct TextStatsReader<C: CommandRunner> {
    runner: C,
    program: String,
    args: Vec<String>,
}

impl<C: CommandRunner> TextStatsReader<C> {
    /// Creates a reader that runs `systemd-resolve --statistics`.
    pub fn new(runner: C) -> Self {
        Self {
            runner,
            program: DEFAULT_COMMAND.to_string(),
            args: DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Overrides the command line, e.g. `resolvectl statistics`.
    pub fn with_command(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.args = args;
        self
    }

    /// Runs the command once and parses its stdout.
    pub fn read(&self) -> Result<StatSnapshot, CollectError> {
        debug!(program = %self.program, args = ?self.args, "running statistics command");
        let output = self.runner.run(&self.program, &self.args)?;
        let snapshot = parse_statistics(&output);
        if snapshot.is_empty() {
            warn!(program = %self.program, "statistics command produced no statistic lines");
        }
        Ok(snapshot)
    }
}
