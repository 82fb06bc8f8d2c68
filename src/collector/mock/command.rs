//! Mock command runner.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::collector::error::CollectError;
use crate::collector::traits::CommandRunner;

#[derive(Debug, Clone)]
enum Outcome {
    Stdout(String),
    Exit { code: i32, stderr: String },
}

/// Command runner that answers from canned outputs.
///
/// Commands are keyed by their full command line (`program arg1 arg2`).
/// Unknown commands fail as if the program did not exist. Clones share the
/// invocation counter.
#[derive(Debug, Clone, Default)]
pub struct MockCommand {
    outcomes: HashMap<String, Outcome>,
    calls: Arc<AtomicUsize>,
}

fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

impl MockCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command that succeeds with `stdout`.
    pub fn with_output(mut self, command: &str, stdout: impl Into<String>) -> Self {
        self.outcomes
            .insert(command.to_string(), Outcome::Stdout(stdout.into()));
        self
    }

    /// Registers a command that exits with `code`.
    pub fn with_exit(mut self, command: &str, code: i32, stderr: impl Into<String>) -> Self {
        self.outcomes.insert(
            command.to_string(),
            Outcome::Exit {
                code,
                stderr: stderr.into(),
            },
        );
        self
    }

    /// Number of commands run so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code as u32)
}

impl CommandRunner for MockCommand {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CollectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcomes.get(&command_line(program, args)) {
            Some(Outcome::Stdout(out)) => Ok(out.clone()),
            Some(Outcome::Exit { code, stderr }) => Err(CollectError::CommandExit {
                program: program.to_string(),
                status: exit_status(*code),
                stderr: stderr.clone(),
            }),
            None => Err(CollectError::Spawn {
                program: program.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such mock command"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_command_output() {
        let cmd = MockCommand::new().with_output("systemd-resolve --statistics", "Cache Hits: 1\n");
        let out = cmd
            .run("systemd-resolve", &["--statistics".to_string()])
            .unwrap();
        assert_eq!(out, "Cache Hits: 1\n");
        assert_eq!(cmd.calls(), 1);
    }

    #[test]
    fn test_mock_command_exit() {
        let cmd = MockCommand::new().with_exit("systemd-resolve --statistics", 1, "bus error");
        let err = cmd
            .run("systemd-resolve", &["--statistics".to_string()])
            .unwrap_err();
        match err {
            CollectError::CommandExit { status, stderr, .. } => {
                assert!(!status.success());
                assert_eq!(status.code(), Some(1));
                assert_eq!(stderr, "bus error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mock_command_unknown() {
        let cmd = MockCommand::new();
        assert!(matches!(
            cmd.run("resolvectl", &[]),
            Err(CollectError::Spawn { .. })
        ));
    }
}
