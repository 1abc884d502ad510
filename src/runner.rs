//! Command execution
//!
//! The scheduler runs the user command through the [`Runner`] trait so
//! tests can substitute a recording fake. The real implementation hands
//! the command string to `sh -c`, which keeps pipes, redirects and shell
//! builtins working.

use std::process::Command;

/// Result of one command execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The child process ran to completion with this exit code.
    /// A signal-terminated child reports -1.
    Exited(i32),
    /// The child could not be spawned.
    Failed(String),
}

/// Executes the user command to completion.
pub trait Runner: Send + Sync {
    fn run(&self) -> RunOutcome;
}

/// Runs the command via `sh -c` with inherited stdio, so child output
/// streams live to the terminal.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    command: String,
}

impl ShellRunner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Runner for ShellRunner {
    fn run(&self) -> RunOutcome {
        match Command::new("sh").arg("-c").arg(&self.command).status() {
            Ok(status) => RunOutcome::Exited(status.code().unwrap_or(-1)),
            Err(err) => RunOutcome::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_command_reports_zero() {
        let runner = ShellRunner::new("true");
        assert_eq!(runner.run(), RunOutcome::Exited(0));
    }

    #[test]
    fn test_exit_code_is_captured() {
        let runner = ShellRunner::new("exit 7");
        assert_eq!(runner.run(), RunOutcome::Exited(7));
    }

    #[test]
    fn test_shell_constructs_are_supported() {
        let runner = ShellRunner::new("echo one && echo two | grep -q two");
        assert_eq!(runner.run(), RunOutcome::Exited(0));
    }

    #[test]
    fn test_unknown_command_reports_shell_exit() {
        // sh itself spawns fine; the lookup failure becomes exit 127
        let runner = ShellRunner::new("definitely-not-a-real-binary-xyz");
        assert_eq!(runner.run(), RunOutcome::Exited(127));
    }
}
