// Core records shared by the runner and the session layer.
use serde::Serialize;
use std::time::Duration;

/// Normalized outcome of one subprocess invocation.
///
/// An absent stream means "no output captured" and is distinct from an empty
/// sequence of lines; it typically accompanies a failure. `exit_code` is `0`
/// only on confirmed success of the invoked process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub stdout: Option<Vec<String>>,
    pub stderr: Option<Vec<String>>,
    pub exit_code: i32,
    /// Set only when the invocation was cut off by the caller's timeout.
    /// The sentinel keeps `exit_code == 1` for compatibility; this flag is
    /// what tells a timeout apart from a real exit code 1.
    pub timed_out: bool,
}

impl CommandResult {
    pub fn completed(
        exit_code: i32,
        stdout: Option<Vec<String>>,
        stderr: Option<Vec<String>>,
    ) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            timed_out: false,
        }
    }

    /// The timeout sentinel: exit code 1, both streams absent.
    pub fn timeout() -> Self {
        Self {
            stdout: None,
            stderr: None,
            exit_code: 1,
            timed_out: true,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Session-wide knobs. The defaults match the historical behavior: no timeout
/// on any command, and listing operations that swallow command failures into
/// an empty result.
#[derive(Debug, Clone, Default)]
pub struct AdbOptions {
    /// Applied to query-style commands. Transfers (push/pull/install) always
    /// run unbounded since they have no natural time limit.
    pub command_timeout: Option<Duration>,
    /// When set, list-returning operations report a failed underlying command
    /// as an error instead of an empty sequence.
    pub strict_listings: bool,
}
