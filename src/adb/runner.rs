//! Subprocess invocation with timeout and outcome normalization.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::error::{AdbError, AdbResult};
use super::types::CommandResult;

/// Invokes the resolved binary with argument vectors and normalizes every
/// outcome into a [`CommandResult`].
///
/// The binary path is fixed at construction. Arguments are handed straight to
/// the process-spawn primitive; no shell ever interprets them on the host.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    binary: PathBuf,
}

impl CommandRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Runs the binary with `args`, waiting for completion.
    ///
    /// With a timeout, a child that does not finish in time is killed and the
    /// timeout sentinel is returned (exit code 1, both streams absent, even if
    /// the process produced partial output). Without one the call blocks for
    /// as long as the child runs, which is what long transfers need.
    pub async fn run(
        &self,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> AdbResult<CommandResult> {
        log::debug!("running {:?} with args {:?}", self.binary, args);

        let mut command = Command::new(&self.binary);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let waited = match timeout {
            Some(duration) => match tokio::time::timeout(duration, command.output()).await {
                Ok(output) => output,
                Err(_) => {
                    log::warn!(
                        "{:?} {:?} did not finish within {:?}",
                        self.binary,
                        args,
                        duration
                    );
                    return Ok(CommandResult::timeout());
                }
            },
            None => command.output().await,
        };

        let output = waited.map_err(|source| AdbError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;

        // A signal-terminated child carries no exit code.
        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = split_lines(&output.stderr);

        if output.status.success() {
            Ok(CommandResult::completed(
                exit_code,
                split_lines(&output.stdout),
                stderr,
            ))
        } else {
            log::warn!(
                "{:?} {:?} exited with {}: {}",
                self.binary,
                args,
                exit_code,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            // stdout is dropped on failure; the exit code and stderr carry
            // everything callers are allowed to rely on.
            Ok(CommandResult::completed(exit_code, None, stderr))
        }
    }
}

/// An empty captured stream maps to "absent", not an empty sequence.
fn split_lines(bytes: &[u8]) -> Option<Vec<String>> {
    if bytes.is_empty() {
        return None;
    }
    Some(
        String::from_utf8_lossy(bytes)
            .lines()
            .map(str::to_owned)
            .collect(),
    )
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh() -> CommandRunner {
        CommandRunner::new("/bin/sh")
    }

    #[tokio::test]
    async fn success_splits_streams_into_lines() {
        let result = sh()
            .run(&["-c", "printf 'one\\ntwo\\n'"], None)
            .await
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(
            result.stdout,
            Some(vec!["one".to_string(), "two".to_string()])
        );
        assert_eq!(result.stderr, None, "nothing captured means absent");
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn empty_stdout_is_absent_not_empty() {
        let result = sh().run(&["-c", "true"], None).await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, None);
    }

    #[tokio::test]
    async fn failure_passes_real_exit_code_through() {
        let result = sh()
            .run(&["-c", "echo oops >&2; echo partial; exit 3"], None)
            .await
            .unwrap();

        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout, None, "stdout is absent on failure");
        assert_eq!(result.stderr, Some(vec!["oops".to_string()]));
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn timeout_returns_sentinel_despite_partial_output() {
        let result = sh()
            .run(
                &["-c", "echo partial; sleep 5"],
                Some(Duration::from_millis(100)),
            )
            .await
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stdout, None);
        assert_eq!(result.stderr, None);
        assert!(result.timed_out, "timeout must be distinguishable");
        assert!(!result.success());
    }

    #[tokio::test]
    async fn fast_child_beats_the_timeout() {
        let result = sh()
            .run(&["-c", "echo quick"], Some(Duration::from_secs(5)))
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, Some(vec!["quick".to_string()]));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let runner = CommandRunner::new("/nonexistent/never-a-binary");
        let err = runner.run(&["devices"], None).await.unwrap_err();
        assert!(
            matches!(err, AdbError::Spawn { .. }),
            "expected Spawn, got {err:?}"
        );
    }
}
