//! Device-session operations: everything funnels through [`CommandRunner`].

use std::path::{Path, PathBuf};

use super::error::{AdbError, AdbResult};
use super::locator;
use super::runner::CommandRunner;
use super::types::{AdbOptions, CommandResult};

const PACKAGE_PREFIX: &str = "package:";

/// Locations probed by `is_rooted`; covers emulators and the common su
/// managers.
const SU_PATHS: &[&str] = &[
    "/system/xbin/su",
    "/system/bin/su",
    "/sbin/su",
    "/su/bin/su",
];

/// A session against the platform `adb` binary.
///
/// The binary path is resolved from `PATH` once at construction and never
/// re-resolved. Construction insists on exactly one candidate: zero means adb
/// is not installed, more than one means the environment is ambiguous about
/// which installation would be invoked.
///
/// Every operation spawns one child process and fully awaits it; a session
/// holds no mutable state, so it can be shared freely across tasks.
pub struct Adb {
    runner: CommandRunner,
    options: AdbOptions,
}

impl Adb {
    pub fn new() -> AdbResult<Self> {
        Self::with_options(AdbOptions::default())
    }

    pub fn with_options(options: AdbOptions) -> AdbResult<Self> {
        let mut candidates = locator::discover_from_path(locator::BINARY_NAME);
        if candidates.is_empty() {
            return Err(AdbError::BinaryNotAvailable {
                binary: locator::BINARY_NAME.to_string(),
            });
        }
        if candidates.len() > 1 {
            return Err(AdbError::MultipleBinaryMatches {
                binary: locator::BINARY_NAME.to_string(),
                candidates,
            });
        }
        Ok(Self {
            runner: CommandRunner::new(candidates.remove(0)),
            options,
        })
    }

    /// Bypasses `PATH` discovery and uses `binary` directly.
    pub fn with_binary(binary: impl Into<PathBuf>, options: AdbOptions) -> Self {
        Self {
            runner: CommandRunner::new(binary),
            options,
        }
    }

    /// Checks if the adb binary is reachable at all.
    pub fn is_available() -> bool {
        locator::is_available(locator::BINARY_NAME)
    }

    pub fn binary_path(&self) -> &Path {
        self.runner.binary()
    }

    /// Lists the identifiers of connected devices and emulators.
    pub async fn get_devices(&self) -> AdbResult<Vec<String>> {
        let stdout = self.run_listing(&["devices"]).await?;
        Ok(stdout.map(|lines| parse_devices(&lines)).unwrap_or_default())
    }

    /// Lists installed packages; `third_party_only` restricts to non-system
    /// apps (`pm list packages -3`).
    pub async fn get_apps(&self, device: &str, third_party_only: bool) -> AdbResult<Vec<String>> {
        let mut args = vec!["-s", device, "shell", "pm", "list", "packages"];
        if third_party_only {
            args.push("-3");
        }
        let stdout = self.run_listing(&args).await?;
        Ok(stdout
            .map(|lines| strip_package_prefix(&lines))
            .unwrap_or_default())
    }

    /// Lists the packages whose name contains `pattern`.
    pub async fn search_package(&self, device: &str, pattern: &str) -> AdbResult<Vec<String>> {
        let args = ["-s", device, "shell", "pm", "list", "packages", pattern];
        let stdout = self.run_listing(&args).await?;
        Ok(stdout
            .map(|lines| filter_package_lines(&lines))
            .unwrap_or_default())
    }

    /// Paths of a package's installed artifacts on the device.
    ///
    /// `None` means the lookup itself failed; `Some(vec![])` means the lookup
    /// ran and found nothing. This is the one listing that keeps the two
    /// outcomes apart.
    pub async fn get_package_artifacts(
        &self,
        device: &str,
        package: &str,
    ) -> AdbResult<Option<Vec<String>>> {
        let args = ["-s", device, "shell", "pm", "path", package];
        let result = self
            .runner
            .run(&args, self.options.command_timeout)
            .await?;
        if !result.success() {
            return Ok(None);
        }
        Ok(Some(
            result
                .stdout
                .map(|lines| strip_package_prefix(&lines))
                .unwrap_or_default(),
        ))
    }

    /// Installs a single package from a local artifact (`install -r`).
    ///
    /// The local path is checked before anything is spawned, so a doomed
    /// install never touches the device.
    pub async fn install_package(
        &self,
        device: &str,
        package_path: impl AsRef<Path>,
    ) -> AdbResult<bool> {
        let package_path = package_path.as_ref();
        if !package_path.exists() {
            return Err(AdbError::LocalFileMissing {
                path: package_path.to_path_buf(),
            });
        }
        let path = package_path.to_string_lossy();
        let result = self
            .runner
            .run(&["-s", device, "install", "-r", &*path], None)
            .await?;
        Ok(result.success())
    }

    /// Installs a split package from several local artifacts
    /// (`install-multiple -r`). All paths are checked up front; if any is
    /// missing, none of them is installed.
    pub async fn install_split_package<P: AsRef<Path>>(
        &self,
        device: &str,
        package_paths: &[P],
    ) -> AdbResult<bool> {
        for path in package_paths {
            if !path.as_ref().exists() {
                return Err(AdbError::LocalFileMissing {
                    path: path.as_ref().to_path_buf(),
                });
            }
        }
        let mut args: Vec<String> = vec![
            "-s".to_string(),
            device.to_string(),
            "install-multiple".to_string(),
            "-r".to_string(),
        ];
        args.extend(
            package_paths
                .iter()
                .map(|p| p.as_ref().to_string_lossy().into_owned()),
        );
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = self.runner.run(&arg_refs, None).await?;
        Ok(result.success())
    }

    pub async fn uninstall_package(&self, device: &str, package: &str) -> AdbResult<bool> {
        let result = self
            .runner
            .run(
                &["-s", device, "uninstall", package],
                self.options.command_timeout,
            )
            .await?;
        Ok(result.success())
    }

    /// Copies a local file onto the device.
    ///
    /// Without `overwrite`, an existence probe runs first and an occupied
    /// destination is refused. The probe and the push are two separate
    /// commands, so a racing writer can still slip in between; the guard is a
    /// convenience, not a lock.
    pub async fn push(
        &self,
        device: &str,
        source: impl AsRef<Path>,
        destination: &str,
        overwrite: bool,
    ) -> AdbResult<()> {
        let source = source.as_ref();
        if !source.exists() {
            return Err(AdbError::LocalFileMissing {
                path: source.to_path_buf(),
            });
        }
        if !overwrite && self.file_exists(device, destination).await? {
            return Err(AdbError::DestinationExists {
                path: destination.to_string(),
            });
        }
        let src = source.to_string_lossy();
        let result = self
            .runner
            .run(&["-s", device, "push", &*src, destination], None)
            .await?;
        if result.success() {
            Ok(())
        } else {
            Err(AdbError::FileTransfer {
                from: src.into_owned(),
                to: destination.to_string(),
            })
        }
    }

    /// Copies a file from the device to a local path.
    pub async fn pull(
        &self,
        device: &str,
        remote_source: &str,
        destination: impl AsRef<Path>,
        overwrite: bool,
    ) -> AdbResult<()> {
        if !self.file_exists(device, remote_source).await? {
            return Err(AdbError::RemoteFileMissing {
                device: device.to_string(),
                path: remote_source.to_string(),
            });
        }
        let destination = destination.as_ref();
        if destination.exists() && !overwrite {
            return Err(AdbError::DestinationExists {
                path: destination.display().to_string(),
            });
        }
        let dest = destination.to_string_lossy();
        let result = self
            .runner
            .run(&["-s", device, "pull", remote_source, &*dest], None)
            .await?;
        if result.success() {
            Ok(())
        } else {
            Err(AdbError::FileTransfer {
                from: remote_source.to_string(),
                to: dest.into_owned(),
            })
        }
    }

    /// Checks whether a path exists on the device.
    ///
    /// The `&&` chain is interpreted by the device's shell, never the host's.
    pub async fn file_exists(&self, device: &str, remote_path: &str) -> AdbResult<bool> {
        let args = [
            "-s",
            device,
            "shell",
            "test",
            "-e",
            remote_path,
            "&&",
            "echo",
            "exists",
        ];
        let result = self
            .runner
            .run(&args, self.options.command_timeout)
            .await?;
        Ok(result
            .stdout
            .map(|lines| lines.iter().any(|line| line.trim() == "exists"))
            .unwrap_or(false))
    }

    /// Probes well-known `su` locations to decide if the device is rooted.
    pub async fn is_rooted(&self, device: &str) -> AdbResult<bool> {
        for su_path in SU_PATHS {
            if self.file_exists(device, su_path).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Pids of processes whose command line matches `pattern`.
    pub async fn pgrep(&self, device: &str, pattern: &str) -> AdbResult<Vec<u32>> {
        let args = ["-s", device, "shell", "pgrep", "-f", pattern];
        let result = self
            .runner
            .run(&args, self.options.command_timeout)
            .await?;
        // pgrep exits non-zero when nothing matches; that is an empty result,
        // not a failure.
        if !result.success() {
            return Ok(Vec::new());
        }
        Ok(result.stdout.map(|lines| parse_pids(&lines)).unwrap_or_default())
    }

    /// Pid of the package's running process, or 0 when it is not running.
    pub async fn pidof(&self, device: &str, package: &str) -> AdbResult<u32> {
        let args = ["-s", device, "shell", "pidof", "-s", package];
        let result = self
            .runner
            .run(&args, self.options.command_timeout)
            .await?;
        if !result.success() {
            return Ok(0);
        }
        Ok(result
            .stdout
            .and_then(|lines| lines.first().and_then(|line| line.trim().parse().ok()))
            .unwrap_or(0))
    }

    /// Launches a package's main activity and reports its pid (0 when it did
    /// not come up).
    pub async fn spawn(&self, device: &str, package: &str) -> AdbResult<u32> {
        let args = ["-s", device, "shell", "monkey", "-p", package, "1"];
        let result = self
            .runner
            .run(&args, self.options.command_timeout)
            .await?;
        if !result.success() {
            return Ok(0);
        }
        self.pidof(device, package).await
    }

    /// Kills a process on the device; `force` sends SIGKILL instead of
    /// SIGTERM.
    pub async fn kill(&self, device: &str, pid: u32, force: bool) -> AdbResult<bool> {
        let pid = pid.to_string();
        let mut args = vec!["-s", device, "shell", "kill"];
        if force {
            args.push("-9");
        }
        args.push(&pid);
        let result = self
            .runner
            .run(&args, self.options.command_timeout)
            .await?;
        Ok(result.success())
    }

    /// Shared path for list-returning operations. A failed command yields
    /// `None` (callers map that to an empty sequence) unless strict listings
    /// were requested, in which case the failure surfaces as an error.
    async fn run_listing(&self, args: &[&str]) -> AdbResult<Option<Vec<String>>> {
        let result = self
            .runner
            .run(args, self.options.command_timeout)
            .await?;
        if result.success() {
            return Ok(result.stdout);
        }
        if self.options.strict_listings {
            return Err(self.listing_failure(args, result));
        }
        Ok(None)
    }

    fn listing_failure(&self, args: &[&str], result: CommandResult) -> AdbError {
        let command = args.join(" ");
        if result.timed_out {
            AdbError::CommandTimedOut {
                command,
                duration: self.options.command_timeout.unwrap_or_default(),
            }
        } else {
            AdbError::CommandFailed {
                command,
                exit_code: result.exit_code,
                stderr: result.stderr,
            }
        }
    }
}

/// Keeps the first tab-delimited field of every device line, dropping the
/// header and blank lines.
pub fn parse_devices(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.split('\t').next())
        .map(str::to_owned)
        .collect()
}

/// Strips the fixed `package:` prefix from every non-blank line.
fn strip_package_prefix(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.strip_prefix(PACKAGE_PREFIX)
                .unwrap_or(line)
                .to_string()
        })
        .collect()
}

/// Keeps only `package:`-prefixed lines, stripped and trimmed.
fn filter_package_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| line.strip_prefix(PACKAGE_PREFIX))
        .map(|name| name.trim().to_string())
        .collect()
}

fn parse_pids(lines: &[String]) -> Vec<u32> {
    lines
        .iter()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}
