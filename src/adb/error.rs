use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error(
        "'{binary}' was not found in PATH. Install Android Platform Tools (https://developer.android.com/tools/adb) or add '{binary}' to PATH."
    )]
    BinaryNotAvailable { binary: String },

    #[error(
        "found more than one '{binary}' candidate in PATH ({candidates:?}). Keep exactly one to avoid invoking the wrong installation."
    )]
    MultipleBinaryMatches {
        binary: String,
        candidates: Vec<PathBuf>,
    },

    #[error("failed to spawn {binary:?}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("local file {path:?} does not exist")]
    LocalFileMissing { path: PathBuf },

    #[error("remote file '{path}' does not exist on device {device}")]
    RemoteFileMissing { device: String, path: String },

    #[error("destination '{path}' already exists; pass overwrite to replace it")]
    DestinationExists { path: String },

    #[error("unable to transfer file from {from} to {to}")]
    FileTransfer { from: String, to: String },

    #[error("command '{command}' failed with exit code {exit_code}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: Option<Vec<String>>,
    },

    #[error("command '{command}' timed out after {duration:?}")]
    CommandTimedOut { command: String, duration: Duration },
}
