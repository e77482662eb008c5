//! Binary discovery over the process search path.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Name of the platform device-bridge binary this crate wraps.
pub const BINARY_NAME: &str = if cfg!(windows) { "adb.exe" } else { "adb" };

/// Searches for a binary in the `PATH` environment variable.
///
/// Returns every full path where an executable file of that name exists, in
/// `PATH` order. Duplicates across directories are all included; resolving
/// the ambiguity is the caller's policy, not the locator's.
pub fn discover_from_path(binary_name: &str) -> Vec<PathBuf> {
    match env::var_os("PATH") {
        Some(search_path) => discover_in(&search_path, binary_name),
        None => Vec::new(),
    }
}

/// Same scan over an explicit search-path string (colon or semicolon
/// delimited depending on platform).
pub fn discover_in(search_path: &OsStr, binary_name: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for dir in env::split_paths(search_path) {
        let candidate = dir.join(binary_name);
        if is_executable_file(&candidate) {
            found.push(candidate);
        }
    }
    found
}

/// Checks if the binary is reachable at all.
pub fn is_available(binary_name: &str) -> bool {
    !discover_from_path(binary_name).is_empty()
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
