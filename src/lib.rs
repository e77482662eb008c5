//! A thin session layer over the platform `adb` binary.
//!
//! [`Adb`] resolves the binary from `PATH` once at construction (refusing
//! ambiguous installations), then exposes device listing, package management
//! and file transfer as async operations. Each one spawns a single child
//! process, waits for it, and interprets the captured output; the normalized
//! [`CommandResult`] is the only contract between the runner and the
//! higher-level calls.

pub mod adb;
pub mod cache;

pub use adb::{Adb, AdbError, AdbOptions, AdbResult, CommandResult, CommandRunner};
pub use cache::{CacheError, FileCache};
