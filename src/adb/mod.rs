// Session layer over the platform `adb` binary.
// The binary path is resolved from PATH exactly once at construction; every
// operation builds an argument vector and funnels through the runner.

pub mod error;
pub mod locator;
pub mod runner;
pub mod session;
pub mod types;


// Re-export the main types for easy access
pub use error::{AdbError, AdbResult};
pub use runner::CommandRunner;
pub use session::Adb;
pub use types::{AdbOptions, CommandResult};
