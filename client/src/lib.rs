mod types;
pub mod error;

// transport
pub mod transport;

// collaborators
pub mod file_cache;
pub mod file_sync;
pub mod playback;

// session
pub mod session;
pub mod supervisor;

// setup
pub mod config;
mod builder;

pub use builder::{BuildError, ClientBuilder, DesktopClient};
pub use types::{RunOutcome, RunStats, SessionState, Step};

#[cfg(test)]
mod testing;
