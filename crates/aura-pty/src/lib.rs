//! PTY session management for Aura
//!
//! Owns the child shell process and its pseudo-terminal: an output pump
//! feeds raw bytes to the VT pipeline through a bounded channel, an input
//! pump serializes writes back to the child, and [`PtySession`] ties the
//! lifecycle together.

pub mod channel;
pub mod config;
pub mod pty;
pub mod session;

pub use channel::OutputChannel;
pub use config::SessionConfig;
pub use session::PtySession;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PtyError {
    #[error("failed to allocate PTY: {0}")]
    AllocationFailed(String),

    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),

    #[error("PTY I/O error: {0}")]
    Io(#[from] std::io::Error),
}
