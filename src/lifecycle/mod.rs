//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscriber's recv() resolves → server stops accepting
//!     → in-flight requests finish → run() returns
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → main triggers graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
