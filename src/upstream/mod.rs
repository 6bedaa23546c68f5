//! Upstream (v3 service) communication.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (normalized query)
//!     → headers.rs (drop host, hop-by-hop and framing headers)
//!     → forwarder.rs (reqwest, single attempt, bounded wait)
//!     → UpstreamResponse { status, headers, body }
//! ```

pub mod forwarder;
pub mod headers;

pub use forwarder::{ForwardError, UpstreamForwarder, UpstreamResponse};
