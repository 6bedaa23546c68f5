//! Translating reverse proxy for the broadcast-schedule API.
//!
//! Legacy clients built against the v2 schema talk to this proxy as if it
//! were the v2 service. Requests are forwarded to the v3 service, and JSON
//! responses are rewritten from the v3 publication layout into the v2
//! program-list layout. Anything that cannot be translated is passed through.
//!
//! # Architecture Overview
//!
//! ```text
//!   legacy client ──▶ http::server ──▶ http::query ──▶ upstream::forwarder ──▶ v3 service
//!                      (request id,     (date=YYYYMMDD      (reqwest, single
//!                       body limit)      → YYYY-MM-DD)       attempt, timeout)
//!                                                                 │
//!   legacy client ◀── http::response ◀── translate ◀──────────────┘
//!                     (v2 JSON or         (v3 → v2, typed errors)
//!                      passthrough)
//!
//!   cross-cutting: config · observability · lifecycle · dump (debug only)
//! ```

pub mod config;
pub mod dump;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod translate;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
