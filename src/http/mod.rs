//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! legacy client request (any path, GET/POST/PUT/DELETE)
//!     → server.rs (Axum setup, request ID, body limit)
//!     → request.rs (ProxyRequest: method, path, headers, query, body)
//!     → query.rs (date normalization)
//!     → [upstream forwarder]
//!     → response.rs (translate JSON or pass through)
//!     → Send to client
//! ```

pub mod error;
pub mod query;
pub mod request;
pub mod response;
pub mod server;

pub use error::ProxyError;
pub use query::QueryParams;
pub use request::{ProxyRequest, UuidRequestId, X_REQUEST_ID};
pub use response::{dispatch, Dispatch, PassthroughReason, Translation};
pub use server::{AppState, HttpServer};
