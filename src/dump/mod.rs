//! Debug dumps of translated responses.
//!
//! # Data Flow
//! ```text
//! successful translation (debug enabled)
//!     → naming.rs (API version, service and date from the inbound request)
//!     → writer.rs (raw body, readable v3, converted v2 files)
//! ```
//!
//! # Design Decisions
//! - Dumps never influence the response; write errors are only logged
//! - Requests whose path is not a known schedule API are not dumped

pub mod naming;
pub mod writer;

pub use naming::{ApiVersion, DumpTarget};
pub use writer::{pretty, DumpError, DumpWriter};
