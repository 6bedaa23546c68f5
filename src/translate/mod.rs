//! Schema translation subsystem.
//!
//! # Data Flow
//! ```text
//! upstream JSON body (v3)
//!     → serde_json::Value
//!     → translator.rs (envelope checks, per-publication field extraction)
//!     → schema.rs (V3Publication → V2Program)
//!     → V2Envelope { "list": { <service>: [...] } }
//! ```
//!
//! # Design Decisions
//! - Translation is a pure function of (payload, service); it never sees HTTP types
//! - Every failure is a typed `TranslateError`; the dispatcher decides what to do with it
//! - Input order of publications is preserved; nothing is dropped or deduplicated

pub mod schema;
pub mod translator;

pub use schema::{V2Envelope, V2Program, V3Publication};
pub use translator::{translate, translate_bytes, SchemaMismatch, TranslateError};
