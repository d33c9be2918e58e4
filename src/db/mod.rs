//! Database module: per-request DuckDB sessions and sibling attachment.
//!
//! Layout:
//! - `discovery.rs`: ordered filesystem discovery of attachable databases
//! - `session.rs`: session provider, one read-only session per request
//! - `value.rs`: engine value to JSON conversion

pub mod discovery;
pub mod session;
pub mod value;

pub use discovery::{AttachKind, AttachTarget};
pub use session::{QueryOutput, Session, SessionProvider};
