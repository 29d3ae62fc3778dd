//! Master registration subsystem.
//!
//! # Data Flow
//! ```text
//! Registration request
//!     → address.rs (shape check: IPv4[:port] or localhost[:port])
//!     → master.rs (atomic replace of the single slot)
//!
//! Proxy request
//!     → master.rs resolve("master") → concrete address
//!     → any other target passes through unchanged
//! ```
//!
//! # Design Decisions
//! - Exactly one slot, last write wins
//! - Readers load an `Arc` snapshot and never wait on a registration
//! - Lives only in memory; a restart clears it

pub mod address;
pub mod master;

pub use address::is_valid_address;
pub use master::{MasterRegistry, MASTER_ALIAS};
