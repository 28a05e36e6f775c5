//! Core module containing the fundamental types for memprobe
//!
//! Everything here is created fresh per command invocation from live (or
//! snapshotted) process memory and discarded when the invocation ends.

pub mod types;

pub use types::{
    Address, ByteBuffer, ByteOrder, MemberInfo, ProbeError, ProbeResult, ResolvedExpr,
    TypeDescriptor,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
