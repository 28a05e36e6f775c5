//! memprobe — debugger-attached introspection of intrusive data structures
//!
//! Decodes raw byte ranges into typed, endianness-aware representations and
//! walks intrusive lists and trees embedded in arbitrary host structures,
//! recovering each enclosing object from a pointer to one of its link
//! fields. The hosting debugger supplies type layouts, expression
//! evaluation, and raw memory through the traits in [`provider`].

pub mod commands;
pub mod config;
pub mod core;
pub mod decode;
pub mod provider;
pub mod render;
pub mod resolve;
pub mod scatter;
pub mod snapshot;
pub mod walk;

// Re-export the types nearly every consumer touches
pub use crate::core::types::{
    Address, ByteBuffer, ByteOrder, MemberInfo, ProbeError, ProbeResult, ResolvedExpr,
    TypeDescriptor,
};
pub use provider::{MemoryReader, TargetLayout, TypeLayoutProvider, WatchController};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_reexport() {
        let addr = Address::new(0x1000);
        assert_eq!(addr.as_u64(), 0x1000);
        assert!(Address::null().is_null());
    }

    #[test]
    fn test_error_reexport() {
        let err = ProbeError::UnknownType("foo".into());
        assert_eq!(err.to_string(), "unknown type: foo");
    }

    #[test]
    fn test_version_constant() {
        assert_eq!(crate::core::VERSION, env!("CARGO_PKG_VERSION"));
    }
}
