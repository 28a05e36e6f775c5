//! Core type definitions for memprobe

pub mod address;
pub mod buffer;
pub mod error;
pub mod layout;

pub use address::Address;
pub use buffer::{ByteBuffer, ByteOrder};
pub use error::{ProbeError, ProbeResult};
pub use layout::{pointee_of, MemberInfo, ResolvedExpr, TypeDescriptor};
