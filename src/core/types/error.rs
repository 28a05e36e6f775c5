//! Error types shared by every probe operation

use super::address::Address;
use thiserror::Error;

/// Main error type for introspection operations
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to read {count} bytes at {address}: {reason}")]
    ReadFault {
        address: Address,
        count: usize,
        reason: String,
    },

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("type {type_name} has no member {member}")]
    UnknownMember { type_name: String, member: String },

    #[error("cannot evaluate expression `{expr}`: {reason}")]
    EvalError { expr: String, reason: String },

    #[error("no data to decode")]
    NoData,

    #[error("null reference: {0}")]
    NullReference(String),

    #[error("search budget exhausted after {visited} nodes (limit {budget})")]
    BudgetExceeded { visited: usize, budget: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("member offset {offset:#x} underflows address {address}")]
    AddressUnderflow { address: Address, offset: u64 },

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

impl ProbeError {
    /// Creates a read fault for an address range
    pub fn read_fault(address: Address, count: usize, reason: impl Into<String>) -> Self {
        ProbeError::ReadFault {
            address,
            count,
            reason: reason.into(),
        }
    }

    /// Creates an unknown-member error
    pub fn unknown_member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        ProbeError::UnknownMember {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    /// Creates an evaluation error
    pub fn eval(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        ProbeError::EvalError {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    /// True for conditions that report information rather than failure
    /// (an unset scattered string is valid domain state).
    pub fn is_informational(&self) -> bool {
        matches!(self, ProbeError::NullReference(_))
    }
}
