//! Memory address wrapper type with hex parsing and checked arithmetic

use super::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An address in the inspected process's memory space.
///
/// The toolkit never dereferences these itself; every access goes through a
/// `MemoryReader` collaborator, so an `Address` is only an opaque handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub u64);

impl Address {
    /// Creates a new address from a raw value
    pub const fn new(value: u64) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns the raw value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Adds an unsigned byte offset (member access)
    pub const fn add(&self, offset: u64) -> Self {
        Address(self.0.wrapping_add(offset))
    }

    /// Subtracts a member offset to recover an enclosing structure address.
    ///
    /// Underflow means the claimed offset cannot belong to this address and
    /// is surfaced as an error rather than wrapping around the address space.
    pub fn checked_sub(&self, offset: u64) -> ProbeResult<Self> {
        self.0
            .checked_sub(offset)
            .map(Address)
            .ok_or(ProbeError::AddressUnderflow {
                address: *self,
                offset,
            })
    }
}

impl FromStr for Address {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            // Bare hex like DEADBEEF
            u64::from_str_radix(s, 16)
        } else {
            s.parse::<u64>().or_else(|_| u64::from_str_radix(s, 16))
        };

        value
            .map(Address::new)
            .map_err(|_| ProbeError::InvalidArgument(format!("invalid address: {s}")))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value as u64)
    }
}
