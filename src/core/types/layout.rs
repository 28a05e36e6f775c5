//! Type layout descriptors resolved by the debugger collaborator

use super::address::Address;
use super::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

/// One named member inside a structure layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub name: String,
    pub offset: u64,
    /// Type name as the collaborator reports it; pointers carry a trailing `*`.
    #[serde(rename = "type")]
    pub type_name: String,
    pub size: usize,
}

impl MemberInfo {
    pub fn is_pointer(&self) -> bool {
        self.type_name.trim_end().ends_with('*')
    }
}

/// Resolved layout of a structure type.
///
/// Immutable once resolved; walkers cache the offsets they pull out of it
/// for the duration of a single command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub size: usize,
    #[serde(default)]
    pub members: Vec<MemberInfo>,
}

impl TypeDescriptor {
    pub fn member(&self, name: &str) -> ProbeResult<&MemberInfo> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ProbeError::unknown_member(&self.name, name))
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }
}

/// Strips one level of pointer from a type name (`"foo *"` -> `"foo"`).
pub fn pointee_of(type_name: &str) -> Option<&str> {
    type_name.trim_end().strip_suffix('*').map(str::trim)
}

/// Result of evaluating an address expression through the collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExpr {
    /// Declared type of the expression; pointers carry a trailing `*`.
    pub type_name: String,
    /// Address of the lvalue itself (null for rvalues such as literals).
    pub address: Address,
    /// Raw value; for pointers this is the target address.
    pub value: u64,
}

impl ResolvedExpr {
    pub fn is_pointer(&self) -> bool {
        self.type_name.trim_end().ends_with('*')
    }

    pub fn pointee(&self) -> Option<&str> {
        pointee_of(&self.type_name)
    }

    /// Address of the object the expression designates: the pointed-to
    /// target for pointers, otherwise the lvalue's own address.
    pub fn object_address(&self) -> Address {
        if self.is_pointer() {
            Address::new(self.value)
        } else {
            self.address
        }
    }
}
