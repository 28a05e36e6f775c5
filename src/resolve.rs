//! Enclosing-structure recovery from embedded member addresses
//!
//! The container-of operation: subtract a member's offset from the member's
//! address and reinterpret the result as the enclosing type. All offset
//! arithmetic lives here; nothing else in the crate subtracts from an
//! address.

use crate::core::types::{Address, MemberInfo, ProbeResult, TypeDescriptor};
use crate::provider::TypeLayoutProvider;
use std::collections::HashMap;
use tracing::debug;

/// Resolves member offsets and container addresses through the layout
/// collaborator.
///
/// Offsets are cached per `(type, member)` pair. The cache lives exactly as
/// long as the resolver, and a resolver is constructed per command
/// invocation, so stale offsets can never leak across container types or
/// commands.
pub struct ContainerResolver<'a, P: TypeLayoutProvider + ?Sized> {
    provider: &'a P,
    offsets: HashMap<(String, String), u64>,
}

impl<'a, P: TypeLayoutProvider + ?Sized> ContainerResolver<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        ContainerResolver {
            provider,
            offsets: HashMap::new(),
        }
    }

    /// Byte offset of `member` inside `type_name`.
    pub fn offset_of(&mut self, type_name: &str, member: &str) -> ProbeResult<u64> {
        let key = (type_name.to_string(), member.to_string());
        if let Some(&offset) = self.offsets.get(&key) {
            return Ok(offset);
        }

        let descriptor = self.provider.lookup_type(type_name)?;
        let offset = descriptor.member(member)?.offset;
        debug!(type_name, member, offset, "resolved member offset");
        self.offsets.insert(key, offset);
        Ok(offset)
    }

    /// Full member info for `member` inside `type_name` (uncached; callers
    /// need this once per projection, the hot path is `offset_of`).
    pub fn member_info(&self, type_name: &str, member: &str) -> ProbeResult<MemberInfo> {
        let descriptor = self.provider.lookup_type(type_name)?;
        Ok(descriptor.member(member)?.clone())
    }

    /// Offset of a dotted member path such as `sa4.sin_port`, walking the
    /// intermediate member types.
    pub fn offset_of_path(&mut self, type_name: &str, path: &str) -> ProbeResult<(u64, MemberInfo)> {
        let mut current_type = type_name.to_string();
        let mut total: u64 = 0;
        let mut info: Option<MemberInfo> = None;

        for part in path.split('.') {
            let member = self.member_info(&current_type, part)?;
            total += member.offset;
            current_type = member.type_name.clone();
            info = Some(member);
        }

        // Split always yields at least one part for a non-empty path
        let info = info.ok_or_else(|| {
            crate::core::types::ProbeError::unknown_member(type_name, path)
        })?;
        Ok((total, info))
    }

    /// Recovers the enclosing structure address from the address of one of
    /// its embedded members.
    pub fn resolve_container(
        &mut self,
        member_address: Address,
        type_name: &str,
        member: &str,
    ) -> ProbeResult<Address> {
        let offset = self.offset_of(type_name, member)?;
        member_address.checked_sub(offset)
    }

    /// Looks a type up without caching, for callers that need the full
    /// descriptor (size, member list).
    pub fn lookup_type(&self, name: &str) -> ProbeResult<TypeDescriptor> {
        self.provider.lookup_type(name)
    }

    #[cfg(test)]
    pub(crate) fn cached_offsets(&self) -> usize {
        self.offsets.len()
    }
}
