//! Container-of recovery properties

use memprobe::core::types::{Address, MemberInfo, ProbeError, ProbeResult, ResolvedExpr, TypeDescriptor};
use memprobe::provider::TypeLayoutProvider;
use memprobe::resolve::ContainerResolver;
use proptest::prelude::*;

/// Provider with a single type whose one member sits at a configurable
/// offset.
struct OneMemberProvider {
    offset: u64,
}

impl TypeLayoutProvider for OneMemberProvider {
    fn lookup_type(&self, name: &str) -> ProbeResult<TypeDescriptor> {
        if name != "holder" {
            return Err(ProbeError::UnknownType(name.to_string()));
        }
        Ok(TypeDescriptor {
            name: "holder".into(),
            size: (self.offset + 16) as usize,
            members: vec![MemberInfo {
                name: "link".into(),
                offset: self.offset,
                type_name: "list_head".into(),
                size: 16,
            }],
        })
    }

    fn resolve_expression(&self, text: &str) -> ProbeResult<ResolvedExpr> {
        Err(ProbeError::eval(text, "not supported"))
    }
}

proptest! {
    #[test]
    fn prop_container_round_trip(
        base in 0x1000u64..0x0000_7fff_ffff_0000,
        offset in 0u64..65536,
    ) {
        let provider = OneMemberProvider { offset };
        let mut resolver = ContainerResolver::new(&provider);

        let member_address = Address::new(base).add(offset);
        let recovered = resolver
            .resolve_container(member_address, "holder", "link")
            .unwrap();
        prop_assert_eq!(recovered, Address::new(base));
    }

    #[test]
    fn prop_offset_is_stable_across_calls(offset in 0u64..65536) {
        let provider = OneMemberProvider { offset };
        let mut resolver = ContainerResolver::new(&provider);

        let first = resolver.offset_of("holder", "link").unwrap();
        let second = resolver.offset_of("holder", "link").unwrap();
        prop_assert_eq!(first, offset);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_underflow_is_rejected() {
    let provider = OneMemberProvider { offset: 64 };
    let mut resolver = ContainerResolver::new(&provider);

    let err = resolver
        .resolve_container(Address::new(32), "holder", "link")
        .unwrap_err();
    assert!(matches!(err, ProbeError::AddressUnderflow { .. }));
}

#[test]
fn test_unknown_names_are_fatal() {
    let provider = OneMemberProvider { offset: 8 };
    let mut resolver = ContainerResolver::new(&provider);

    assert!(matches!(
        resolver.resolve_container(Address::new(0x100), "holder", "nope"),
        Err(ProbeError::UnknownMember { .. })
    ));
    assert!(matches!(
        resolver.resolve_container(Address::new(0x100), "other", "link"),
        Err(ProbeError::UnknownType(_))
    ));
}
