//! Offline snapshot collaborator
//!
//! A `SnapshotImage` implements all three collaborator traits over a frozen
//! memory image: base-addressed byte segments, a type catalog, and a symbol
//! table. Images load from a raw dump plus a TOML layout catalog, or are
//! built programmatically (the tests' process double).

mod catalog;
mod eval;

pub use catalog::LayoutCatalog;

use crate::core::types::{
    Address, ByteBuffer, ProbeError, ProbeResult, ResolvedExpr, TypeDescriptor,
};
use crate::provider::{MemoryReader, TargetLayout, TypeLayoutProvider, WatchController};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

/// One named location in the image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolBinding {
    pub name: String,
    pub address: Address,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A frozen image of (part of) a process address space.
pub struct SnapshotImage {
    segments: BTreeMap<u64, Vec<u8>>,
    types: HashMap<String, TypeDescriptor>,
    symbols: HashMap<String, SymbolBinding>,
    target: TargetLayout,
    watches: std::cell::RefCell<Vec<Address>>,
}

impl SnapshotImage {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Loads an image from a layout catalog and a raw dump file mapped at
    /// the catalog's declared base address.
    pub fn load(layout_path: &Path, dump_path: &Path) -> ProbeResult<Self> {
        let catalog = LayoutCatalog::load(layout_path)?;
        let dump = std::fs::read(dump_path)?;
        info!(
            base = catalog.image.base,
            bytes = dump.len(),
            types = catalog.types.len(),
            symbols = catalog.symbols.len(),
            "snapshot image loaded"
        );

        let mut builder = SnapshotBuilder::default().with_segment(catalog.image.base, dump);
        builder.target = catalog.target_layout()?;
        for ty in catalog.types {
            builder = builder.with_type(ty);
        }
        for symbol in catalog.symbols {
            builder.symbols.insert(symbol.name.clone(), symbol);
        }
        Ok(builder.build())
    }

    pub fn target(&self) -> TargetLayout {
        self.target
    }

    /// Watches recorded through `WatchController`.
    pub fn watches(&self) -> Vec<Address> {
        self.watches.borrow().clone()
    }

    /// Decomposes the image back into a builder (tests extend a base image).
    pub fn into_builder(self) -> SnapshotBuilder {
        SnapshotBuilder {
            segments: self.segments,
            types: self.types,
            symbols: self.symbols,
            target: self.target,
        }
    }

    pub(crate) fn type_catalog(&self) -> &HashMap<String, TypeDescriptor> {
        &self.types
    }

    pub(crate) fn symbol(&self, name: &str) -> Option<&SymbolBinding> {
        self.symbols.get(name)
    }

    /// The segment containing `address`, as (segment base, bytes).
    fn segment_containing(&self, address: u64) -> Option<(u64, &[u8])> {
        let (&base, bytes) = self.segments.range(..=address).next_back()?;
        if address < base + bytes.len() as u64 {
            Some((base, bytes))
        } else {
            None
        }
    }
}

impl MemoryReader for SnapshotImage {
    fn read_bytes(&self, address: Address, count: usize) -> ProbeResult<ByteBuffer> {
        if address.is_null() {
            return Err(ProbeError::read_fault(address, count, "null address"));
        }
        let (base, bytes) = self
            .segment_containing(address.as_u64())
            .ok_or_else(|| ProbeError::read_fault(address, count, "address not mapped"))?;
        let offset = (address.as_u64() - base) as usize;
        if offset + count > bytes.len() {
            return Err(ProbeError::read_fault(
                address,
                count,
                "read extends past end of mapped segment",
            ));
        }
        Ok(ByteBuffer::from(&bytes[offset..offset + count]))
    }
}

impl TypeLayoutProvider for SnapshotImage {
    fn lookup_type(&self, name: &str) -> ProbeResult<TypeDescriptor> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| ProbeError::UnknownType(name.to_string()))
    }

    fn resolve_expression(&self, text: &str) -> ProbeResult<ResolvedExpr> {
        eval::evaluate(self, text)
    }
}

impl WatchController for SnapshotImage {
    fn set_watch(&mut self, address: Address) -> ProbeResult<()> {
        self.watches.get_mut().push(address);
        Ok(())
    }
}

/// Watch recorder that coexists with shared borrows of the image.
///
/// The image serves as layout provider and memory reader at the same time
/// it records watches, so the recorder goes through the interior watch
/// list rather than `&mut SnapshotImage`.
pub struct SnapshotWatches<'a>(&'a SnapshotImage);

impl SnapshotImage {
    pub fn watch_controller(&self) -> SnapshotWatches<'_> {
        SnapshotWatches(self)
    }
}

impl WatchController for SnapshotWatches<'_> {
    fn set_watch(&mut self, address: Address) -> ProbeResult<()> {
        self.0.watches.borrow_mut().push(address);
        Ok(())
    }
}

/// Builder for programmatic images.
#[derive(Default)]
pub struct SnapshotBuilder {
    segments: BTreeMap<u64, Vec<u8>>,
    types: HashMap<String, TypeDescriptor>,
    symbols: HashMap<String, SymbolBinding>,
    target: TargetLayout,
}

impl SnapshotBuilder {
    pub fn with_segment(mut self, base: u64, bytes: Vec<u8>) -> Self {
        self.segments.insert(base, bytes);
        self
    }

    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.types.insert(descriptor.name.clone(), descriptor);
        self
    }

    pub fn with_symbol(
        mut self,
        name: impl Into<String>,
        address: u64,
        type_name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.symbols.insert(
            name.clone(),
            SymbolBinding {
                name,
                address: Address::new(address),
                type_name: type_name.into(),
            },
        );
        self
    }

    pub fn with_target(mut self, target: TargetLayout) -> Self {
        self.target = target;
        self
    }

    /// Registers the canonical circular-list link layout
    /// (`list_head { next, prev }`, 16 bytes).
    pub fn with_list_head_type(self) -> Self {
        self.with_type(TypeDescriptor {
            name: "list_head".into(),
            size: 16,
            members: vec![
                member("next", 0, "list_head *", 8),
                member("prev", 8, "list_head *", 8),
            ],
        })
    }

    /// Registers the canonical tree link layout
    /// (`avl_node { left, right }`, 16 bytes).
    pub fn with_tree_link_type(self) -> Self {
        self.with_type(TypeDescriptor {
            name: "avl_node".into(),
            size: 16,
            members: vec![
                member("left", 0, "avl_node *", 8),
                member("right", 8, "avl_node *", 8),
            ],
        })
    }

    /// Registers a container type from `(name, offset, type, size)` tuples.
    pub fn with_container_type(
        self,
        name: &str,
        size: usize,
        members: &[(&str, u64, &str, usize)],
    ) -> Self {
        self.with_type(TypeDescriptor {
            name: name.into(),
            size,
            members: members
                .iter()
                .map(|&(m, offset, ty, sz)| member(m, offset, ty, sz))
                .collect(),
        })
    }

    pub fn build(self) -> SnapshotImage {
        SnapshotImage {
            segments: self.segments,
            types: self.types,
            symbols: self.symbols,
            target: self.target,
            watches: std::cell::RefCell::new(Vec::new()),
        }
    }
}

fn member(name: &str, offset: u64, type_name: &str, size: usize) -> crate::core::types::MemberInfo {
    crate::core::types::MemberInfo {
        name: name.into(),
        offset,
        type_name: type_name.into(),
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_reads() {
        let image = SnapshotImage::builder()
            .with_segment(0x1000, vec![1, 2, 3, 4])
            .build();

        assert_eq!(
            image.read_bytes(Address::new(0x1001), 2).unwrap().as_slice(),
            &[2, 3]
        );
        assert!(image.read_bytes(Address::new(0x1003), 2).is_err());
        assert!(image.read_bytes(Address::new(0x2000), 1).is_err());
        assert!(image.read_bytes(Address::null(), 1).is_err());
    }

    #[test]
    fn test_type_lookup() {
        let image = SnapshotImage::builder().with_list_head_type().build();
        let ty = image.lookup_type("list_head").unwrap();
        assert_eq!(ty.size, 16);
        assert!(matches!(
            image.lookup_type("missing"),
            Err(ProbeError::UnknownType(_))
        ));
    }

    #[test]
    fn test_watch_recording() {
        let mut image = SnapshotImage::builder().build();
        image.set_watch(Address::new(0x1234)).unwrap();
        assert_eq!(image.watches(), vec![Address::new(0x1234)]);
    }
}
