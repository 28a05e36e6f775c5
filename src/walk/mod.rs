//! Bounded traversal of intrusive structures
//!
//! One parameterized engine covers both traversal kinds: a `WalkOptions`
//! bag carries the bounds, direction, link layout, and projection list, and
//! the list/tree walkers share the container mapping and rendering phases.

pub mod list;
pub mod tree;

pub use list::ListWalker;
pub use tree::TreeWalker;

use crate::config::defaults;
use crate::core::types::{Address, ProbeResult};
use crate::decode;
use crate::provider::{MemoryReader, TargetLayout, TypeLayoutProvider};
use crate::render::LineSink;
use crate::resolve::ContainerResolver;
use crate::scatter::{self, ScatterFormat};

/// Widest whole-container dump emitted per node; larger containers are
/// clamped with a note so one node cannot flood the console.
pub const CONTAINER_DUMP_MAX: usize = 32;

/// Container mapping for a traversal: the enclosing type, the member the
/// link node is embedded at, and the fields to project from each container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub type_name: String,
    pub member: String,
    pub fields: Vec<String>,
}

/// Bounds and presentation options for one traversal invocation.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Follow `prev` (list) / print last-visited-first (tree). The default:
    /// most-recently-added entries surface first.
    pub reverse: bool,
    /// Node budget for discovery; the defense against corrupt or cyclic
    /// data that never returns to the head.
    pub max_search: usize,
    /// Output budget, independent of `max_search`.
    pub max_print: usize,
    /// Link node type holding the traversal fields.
    pub link_type: String,
    /// Container mapping; absent means a raw address-only traversal.
    pub container: Option<ContainerSpec>,
    /// Type name rendered through the scattered-string reader when it shows
    /// up in a field projection.
    pub scatter_type: String,
    /// Region-chain budget for scattered-string fields.
    pub max_regions: usize,
}

impl WalkOptions {
    pub fn new(link_type: impl Into<String>) -> Self {
        WalkOptions {
            reverse: true,
            max_search: defaults::MAX_SEARCH,
            max_print: defaults::MAX_PRINT,
            link_type: link_type.into(),
            container: None,
            scatter_type: defaults::default_scatter_type(),
            max_regions: defaults::MAX_REGIONS,
        }
    }
}

/// Outcome of one traversal invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    /// Nodes discovered (bounded by `max_search`).
    pub found: usize,
    /// Nodes actually rendered (bounded by `max_print`).
    pub printed: usize,
    /// Discovery stopped on the search budget rather than completing.
    pub budget_hit: bool,
}

/// Display position for a node at `index` in traversal order: forward
/// positions count up from 1, reverse positions count down from the total.
pub(crate) fn display_position(index: usize, total: usize, reverse: bool) -> usize {
    if reverse {
        total - index
    } else {
        index + 1
    }
}

/// Emits the trailing `Total nodes found` / truncation notes shared by both
/// walkers.
pub(crate) fn emit_totals(
    sink: &mut dyn LineSink,
    found: usize,
    printed: usize,
    reverse: bool,
    budget_hit: bool,
    max_search: usize,
) {
    if budget_hit {
        sink.line(&format!(
            "Warning: search budget of {max_search} nodes exhausted before reaching the end"
        ));
    }
    sink.line(&format!("Total nodes found: {found}"));
    if printed < found {
        if reverse {
            sink.line(&format!("{printed} nodes printed (in reverse order)"));
        } else {
            sink.line(&format!("{printed} nodes printed"));
        }
    }
}

/// Renders one mapped container: either the whole-container byte dump or
/// the requested field projections. Errors are fatal to the invocation; the
/// caller stops traversing (already-emitted output stands).
pub(crate) fn emit_container<P, M>(
    resolver: &mut ContainerResolver<'_, P>,
    reader: &M,
    target: &TargetLayout,
    opts: &WalkOptions,
    spec: &ContainerSpec,
    container: Address,
    sink: &mut dyn LineSink,
) -> ProbeResult<()>
where
    P: TypeLayoutProvider + ?Sized,
    M: MemoryReader + ?Sized,
{
    if spec.fields.is_empty() {
        let descriptor = resolver.lookup_type(&spec.type_name)?;
        let count = descriptor.size.min(CONTAINER_DUMP_MAX);
        let bytes = reader.read_bytes(container, count)?;
        let decoded = decode::decode(&bytes)?;
        for line in decode::dump_lines(&decoded) {
            sink.line(&format!("  {line}"));
        }
        if descriptor.size > count {
            sink.line(&format!(
                "  (first {count} of {} bytes shown)",
                descriptor.size
            ));
        }
        return Ok(());
    }

    for field in &spec.fields {
        let member = resolver.member_info(&spec.type_name, field)?;

        // Scattered-string fields render through the chain reader, whether
        // embedded directly or referenced through a pointer.
        let scatter_direct = member.type_name == opts.scatter_type;
        let scatter_ptr = member.is_pointer()
            && crate::core::types::pointee_of(&member.type_name) == Some(opts.scatter_type.as_str());
        if scatter_direct || scatter_ptr {
            let descriptor = if scatter_ptr {
                crate::provider::read_pointer(
                    reader,
                    container.add(member.offset),
                    target.pointer_size,
                    target.byte_order,
                )?
            } else {
                container.add(member.offset)
            };
            if descriptor.is_null() {
                sink.line(&format!("  {field}: <null>"));
                continue;
            }
            sink.line(&format!("  {field}:"));
            scatter::emit(
                resolver,
                reader,
                target,
                descriptor,
                &opts.scatter_type,
                ScatterFormat::Str,
                opts.max_regions,
                "    ",
                sink,
            )?;
            continue;
        }

        let count = member.size.min(CONTAINER_DUMP_MAX).max(1);
        let bytes = reader.read_bytes(container.add(member.offset), count)?;
        let decoded = decode::decode(&bytes)?;
        match (decoded.be_value, decoded.le_value) {
            (Some(be), Some(le)) => sink.line(&format!(
                "  {field}: {}  (be {be}, le {le})",
                decoded.hex_string()
            )),
            _ => sink.line(&format!("  {field}: {}", decoded.hex_string())),
        }
    }

    Ok(())
}
