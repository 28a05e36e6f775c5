//! Circular doubly-linked list traversal
//!
//! Three phases: raw discovery (follow one direction's link until the head
//! comes back around or the budget runs out), container mapping, rendering.

use super::{display_position, emit_container, emit_totals, WalkOptions, WalkSummary};
use crate::core::types::{Address, ProbeError, ProbeResult};
use crate::provider::{read_pointer, MemoryReader, TargetLayout, TypeLayoutProvider};
use crate::render::{address_row, LineSink, ADDRESSES_PER_ROW};
use crate::resolve::ContainerResolver;
use tracing::{debug, warn};

pub struct ListWalker<'a, P, M>
where
    P: TypeLayoutProvider + ?Sized,
    M: MemoryReader + ?Sized,
{
    resolver: ContainerResolver<'a, P>,
    reader: &'a M,
    target: TargetLayout,
}

impl<'a, P, M> ListWalker<'a, P, M>
where
    P: TypeLayoutProvider + ?Sized,
    M: MemoryReader + ?Sized,
{
    pub fn new(provider: &'a P, reader: &'a M, target: TargetLayout) -> Self {
        ListWalker {
            resolver: ContainerResolver::new(provider),
            reader,
            target,
        }
    }

    /// Walks the circular list anchored at `head`.
    ///
    /// `head` is the address of the anchor link node itself; it is not an
    /// element and is never reported.
    pub fn walk(
        &mut self,
        head: Address,
        opts: &WalkOptions,
        sink: &mut dyn LineSink,
    ) -> ProbeResult<WalkSummary> {
        let link = self.resolver.lookup_type(&opts.link_type)?;
        let follow = if opts.reverse {
            link.member("prev")?.offset
        } else {
            link.member("next")?.offset
        };

        // Phase 1: raw discovery. A read fault mid-chain abandons discovery
        // with what we have; partial linear output is still useful.
        let mut nodes: Vec<Address> = Vec::new();
        let mut budget_hit = false;
        let mut fault: Option<ProbeError> = None;

        let mut current = read_pointer(
            self.reader,
            head.add(follow),
            self.target.pointer_size,
            self.target.byte_order,
        )?;
        while current != head {
            if nodes.len() >= opts.max_search {
                budget_hit = true;
                break;
            }
            nodes.push(current);
            match read_pointer(
                self.reader,
                current.add(follow),
                self.target.pointer_size,
                self.target.byte_order,
            ) {
                Ok(next) => current = next,
                Err(err) => {
                    fault = Some(err);
                    break;
                }
            }
        }

        let found = nodes.len();
        debug!(%head, found, budget_hit, "list discovery complete");
        if budget_hit {
            warn!(%head, budget = opts.max_search, "list search budget exhausted");
        }
        if let Some(err) = &fault {
            sink.line(&format!("Error: {err}; traversal stopped"));
        }

        if found == 0 && fault.is_none() {
            sink.line("Total nodes found: 0");
            return Ok(WalkSummary {
                found: 0,
                printed: 0,
                budget_hit,
            });
        }

        let printed = found.min(opts.max_print);

        match &opts.container {
            // Raw request: addresses only, five per row, no offset
            // computation at all.
            None => {
                for row in nodes[..printed].chunks(ADDRESSES_PER_ROW) {
                    sink.line(&address_row(row));
                }
            }
            // Phases 2 + 3: map each link to its container and render.
            // The first failure aborts the rest of the invocation; offset
            // corruption would affect every subsequent node identically.
            Some(spec) => {
                for (index, &node) in nodes[..printed].iter().enumerate() {
                    let position = display_position(index, found, opts.reverse);
                    let container = match self.resolver.resolve_container(
                        node,
                        &spec.type_name,
                        &spec.member,
                    ) {
                        Ok(container) => container,
                        Err(err) => {
                            sink.line(&format!("Error: {err}; aborting remaining nodes"));
                            return Ok(WalkSummary {
                                found,
                                printed: index,
                                budget_hit,
                            });
                        }
                    };
                    sink.line(&format!(
                        "[{position}/{found}] link={node} container={container}"
                    ));
                    if let Err(err) = emit_container(
                        &mut self.resolver,
                        self.reader,
                        &self.target,
                        opts,
                        spec,
                        container,
                        sink,
                    ) {
                        sink.line(&format!("Error: {err}; aborting remaining nodes"));
                        return Ok(WalkSummary {
                            found,
                            printed: index + 1,
                            budget_hit,
                        });
                    }
                }
            }
        }

        emit_totals(sink, found, printed, opts.reverse, budget_hit, opts.max_search);
        Ok(WalkSummary {
            found,
            printed,
            budget_hit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotImage;
    use crate::walk::ContainerSpec;

    /// Builds a circular list of `k` link nodes (16 bytes each: next, prev)
    /// anchored at 0x1000, node i at 0x2000 + i * 0x100.
    fn circular_list(k: usize) -> (SnapshotImage, Address) {
        let mut image = SnapshotImage::builder().with_list_head_type();
        let head = 0x1000u64;
        let node = |i: usize| 0x2000u64 + (i as u64) * 0x100;

        let mut addrs: Vec<u64> = vec![head];
        addrs.extend((0..k).map(node));

        for (i, &a) in addrs.iter().enumerate() {
            let next = addrs[(i + 1) % addrs.len()];
            let prev = addrs[(i + addrs.len() - 1) % addrs.len()];
            let mut bytes = next.to_le_bytes().to_vec();
            bytes.extend_from_slice(&prev.to_le_bytes());
            image = image.with_segment(a, bytes);
        }

        (image.build(), Address::new(head))
    }

    fn raw_opts() -> WalkOptions {
        WalkOptions::new("list_head")
    }

    #[test]
    fn test_empty_list() {
        let (image, head) = circular_list(0);
        let mut walker = ListWalker::new(&image, &image, TargetLayout::default());
        let mut sink: Vec<String> = Vec::new();

        let summary = walker.walk(head, &raw_opts(), &mut sink).unwrap();
        assert_eq!(summary.found, 0);
        assert_eq!(sink, vec!["Total nodes found: 0"]);
    }

    #[test]
    fn test_forward_and_reverse_find_all() {
        for k in [1, 2, 7, 50] {
            let (image, head) = circular_list(k);
            let mut walker = ListWalker::new(&image, &image, TargetLayout::default());

            for reverse in [false, true] {
                let mut opts = raw_opts();
                opts.reverse = reverse;
                opts.max_print = 64;
                let mut sink: Vec<String> = Vec::new();
                let summary = walker.walk(head, &opts, &mut sink).unwrap();
                assert_eq!(summary.found, k, "k={k} reverse={reverse}");
                assert!(!summary.budget_hit);
            }
        }
    }

    #[test]
    fn test_reverse_visits_prev_chain() {
        let (image, head) = circular_list(3);
        let mut walker = ListWalker::new(&image, &image, TargetLayout::default());
        let mut opts = raw_opts();
        opts.reverse = true;
        let mut sink: Vec<String> = Vec::new();
        walker.walk(head, &opts, &mut sink).unwrap();

        // prev of head is the last node (0x2200), then 0x2100, then 0x2000
        assert_eq!(sink[0], "0x2200 -> 0x2100 -> 0x2000");
    }

    #[test]
    fn test_budget_stops_at_max_search() {
        let (image, head) = circular_list(10);
        let mut walker = ListWalker::new(&image, &image, TargetLayout::default());
        let mut opts = raw_opts();
        opts.max_search = 4;
        opts.max_print = 64;
        let mut sink: Vec<String> = Vec::new();

        let summary = walker.walk(head, &opts, &mut sink).unwrap();
        assert_eq!(summary.found, 4);
        assert!(summary.budget_hit);
        assert!(sink.iter().any(|l| l.starts_with("Warning: search budget")));
    }

    #[test]
    fn test_raw_rows_of_five() {
        let (image, head) = circular_list(7);
        let mut walker = ListWalker::new(&image, &image, TargetLayout::default());
        let mut opts = raw_opts();
        opts.reverse = false;
        opts.max_print = 64;
        let mut sink: Vec<String> = Vec::new();
        walker.walk(head, &opts, &mut sink).unwrap();

        assert_eq!(sink[0].matches(" -> ").count(), 4); // 5 addresses
        assert_eq!(sink[1].matches(" -> ").count(), 1); // 2 addresses
    }

    /// Circular list of `k` containers, each 48 bytes at 0x2000 + i * 0x100
    /// with `id: u32` at offset 0 and the link node embedded at offset 16.
    fn container_list(k: usize) -> (SnapshotImage, Address) {
        let head = 0x1000u64;
        let container = |i: usize| 0x2000u64 + (i as u64) * 0x100;
        let link = |i: usize| container(i) + 16;

        let mut builder = SnapshotImage::builder()
            .with_list_head_type()
            .with_container_type(
                "session",
                48,
                &[("id", 0, "u32", 4), ("link", 16, "list_head", 16)],
            );

        let link_of = |slot: usize| -> u64 {
            // slot 0 is the head anchor, slots 1..=k are elements
            if slot == 0 {
                head
            } else {
                link(slot - 1)
            }
        };
        for slot in 0..=k {
            let next = link_of((slot + 1) % (k + 1));
            let prev = link_of((slot + k) % (k + 1));
            let mut node = next.to_le_bytes().to_vec();
            node.extend_from_slice(&prev.to_le_bytes());

            if slot == 0 {
                builder = builder.with_segment(head, node);
            } else {
                let mut bytes = (slot as u32).to_le_bytes().to_vec();
                bytes.resize(16, 0);
                bytes.extend_from_slice(&node);
                bytes.resize(48, 0);
                builder = builder.with_segment(container(slot - 1), bytes);
            }
        }

        (builder.build(), Address::new(head))
    }

    #[test]
    fn test_reverse_truncation_scenario() {
        // 3 nodes, max_print = 2, reverse: positions 3 then 2 counting down
        let (image, head) = container_list(3);
        let mut walker = ListWalker::new(&image, &image, TargetLayout::default());
        let mut opts = raw_opts();
        opts.max_print = 2;
        opts.container = Some(ContainerSpec {
            type_name: "session".into(),
            member: "link".into(),
            fields: vec![],
        });
        let mut sink: Vec<String> = Vec::new();

        let summary = walker.walk(head, &opts, &mut sink).unwrap();
        assert_eq!(summary.found, 3);
        assert_eq!(summary.printed, 2);

        let node_lines: Vec<&String> =
            sink.iter().filter(|l| l.starts_with('[')).collect();
        assert!(node_lines[0].starts_with("[3/3]"));
        assert!(node_lines[1].starts_with("[2/3]"));
        assert!(sink.contains(&"Total nodes found: 3".to_string()));
        assert!(sink.contains(&"2 nodes printed (in reverse order)".to_string()));
    }

    #[test]
    fn test_field_projection() {
        let (image, head) = container_list(2);
        let mut walker = ListWalker::new(&image, &image, TargetLayout::default());
        let mut opts = raw_opts();
        opts.reverse = false;
        opts.container = Some(ContainerSpec {
            type_name: "session".into(),
            member: "link".into(),
            fields: vec!["id".into()],
        });
        let mut sink: Vec<String> = Vec::new();

        walker.walk(head, &opts, &mut sink).unwrap();

        assert!(sink[0].starts_with("[1/2] link=0x2010 container=0x2000"));
        assert!(sink[1].contains("id:"));
        assert!(sink[1].contains("(be 16777216, le 1)"), "got {}", sink[1]);
        assert!(sink[2].starts_with("[2/2] link=0x2110 container=0x2100"));
    }

    #[test]
    fn test_container_mapping_failure_aborts() {
        let (image, head) = circular_list(3);
        let mut walker = ListWalker::new(&image, &image, TargetLayout::default());
        let mut opts = raw_opts();
        opts.container = Some(ContainerSpec {
            type_name: "no_such_type".into(),
            member: "link".into(),
            fields: vec![],
        });
        let mut sink: Vec<String> = Vec::new();

        let summary = walker.walk(head, &opts, &mut sink).unwrap();
        assert_eq!(summary.printed, 0);
        assert!(sink[0].starts_with("Error:"));
    }

    #[test]
    fn test_read_fault_keeps_partial() {
        // Node 1's next pointer leads outside the image
        let mut image = SnapshotImage::builder().with_list_head_type();
        let head = 0x1000u64;
        image = image.with_segment(head, {
            let mut b = 0x2000u64.to_le_bytes().to_vec();
            b.extend_from_slice(&0x2000u64.to_le_bytes());
            b
        });
        image = image.with_segment(0x2000, {
            let mut b = 0xDEAD0000u64.to_le_bytes().to_vec();
            b.extend_from_slice(&head.to_le_bytes());
            b
        });
        let image = image.build();

        let mut walker = ListWalker::new(&image, &image, TargetLayout::default());
        let mut opts = raw_opts();
        opts.reverse = false;
        let mut sink: Vec<String> = Vec::new();

        let summary = walker.walk(Address::new(head), &opts, &mut sink).unwrap();
        // 0x2000 and the dangling 0xdead0000 are discovered before the
        // fault on the latter's next pointer stops the walk
        assert_eq!(summary.found, 2);
        assert!(sink[0].starts_with("Error:"));
        assert!(sink[0].contains("0xdead0000"));
        assert!(sink.iter().any(|l| l.contains("0x2000 -> 0xdead0000")));
        assert!(sink.contains(&"Total nodes found: 2".to_string()));
    }
}
