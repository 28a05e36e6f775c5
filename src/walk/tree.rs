//! Intrusive binary tree traversal
//!
//! Two modes: an iterative in-order walk with the same container mapping as
//! the list walker, and a raw level-order enumeration rendered as an ASCII
//! tree. Connectivity is foundational in the raw mode, so any unreadable
//! link aborts the whole traversal; a partial tree drawing would lie about
//! the shape.

use super::{display_position, emit_container, emit_totals, WalkOptions, WalkSummary};
use crate::core::types::{Address, ProbeResult};
use crate::provider::{read_pointer, MemoryReader, TargetLayout, TypeLayoutProvider};
use crate::render::LineSink;
use crate::resolve::ContainerResolver;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

pub struct TreeWalker<'a, P, M>
where
    P: TypeLayoutProvider + ?Sized,
    M: MemoryReader + ?Sized,
{
    resolver: ContainerResolver<'a, P>,
    reader: &'a M,
    target: TargetLayout,
}

impl<'a, P, M> TreeWalker<'a, P, M>
where
    P: TypeLayoutProvider + ?Sized,
    M: MemoryReader + ?Sized,
{
    pub fn new(provider: &'a P, reader: &'a M, target: TargetLayout) -> Self {
        TreeWalker {
            resolver: ContainerResolver::new(provider),
            reader,
            target,
        }
    }

    fn link_offsets(&mut self, link_type: &str) -> ProbeResult<(u64, u64)> {
        let left = self.resolver.offset_of(link_type, "left")?;
        let right = self.resolver.offset_of(link_type, "right")?;
        Ok((left, right))
    }

    fn read_link(&self, node: Address, offset: u64) -> ProbeResult<Address> {
        read_pointer(
            self.reader,
            node.add(offset),
            self.target.pointer_size,
            self.target.byte_order,
        )
    }

    /// In-order traversal from `root` (the address of the root link node;
    /// null means an empty tree), mapped to containers as the list walker
    /// does.
    pub fn walk_in_order(
        &mut self,
        root: Address,
        opts: &WalkOptions,
        sink: &mut dyn LineSink,
    ) -> ProbeResult<WalkSummary> {
        let (left_off, right_off) = self.link_offsets(&opts.link_type)?;

        // Iterative in-order: push the left spine, pop, descend right.
        // The budget counts examined nodes (visited plus stacked).
        let mut visited: Vec<Address> = Vec::new();
        let mut stack: Vec<Address> = Vec::new();
        let mut current = root;
        let mut budget_hit = false;

        loop {
            if visited.len() >= opts.max_search {
                budget_hit = !current.is_null() || !stack.is_empty();
                break;
            }
            while !current.is_null() {
                if stack.len() + visited.len() >= opts.max_search {
                    budget_hit = true;
                    break;
                }
                stack.push(current);
                current = self.read_link(current, left_off)?;
            }
            if budget_hit {
                break;
            }
            match stack.pop() {
                Some(node) => {
                    visited.push(node);
                    current = self.read_link(node, right_off)?;
                }
                None => break,
            }
        }

        let found = visited.len();
        debug!(%root, found, budget_hit, "in-order discovery complete");
        if budget_hit {
            warn!(%root, budget = opts.max_search, "tree search budget exhausted");
        }

        if found == 0 {
            sink.line("Total nodes found: 0");
            return Ok(WalkSummary {
                found: 0,
                printed: 0,
                budget_hit,
            });
        }

        // Reverse display order: last-visited-first, positions counting down.
        let display: Vec<Address> = if opts.reverse {
            visited.iter().rev().copied().collect()
        } else {
            visited.clone()
        };
        let printed = found.min(opts.max_print);

        match &opts.container {
            None => {
                for row in display[..printed].chunks(crate::render::ADDRESSES_PER_ROW) {
                    sink.line(&crate::render::address_row(row));
                }
            }
            Some(spec) => {
                for (index, &node) in display[..printed].iter().enumerate() {
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

    /// Raw level-order enumeration rendered as an ASCII tree.
    ///
    /// Any unreadable link is fatal to the whole traversal. The search
    /// budget still applies; nodes beyond it are drawn as leaves after the
    /// warning.
    pub fn walk_level_order(
        &mut self,
        root: Address,
        opts: &WalkOptions,
        sink: &mut dyn LineSink,
    ) -> ProbeResult<WalkSummary> {
        let (left_off, right_off) = self.link_offsets(&opts.link_type)?;

        if root.is_null() {
            sink.line("Total nodes found: 0");
            return Ok(WalkSummary {
                found: 0,
                printed: 0,
                budget_hit: false,
            });
        }

        // Breadth-first discovery of each node's children.
        let mut children: HashMap<Address, (Address, Address)> = HashMap::new();
        let mut queue: VecDeque<Address> = VecDeque::from([root]);
        let mut budget_hit = false;

        while let Some(node) = queue.pop_front() {
            if children.len() >= opts.max_search {
                budget_hit = true;
                break;
            }
            let left = self.read_link(node, left_off)?;
            let right = self.read_link(node, right_off)?;
            children.insert(node, (left, right));
            if !left.is_null() {
                queue.push_back(left);
            }
            if !right.is_null() {
                queue.push_back(right);
            }
        }

        let found = children.len();
        if budget_hit {
            warn!(%root, budget = opts.max_search, "tree search budget exhausted");
            sink.line(&format!(
                "Warning: search budget of {} nodes exhausted; undiscovered subtrees drawn as leaves",
                opts.max_search
            ));
        }

        // Depth-first rendering. Children are pushed left-then-right so the
        // right subtree pops first and renders above the left one.
        struct Frame {
            addr: Address,
            prefix: String,
            glyph: &'static str,
            last: bool,
        }

        let mut stack = vec![Frame {
            addr: root,
            prefix: String::new(),
            glyph: "",
            last: true,
        }];

        while let Some(frame) = stack.pop() {
            sink.line(&format!("{}{}{}", frame.prefix, frame.glyph, frame.addr));

            let (left, right) = children
                .get(&frame.addr)
                .copied()
                .unwrap_or((Address::null(), Address::null()));

            let child_prefix = if frame.glyph.is_empty() {
                String::new()
            } else {
                format!("{}{}", frame.prefix, if frame.last { "    " } else { "│   " })
            };

            let mut render_order: Vec<Address> = Vec::with_capacity(2);
            if !right.is_null() {
                render_order.push(right);
            }
            if !left.is_null() {
                render_order.push(left);
            }
            for (i, &child) in render_order.iter().enumerate().rev() {
                let last = i == render_order.len() - 1;
                stack.push(Frame {
                    addr: child,
                    prefix: child_prefix.clone(),
                    glyph: if last { "└── " } else { "├── " },
                    last,
                });
            }
        }

        sink.line(&format!("Total nodes found: {found}"));
        Ok(WalkSummary {
            found,
            printed: found,
            budget_hit,
        })
    }
}
