//! Tree walker properties over synthetic balanced trees

use memprobe::core::types::Address;
use memprobe::provider::TargetLayout;
use memprobe::snapshot::SnapshotImage;
use memprobe::walk::{ContainerSpec, TreeWalker, WalkOptions};

// Containers carry `key: u32` at offset 0 and the link node at offset 8.

fn container(i: usize) -> u64 {
    0x2000 + (i as u64) * 0x100
}

fn link(i: usize) -> u64 {
    container(i) + 8
}

/// Builds a complete balanced tree of depth `d` (2^d - 1 nodes) whose keys
/// are assigned along in-order positions, so in-order traversal yields
/// strictly increasing keys.
fn balanced_tree(depth: u32) -> (SnapshotImage, Address) {
    let count = (1usize << depth) - 1;
    let mut builder = SnapshotImage::builder()
        .with_tree_link_type()
        .with_container_type(
            "tnode",
            24,
            &[("key", 0, "u32", 4), ("node", 8, "avl_node", 16)],
        );

    // Heap layout: node i has children 2i+1 / 2i+2; in-order rank = key.
    let mut in_order_rank = vec![0u32; count];
    let mut rank = 0u32;
    fn assign(i: usize, count: usize, rank: &mut u32, out: &mut [u32]) {
        if i >= count {
            return;
        }
        assign(2 * i + 1, count, rank, out);
        out[i] = *rank;
        *rank += 1;
        assign(2 * i + 2, count, rank, out);
    }
    assign(0, count, &mut rank, &mut in_order_rank);

    for i in 0..count {
        let left = if 2 * i + 1 < count { link(2 * i + 1) } else { 0 };
        let right = if 2 * i + 2 < count { link(2 * i + 2) } else { 0 };

        let mut bytes = in_order_rank[i].to_le_bytes().to_vec();
        bytes.resize(8, 0);
        bytes.extend_from_slice(&left.to_le_bytes());
        bytes.extend_from_slice(&right.to_le_bytes());
        builder = builder.with_segment(container(i), bytes);
    }

    (builder.build(), Address::new(link(0)))
}

fn options() -> WalkOptions {
    let mut opts = WalkOptions::new("avl_node");
    opts.reverse = false;
    opts.max_search = 256;
    opts.max_print = 256;
    opts
}

fn projected_keys(sink: &[String]) -> Vec<u64> {
    sink.iter()
        .filter(|l| l.trim_start().starts_with("key:"))
        .map(|l| {
            let le = l.split("le ").nth(1).unwrap();
            le.trim_end_matches(')').parse().unwrap()
        })
        .collect()
}

#[test]
fn test_in_order_keys_are_sorted() {
    for depth in [1, 2, 3, 4] {
        let (image, root) = balanced_tree(depth);
        let mut walker = TreeWalker::new(&image, &image, TargetLayout::default());
        let mut opts = options();
        opts.container = Some(ContainerSpec {
            type_name: "tnode".into(),
            member: "node".into(),
            fields: vec!["key".into()],
        });
        let mut sink: Vec<String> = Vec::new();

        let summary = walker.walk_in_order(root, &opts, &mut sink).unwrap();
        assert_eq!(summary.found, (1usize << depth) - 1);

        let keys = projected_keys(&sink);
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted, "depth {depth} not in order");
        assert_eq!(keys.len(), summary.found);
    }
}

#[test]
fn test_reverse_in_order_descends() {
    let (image, root) = balanced_tree(3);
    let mut walker = TreeWalker::new(&image, &image, TargetLayout::default());
    let mut opts = options();
    opts.reverse = true;
    opts.container = Some(ContainerSpec {
        type_name: "tnode".into(),
        member: "node".into(),
        fields: vec!["key".into()],
    });
    let mut sink: Vec<String> = Vec::new();

    walker.walk_in_order(root, &opts, &mut sink).unwrap();

    let keys = projected_keys(&sink);
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    sorted.reverse();
    assert_eq!(keys, sorted);

    // Positions count down from the total
    let first = sink.iter().find(|l| l.starts_with('[')).unwrap();
    assert!(first.starts_with("[7/7]"));
}

#[test]
fn test_budget_bounds_tree_search() {
    let (image, root) = balanced_tree(4); // 15 nodes
    let mut walker = TreeWalker::new(&image, &image, TargetLayout::default());
    let mut opts = options();
    opts.max_search = 6;
    let mut sink: Vec<String> = Vec::new();

    let summary = walker.walk_in_order(root, &opts, &mut sink).unwrap();
    assert!(summary.budget_hit);
    assert!(summary.found <= 6);
    assert!(sink.iter().any(|l| l.starts_with("Warning: search budget")));
}

#[test]
fn test_level_order_rendering() {
    let (image, root) = balanced_tree(2); // 3 nodes
    let mut walker = TreeWalker::new(&image, &image, TargetLayout::default());
    let mut sink: Vec<String> = Vec::new();

    let summary = walker
        .walk_level_order(root, &options(), &mut sink)
        .unwrap();
    assert_eq!(summary.found, 3);

    // Root is link(0) = 0x2008; right child link(2) = 0x2208 above the
    // left child link(1) = 0x2108
    assert_eq!(sink[0], "0x2008");
    assert_eq!(sink[1], "├── 0x2208");
    assert_eq!(sink[2], "└── 0x2108");
    assert_eq!(sink[3], "Total nodes found: 3");
}

#[test]
fn test_level_order_null_root() {
    let (image, _) = balanced_tree(2);
    let mut walker = TreeWalker::new(&image, &image, TargetLayout::default());
    let mut sink: Vec<String> = Vec::new();

    let summary = walker
        .walk_level_order(Address::null(), &options(), &mut sink)
        .unwrap();
    assert_eq!(summary.found, 0);
    assert_eq!(sink, vec!["Total nodes found: 0"]);
}
