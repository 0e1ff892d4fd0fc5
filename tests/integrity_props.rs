//! Property tests for the normalizer's integrity guarantee.

use std::collections::HashSet;

use dir_graph::error::{Endpoint, PayloadError};
use dir_graph::normalize::{RawGraph, RawId, RawLink, RawNode, normalize};
use proptest::prelude::*;
use proptest::sample::Index;

fn id(i: usize, numeric: bool) -> RawId {
	if numeric {
		RawId::from(i as i64)
	} else {
		RawId::Text(format!("n{i}"))
	}
}

fn graph(n: usize, edges: &[(usize, usize)], numeric: bool) -> RawGraph {
	RawGraph {
		nodes: (0..n)
			.map(|i| RawNode {
				id: id(i, numeric),
				name: format!("entry-{i}"),
				kind: if i % 3 == 0 { "directory" } else { "file" }.to_string(),
				path: None,
			})
			.collect(),
		links: edges
			.iter()
			.map(|&(s, t)| RawLink {
				source: id(s, numeric),
				target: id(t, numeric),
			})
			.collect(),
	}
}

fn edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
	prop::collection::vec((0usize..40, 0usize..40), 0..80)
}

proptest! {
	#[test]
	fn clean_graphs_have_no_dangling_links(
		n in 1usize..40,
		edges in edges(),
		numeric in any::<bool>(),
	) {
		let edges: Vec<_> = edges.into_iter().map(|(s, t)| (s % n, t % n)).collect();
		let s = normalize(&graph(n, &edges, numeric)).unwrap();

		let ids: HashSet<&str> = s.nodes().iter().map(|n| n.id.as_str()).collect();
		prop_assert_eq!(ids.len(), n);
		prop_assert_eq!(s.links().len(), edges.len());
		for link in s.links() {
			prop_assert!(ids.contains(link.source.as_str()));
			prop_assert!(ids.contains(link.target.as_str()));
		}
		if numeric {
			prop_assert!(s.nodes().iter().all(|n| n.id.parse::<i64>().is_ok()));
		}
	}

	#[test]
	fn injected_dangling_link_is_always_rejected(
		n in 1usize..40,
		edges in edges(),
		at in any::<Index>(),
		ghost_is_source in any::<bool>(),
		numeric in any::<bool>(),
	) {
		let edges: Vec<_> = edges.into_iter().map(|(s, t)| (s % n, t % n)).collect();
		let mut raw = graph(n, &edges, numeric);
		let position = at.index(raw.links.len() + 1);
		let (ghost, anchor) = (id(n + 1000, numeric), id(0, numeric));
		let link = if ghost_is_source {
			RawLink { source: ghost, target: anchor }
		} else {
			RawLink { source: anchor, target: ghost }
		};
		raw.links.insert(position, link);

		match normalize(&raw) {
			Err(PayloadError::Integrity(e)) => {
				prop_assert_eq!(e.index, position);
				let expected = if ghost_is_source { Endpoint::Source } else { Endpoint::Target };
				prop_assert_eq!(e.endpoint, expected);
			}
			other => prop_assert!(false, "expected an integrity error, got {:?}", other),
		}
	}
}
