//! Turns backend payloads into [`DirectoryStructure`] snapshots.
//!
//! Two payload shapes are accepted:
//! - a flat graph `{ nodes: [...], links: [...] }` whose ids may be numbers or
//!   strings, and
//! - the directory endpoint's tree `{ structure: [{ name, type, path, children }] }`,
//!   which is flattened into the flat form first.
//!
//! Every id goes through [`coerce_id`], so `1`, `1.0` and `"1"` all end up as
//! `"1"`. The transform is pure: the same payload always gives the same
//! snapshot.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{Endpoint, PayloadError, StructureIntegrityError};
use crate::model::{DirectoryStructure, Link, Node, NodeKind};

/// An identifier as the backend sent it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawId {
	/// A JSON number; integral floats are allowed.
	Number(serde_json::Number),
	/// A JSON string.
	Text(String),
}

impl From<i64> for RawId {
	fn from(n: i64) -> Self {
		RawId::Number(n.into())
	}
}

impl From<i32> for RawId {
	fn from(n: i32) -> Self {
		RawId::Number(n.into())
	}
}

impl From<&str> for RawId {
	fn from(s: &str) -> Self {
		RawId::Text(s.to_string())
	}
}

/// A node as the backend sent it.
#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
	/// Number or string.
	pub id: RawId,
	/// Display name.
	pub name: String,
	/// The `type` field, not yet validated.
	#[serde(rename = "type")]
	pub kind: String,
	/// Path relative to the watched root.
	#[serde(default)]
	pub path: Option<String>,
}

/// A link as the backend sent it.
#[derive(Clone, Debug, Deserialize)]
pub struct RawLink {
	/// Source id.
	pub source: RawId,
	/// Target id.
	pub target: RawId,
}

/// Flat graph payload.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGraph {
	/// Every node.
	pub nodes: Vec<RawNode>,
	/// Every link; may be absent.
	#[serde(default)]
	pub links: Vec<RawLink>,
}

/// One entry of the hierarchical directory listing.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEntry {
	/// Display name.
	pub name: String,
	/// The `type` field, not yet validated.
	#[serde(rename = "type")]
	pub kind: String,
	/// Path relative to the watched root.
	#[serde(default)]
	pub path: Option<String>,
	/// Entries inside a directory.
	#[serde(default)]
	pub children: Vec<RawEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
	Graph(RawGraph),
	Tree { structure: Vec<RawEntry> },
	Entries(Vec<RawEntry>),
}

/// String form of a backend id. Integral numbers print without a fractional
/// part so that `1` and `1.0` name the same node.
pub fn coerce_id(id: &RawId) -> String {
	match id {
		RawId::Text(s) => s.clone(),
		RawId::Number(n) => {
			if let Some(i) = n.as_i64() {
				i.to_string()
			} else if let Some(u) = n.as_u64() {
				u.to_string()
			} else {
				match n.as_f64() {
					Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
						format!("{}", f as i64)
					}
					_ => n.to_string(),
				}
			}
		}
	}
}

/// Normalize a flat graph payload.
///
/// Fails on the first link whose endpoint has no node; nothing is repaired.
pub fn normalize(raw: &RawGraph) -> Result<DirectoryStructure, PayloadError> {
	let mut nodes = Vec::with_capacity(raw.nodes.len());
	let mut ids = HashSet::with_capacity(raw.nodes.len());
	for rn in &raw.nodes {
		let id = coerce_id(&rn.id);
		let kind = NodeKind::parse(&rn.kind).ok_or_else(|| PayloadError::UnknownNodeKind {
			id: id.clone(),
			kind: rn.kind.clone(),
		})?;
		if !ids.insert(id.clone()) {
			return Err(PayloadError::DuplicateNode(id));
		}
		nodes.push(Node {
			id,
			name: rn.name.clone(),
			kind,
			path: rn.path.clone(),
		});
	}

	let mut links = Vec::with_capacity(raw.links.len());
	for (index, rl) in raw.links.iter().enumerate() {
		let (source, target) = (coerce_id(&rl.source), coerce_id(&rl.target));
		let dangling = if !ids.contains(&source) {
			Some(Endpoint::Source)
		} else if !ids.contains(&target) {
			Some(Endpoint::Target)
		} else {
			None
		};
		if let Some(endpoint) = dangling {
			return Err(StructureIntegrityError {
				index,
				source_id: source,
				target_id: target,
				endpoint,
			}
			.into());
		}
		links.push(Link { source, target });
	}

	Ok(DirectoryStructure::from_checked(nodes, links))
}

/// Flatten a directory tree into a flat graph, parents before children.
///
/// An entry's id is its `path`, or the `/`-joined chain of names from the
/// top when the backend left `path` out.
pub fn flatten_tree(entries: &[RawEntry]) -> RawGraph {
	let mut graph = RawGraph::default();
	for entry in entries {
		flatten_entry(entry, None, &mut graph);
	}
	graph
}

fn flatten_entry(entry: &RawEntry, parent: Option<&str>, out: &mut RawGraph) {
	let id = match (&entry.path, parent) {
		(Some(path), _) => path.clone(),
		(None, Some(parent)) => format!("{parent}/{}", entry.name),
		(None, None) => entry.name.clone(),
	};
	out.nodes.push(RawNode {
		id: RawId::Text(id.clone()),
		name: entry.name.clone(),
		kind: entry.kind.clone(),
		path: Some(id.clone()),
	});
	if let Some(parent) = parent {
		out.links.push(RawLink {
			source: RawId::Text(parent.to_string()),
			target: RawId::Text(id.clone()),
		});
	}
	for child in &entry.children {
		flatten_entry(child, Some(&id), out);
	}
}

/// Parse and normalize a JSON payload of either shape.
pub fn parse_payload(json: &str) -> Result<DirectoryStructure, PayloadError> {
	match serde_json::from_str::<RawPayload>(json)? {
		RawPayload::Graph(graph) => normalize(&graph),
		RawPayload::Tree { structure } | RawPayload::Entries(structure) => {
			normalize(&flatten_tree(&structure))
		}
	}
}
