//! Graph data model: directory nodes, parent/child links and file changes.
//!
//! A [`DirectoryStructure`] can only be built by the normalizer (or derived
//! from an existing snapshot), so every instance a consumer sees already
//! satisfies referential integrity: each link endpoint names a node of the
//! same snapshot.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

/// Whether a node is a file or a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// A regular file.
	File,
	/// A directory.
	Directory,
}

impl NodeKind {
	/// Parse a backend `type` string. `"folder"` is what the directory
	/// endpoint actually sends for directories.
	pub fn parse(kind: &str) -> Option<Self> {
		match kind {
			"file" => Some(NodeKind::File),
			"directory" | "folder" | "dir" => Some(NodeKind::Directory),
			_ => None,
		}
	}

	/// Canonical lowercase name.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::File => "file",
			NodeKind::Directory => "directory",
		}
	}
}

/// A file or directory vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique within one snapshot. Always a string, whatever the backend sent.
	pub id: String,
	/// Display name, usually the last path segment.
	pub name: String,
	/// File or directory.
	pub kind: NodeKind,
	/// Path relative to the watched root, when the backend provides one.
	pub path: Option<String>,
}

impl Node {
	/// The path used to correlate file changes with this node.
	pub fn match_path(&self) -> &str {
		self.path.as_deref().unwrap_or(&self.name)
	}

	/// Look up a display field by name. Unknown fields fall back to `name`.
	pub fn field(&self, field: &str) -> &str {
		match field {
			"id" => &self.id,
			"path" => self.match_path(),
			"type" | "kind" => self.kind.as_str(),
			_ => &self.name,
		}
	}
}

/// A directed `source -> target` relation between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
	/// Parent id.
	pub source: String,
	/// Child id.
	pub target: String,
}

/// An immutable node/link snapshot.
///
/// Order is the payload's insertion order. It carries no meaning but is kept
/// so that re-renders of an unchanged payload line up position by position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectoryStructure {
	nodes: Vec<Node>,
	links: Vec<Link>,
}

impl DirectoryStructure {
	/// Assemble a snapshot whose integrity the caller has already checked.
	pub(crate) fn from_checked(nodes: Vec<Node>, links: Vec<Link>) -> Self {
		Self { nodes, links }
	}

	/// Nodes in payload order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Links in payload order.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// No nodes at all.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The node with `id`.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Ids of every node directly linked to `id`, in link order.
	pub fn neighbors(&self, id: &str) -> Vec<&str> {
		let mut seen = HashSet::new();
		self.links
			.iter()
			.filter_map(|l| {
				if l.source == id {
					Some(l.target.as_str())
				} else if l.target == id {
					Some(l.source.as_str())
				} else {
					None
				}
			})
			.filter(|n| seen.insert(*n))
			.collect()
	}

	/// Depth of every node below its root(s), following links downwards.
	/// Nodes on a cycle with no root get depth 0.
	pub fn depths(&self) -> HashMap<&str, usize> {
		let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
		let mut has_parent = HashSet::new();
		for link in &self.links {
			children
				.entry(link.source.as_str())
				.or_default()
				.push(link.target.as_str());
			has_parent.insert(link.target.as_str());
		}

		let mut depths = HashMap::new();
		let mut stack: Vec<(&str, usize)> = self
			.nodes
			.iter()
			.filter(|n| !has_parent.contains(n.id.as_str()))
			.map(|n| (n.id.as_str(), 0))
			.collect();
		while let Some((id, depth)) = stack.pop() {
			if depths.contains_key(id) {
				continue;
			}
			depths.insert(id, depth);
			if let Some(kids) = children.get(id) {
				stack.extend(kids.iter().map(|k| (*k, depth + 1)));
			}
		}
		for node in &self.nodes {
			depths.entry(node.id.as_str()).or_insert(0);
		}
		depths
	}

	/// Nodes whose name or path contains `query` (case-insensitive), with the
	/// links between them. An empty query keeps everything.
	pub fn filter(&self, query: &str) -> DirectoryStructure {
		let query = query.trim().to_lowercase();
		if query.is_empty() {
			return self.clone();
		}
		self.retain(|n| {
			n.name.to_lowercase().contains(&query)
				|| n.path
					.as_ref()
					.is_some_and(|p| p.to_lowercase().contains(&query))
		})
	}

	/// `id` plus its direct neighbours and the links touching `id`.
	/// Returns an empty snapshot when `id` is unknown.
	pub fn neighborhood(&self, id: &str) -> DirectoryStructure {
		if self.node(id).is_none() {
			return DirectoryStructure::default();
		}
		let mut keep: HashSet<&str> = self.neighbors(id).into_iter().collect();
		keep.insert(id);
		let nodes = self
			.nodes
			.iter()
			.filter(|n| keep.contains(n.id.as_str()))
			.cloned()
			.collect();
		let links = self
			.links
			.iter()
			.filter(|l| l.source == id || l.target == id)
			.cloned()
			.collect();
		DirectoryStructure { nodes, links }
	}

	fn retain(&self, keep: impl Fn(&Node) -> bool) -> DirectoryStructure {
		let nodes: Vec<Node> = self.nodes.iter().filter(|n| keep(n)).cloned().collect();
		let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let links = self
			.links
			.iter()
			.filter(|l| ids.contains(l.source.as_str()) && ids.contains(l.target.as_str()))
			.cloned()
			.collect();
		DirectoryStructure { nodes, links }
	}
}

/// What happened to a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
	/// Created.
	Add,
	/// Modified or moved.
	Modify,
	/// Deleted.
	Delete,
}

impl ChangeKind {
	/// Accepts both the canonical names and the file watcher's event names.
	/// A move is reported as a modification of the source path.
	pub fn parse(kind: &str) -> Option<Self> {
		match kind.to_ascii_lowercase().as_str() {
			"add" | "added" | "created" | "create" => Some(ChangeKind::Add),
			"modify" | "modified" | "moved" | "change" | "changed" => Some(ChangeKind::Modify),
			"delete" | "deleted" | "removed" | "remove" => Some(ChangeKind::Delete),
			_ => None,
		}
	}

	/// Canonical lowercase name.
	pub fn as_str(self) -> &'static str {
		match self {
			ChangeKind::Add => "add",
			ChangeKind::Modify => "modify",
			ChangeKind::Delete => "delete",
		}
	}
}

/// One file-system change as received from the feed. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileChange {
	/// What happened.
	pub kind: ChangeKind,
	/// Changed path, possibly absolute.
	pub path: String,
	/// When the change happened, or when it arrived if the feed did not say.
	/// Informational only; ordering uses arrival order.
	pub timestamp: DateTime<Utc>,
}

impl FileChange {
	/// A change record.
	pub fn new(kind: ChangeKind, path: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
		Self {
			kind,
			path: path.into(),
			timestamp,
		}
	}
}
