//! Error taxonomy for the directory graph.
//!
//! Only [`PayloadError`] (and the [`StructureIntegrityError`] it wraps) ever
//! reaches the caller. Change-feed and drag errors are absorbed where they
//! happen and only surface as log lines.

use thiserror::Error;

/// Which end of a link failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
	/// The link's source.
	Source,
	/// The link's target.
	Target,
}

impl std::fmt::Display for Endpoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Endpoint::Source => f.write_str("source"),
			Endpoint::Target => f.write_str("target"),
		}
	}
}

/// A link references a node id that is not part of the snapshot.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("link #{index} ({source_id} -> {target_id}) has a dangling {endpoint}")]
pub struct StructureIntegrityError {
	/// Position of the offending link in the payload.
	pub index: usize,
	/// Normalized source id. Not named `source`, which thiserror reserves.
	pub source_id: String,
	/// Normalized target id.
	pub target_id: String,
	/// The endpoint that has no matching node.
	pub endpoint: Endpoint,
}

/// Everything that can go wrong turning a backend payload into a snapshot.
#[derive(Debug, Error)]
pub enum PayloadError {
	/// Not JSON, or not one of the accepted shapes.
	#[error("invalid graph payload: {0}")]
	Json(#[from] serde_json::Error),
	/// A node's `type` is neither a file nor a directory.
	#[error("node {id:?} has unknown type {kind:?}")]
	UnknownNodeKind {
		/// Normalized node id.
		id: String,
		/// The `type` as sent.
		kind: String,
	},
	/// Two nodes share an id.
	#[error("duplicate node id {0:?}")]
	DuplicateNode(String),
	/// A link names a missing node.
	#[error(transparent)]
	Integrity(#[from] StructureIntegrityError),
}

/// A feed event that could not be turned into a `FileChange`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MalformedChangeEvent {
	/// The event is not a JSON object.
	#[error("change event is not an object")]
	NotAnObject,
	/// A required field is absent or empty.
	#[error("change event is missing `{0}`")]
	MissingField(&'static str),
	/// `type` is none of the known change names.
	#[error("change event has unknown type {0:?}")]
	UnknownKind(String),
	/// `timestamp` is neither RFC 3339 nor epoch milliseconds.
	#[error("change event has an unparseable timestamp {0:?}")]
	BadTimestamp(String),
}

/// A drag was started without an element to drag.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("pointer-down without a resolvable element")]
pub struct DragAttachmentError;
