//! Recent file changes, in the order they reached us.
//!
//! The tracker keeps an append-only log and hands out newest-first slices of
//! it for display. Embedded timestamps are carried along but never used for
//! ordering, since the watcher's clock is not ours.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::error::MalformedChangeEvent;
use crate::model::{ChangeKind, DirectoryStructure, FileChange};

/// How many changes the overlay shows unless configured otherwise.
pub const DEFAULT_DISPLAY_LIMIT: usize = 5;

/// Display and retention settings, read from the `changes` config section.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
	/// Number of entries the overlay asks for.
	pub display_limit: usize,
	/// Oldest entries beyond this count are purged. `None` keeps everything.
	pub retention: Option<usize>,
	/// Paths are cut to whatever follows this marker, e.g. `/babel_generated/`.
	pub strip_prefix: Option<String>,
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			display_limit: DEFAULT_DISPLAY_LIMIT,
			retention: None,
			strip_prefix: None,
		}
	}
}

/// Append-only change log with a newest-first view.
#[derive(Clone, Debug, Default)]
pub struct ChangeFeedTracker {
	config: TrackerConfig,
	log: VecDeque<FileChange>,
	dropped: u64,
}

impl ChangeFeedTracker {
	/// An empty log.
	pub fn new(config: TrackerConfig) -> Self {
		Self {
			config,
			..Self::default()
		}
	}

	/// Settings the tracker was built with.
	pub fn config(&self) -> &TrackerConfig {
		&self.config
	}

	/// Append a change. Never fails and never rejects old events.
	pub fn record(&mut self, event: FileChange) {
		self.log.push_back(event);
		if let Some(max) = self.config.retention {
			while self.log.len() > max {
				self.log.pop_front();
			}
		}
	}

	/// Up to `limit` most recently recorded changes, newest first.
	pub fn recent_changes(&self, limit: usize) -> Vec<&FileChange> {
		self.log.iter().rev().take(limit).collect()
	}

	/// [`recent_changes`](Self::recent_changes) with the configured limit.
	pub fn recent(&self) -> Vec<&FileChange> {
		self.recent_changes(self.config.display_limit)
	}

	/// Entries currently kept.
	pub fn len(&self) -> usize {
		self.log.len()
	}

	/// Nothing recorded (or everything purged).
	pub fn is_empty(&self) -> bool {
		self.log.is_empty()
	}

	/// Number of feed events dropped as malformed.
	pub fn dropped(&self) -> u64 {
		self.dropped
	}

	/// Record one raw feed event, stamping it with `now` if it carries no
	/// timestamp. Malformed events are logged and dropped.
	pub fn ingest_at(&mut self, raw: &Value, now: DateTime<Utc>) -> bool {
		match parse_event(raw, now, self.config.strip_prefix.as_deref()) {
			Ok(change) => {
				self.record(change);
				true
			}
			Err(e) => {
				self.dropped += 1;
				warn!("dir-graph: dropping change event: {e} ({raw})");
				false
			}
		}
	}

	/// Record a feed message. Accepts `{ "changes": [...] }`, a bare array of
	/// events, or a single event. Returns how many events were recorded.
	pub fn ingest_message(&mut self, message: &str) -> usize {
		let value: Value = match serde_json::from_str(message) {
			Ok(v) => v,
			Err(e) => {
				self.dropped += 1;
				warn!("dir-graph: ignoring unparseable change message: {e}");
				return 0;
			}
		};
		let now = Utc::now();
		let events = match &value {
			Value::Object(map) => match map.get("changes") {
				Some(Value::Array(items)) => items.iter().collect(),
				_ => vec![&value],
			},
			Value::Array(items) => items.iter().collect(),
			_ => vec![&value],
		};
		events
			.into_iter()
			.filter(|raw| self.ingest_at(raw, now))
			.count()
	}

	/// Ids of nodes touched by the `limit` most recent changes, newest first,
	/// each id at most once.
	pub fn changed_node_ids(&self, structure: &DirectoryStructure, limit: usize) -> Vec<String> {
		let mut seen = HashSet::new();
		let mut ids = Vec::new();
		for change in self.recent_changes(limit) {
			for node in structure.nodes() {
				if path_matches(&change.path, node.match_path()) && seen.insert(node.id.as_str()) {
					ids.push(node.id.clone());
				}
			}
		}
		ids
	}
}

fn path_matches(changed: &str, node_path: &str) -> bool {
	let changed = changed.trim_end_matches('/');
	let node_path = node_path.trim_end_matches('/');
	!node_path.is_empty()
		&& (changed == node_path
			|| changed
				.strip_suffix(node_path)
				.is_some_and(|head| head.ends_with('/')))
}

/// Build a [`FileChange`] from one raw feed event.
pub fn parse_event(
	raw: &Value,
	now: DateTime<Utc>,
	strip_prefix: Option<&str>,
) -> Result<FileChange, MalformedChangeEvent> {
	let map = raw.as_object().ok_or(MalformedChangeEvent::NotAnObject)?;

	let kind = map
		.get("type")
		.and_then(Value::as_str)
		.ok_or(MalformedChangeEvent::MissingField("type"))?;
	let kind =
		ChangeKind::parse(kind).ok_or_else(|| MalformedChangeEvent::UnknownKind(kind.into()))?;

	let path = map
		.get("path")
		.or_else(|| map.get("fileName"))
		.and_then(Value::as_str)
		.filter(|p| !p.is_empty())
		.ok_or(MalformedChangeEvent::MissingField("path"))?;
	let path = match strip_prefix {
		Some(marker) if !marker.is_empty() => match path.rsplit_once(marker) {
			Some((_, rest)) if !rest.is_empty() => rest,
			_ => path,
		},
		_ => path,
	};

	let timestamp = match map.get("timestamp") {
		None | Some(Value::Null) => now,
		Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
			.map(|t| t.with_timezone(&Utc))
			.map_err(|_| MalformedChangeEvent::BadTimestamp(s.clone()))?,
		Some(Value::Number(n)) => n
			.as_i64()
			.and_then(DateTime::from_timestamp_millis)
			.ok_or_else(|| MalformedChangeEvent::BadTimestamp(n.to_string()))?,
		Some(other) => return Err(MalformedChangeEvent::BadTimestamp(other.to_string())),
	};

	Ok(FileChange::new(kind, path, timestamp))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use serde_json::json;

	fn at(secs: i64) -> DateTime<Utc> {
		Utc.timestamp_opt(secs, 0).unwrap()
	}

	fn change(path: &str, secs: i64) -> FileChange {
		FileChange::new(ChangeKind::Modify, path, at(secs))
	}

	#[test]
	fn newest_first_by_arrival() {
		let mut t = ChangeFeedTracker::default();
		for i in 1..=6 {
			t.record(change(&format!("E{i}"), i));
		}
		let paths: Vec<_> = t.recent_changes(5).iter().map(|c| c.path.as_str()).collect();
		assert_eq!(paths, vec!["E6", "E5", "E4", "E3", "E2"]);
		assert_eq!(t.len(), 6);
	}

	#[test]
	fn arrival_order_beats_embedded_timestamps() {
		let mut t = ChangeFeedTracker::default();
		t.record(change("late-clock", 500));
		t.record(change("early-clock", 10));
		let paths: Vec<_> = t.recent_changes(2).iter().map(|c| c.path.as_str()).collect();
		assert_eq!(paths, vec!["early-clock", "late-clock"]);
	}

	#[test]
	fn identical_timestamps_keep_arrival_order() {
		let mut t = ChangeFeedTracker::default();
		t.record(change("a", 1));
		t.record(change("b", 1));
		t.record(change("c", 1));
		let paths: Vec<_> = t.recent_changes(10).iter().map(|c| c.path.as_str()).collect();
		assert_eq!(paths, vec!["c", "b", "a"]);
	}

	#[test]
	fn zero_limit_is_empty() {
		let mut t = ChangeFeedTracker::default();
		t.record(change("a", 1));
		assert!(t.recent_changes(0).is_empty());
	}

	#[test]
	fn retention_purges_oldest() {
		let mut t = ChangeFeedTracker::new(TrackerConfig {
			retention: Some(3),
			..TrackerConfig::default()
		});
		for i in 0..10 {
			t.record(change(&i.to_string(), i));
		}
		assert_eq!(t.len(), 3);
		assert_eq!(t.recent_changes(10)[2].path, "7");
		assert_eq!(t.recent_changes(10)[0].path, "9");
	}

	#[test]
	fn malformed_events_are_dropped() {
		let mut t = ChangeFeedTracker::default();
		assert!(!t.ingest_at(&json!({"path": "a.txt"}), at(0)));
		assert!(!t.ingest_at(&json!({"type": "created"}), at(0)));
		assert!(!t.ingest_at(&json!({"type": "exploded", "path": "a"}), at(0)));
		assert!(!t.ingest_at(&json!("created a.txt"), at(0)));
		assert!(!t.ingest_at(&json!({"type": "add", "path": "a", "timestamp": "yesterday"}), at(0)));
		assert!(t.is_empty());
		assert_eq!(t.dropped(), 5);
	}

	#[test]
	fn missing_timestamp_uses_arrival_time() {
		let c = parse_event(&json!({"type": "modified", "path": "x"}), at(42), None).unwrap();
		assert_eq!(c.timestamp, at(42));
		assert_eq!(c.kind, ChangeKind::Modify);

		let c = parse_event(
			&json!({"type": "add", "path": "x", "timestamp": "2024-07-16T12:34:00Z"}),
			at(42),
			None,
		)
		.unwrap();
		assert_eq!(c.timestamp, Utc.with_ymd_and_hms(2024, 7, 16, 12, 34, 0).unwrap());
	}

	#[test]
	fn batch_message_keeps_good_entries() {
		let mut t = ChangeFeedTracker::default();
		let n = t.ingest_message(
			r#"{"changes": [
				{"type": "created", "path": "/srv/babel_generated/app/main.py"},
				{"type": "modified"},
				{"type": "deleted", "path": "/srv/babel_generated/app/old.py"}
			]}"#,
		);
		assert_eq!(n, 2);
		assert_eq!(t.dropped(), 1);
		assert_eq!(t.recent_changes(1)[0].kind, ChangeKind::Delete);
		assert_eq!(t.ingest_message("not json"), 0);
	}

	#[test]
	fn prefix_marker_is_stripped() {
		let c = parse_event(
			&json!({"type": "created", "path": "/srv/babel_generated/app/main.py"}),
			at(0),
			Some("/babel_generated/"),
		)
		.unwrap();
		assert_eq!(c.path, "app/main.py");

		let c = parse_event(&json!({"type": "created", "path": "other/x.py"}), at(0), Some("/babel_generated/"))
			.unwrap();
		assert_eq!(c.path, "other/x.py");
	}

	#[test]
	fn changes_map_to_node_ids() {
		let s = crate::normalize::parse_payload(
			r#"{"structure": [{"name": "app", "type": "folder", "path": "app", "children": [
				{"name": "main.py", "type": "file", "path": "app/main.py"},
				{"name": "util.py", "type": "file", "path": "app/util.py"}
			]}]}"#,
		)
		.unwrap();
		let mut t = ChangeFeedTracker::default();
		t.record(change("/abs/root/app/util.py", 1));
		t.record(change("app/main.py", 2));
		t.record(change("app/main.py", 3));
		t.record(change("elsewhere/main.pyc", 4));
		assert_eq!(t.changed_node_ids(&s, 5), vec!["app/main.py", "app/util.py"]);
	}
}
