//! End-to-end behaviour of the core pipeline: payload in, snapshot, changes
//! and drags out.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use dir_graph::changes::{ChangeFeedTracker, TrackerConfig};
use dir_graph::drag::{DragConfig, DragController, Point};
use dir_graph::error::{Endpoint, PayloadError};
use dir_graph::model::{ChangeKind, FileChange, NodeKind};
use dir_graph::normalize::parse_payload;
use dir_graph::renderer::{GraphRenderer, RenderConfig, RenderMode};

#[test]
fn numeric_ids_become_strings() {
	let s = parse_payload(
		r#"{"nodes": [
			{"id": 1, "name": "root", "type": "directory"},
			{"id": 2, "name": "index.js", "type": "file"}
		], "links": [{"source": 1, "target": 2}]}"#,
	)
	.unwrap();

	let ids: Vec<_> = s.nodes().iter().map(|n| n.id.as_str()).collect();
	assert_eq!(ids, vec!["1", "2"]);
	assert_eq!(s.nodes()[0].kind, NodeKind::Directory);
	assert_eq!(s.nodes()[1].name, "index.js");
	assert_eq!(s.links().len(), 1);
	assert_eq!(s.links()[0].source, "1");
	assert_eq!(s.links()[0].target, "2");
}

#[test]
fn mixed_id_types_name_the_same_node() {
	let s = parse_payload(
		r#"{"nodes": [
			{"id": "1", "name": "root", "type": "directory"},
			{"id": 2.0, "name": "a.txt", "type": "file"}
		], "links": [{"source": 1, "target": "2"}]}"#,
	)
	.unwrap();
	assert_eq!(s.links()[0].source, s.nodes()[0].id);
	assert_eq!(s.links()[0].target, s.nodes()[1].id);
}

#[test]
fn dangling_link_fails_the_whole_snapshot() {
	let err = parse_payload(
		r#"{"nodes": [{"id": 1, "name": "root", "type": "directory"}],
			"links": [{"source": 1, "target": 9}]}"#,
	)
	.unwrap_err();
	match err {
		PayloadError::Integrity(e) => {
			assert_eq!(e.index, 0);
			assert_eq!(e.target_id, "9");
			assert_eq!(e.endpoint, Endpoint::Target);
		}
		other => panic!("expected an integrity error, got {other:?}"),
	}
}

#[test]
fn directory_tree_is_flattened_parent_first() {
	let s = parse_payload(
		r#"{"structure": [
			{"name": "frontend", "type": "folder", "path": "frontend", "children": [
				{"name": "app.js", "type": "file", "path": "frontend/app.js"}
			]},
			{"name": "README.md", "type": "file", "path": "README.md"}
		]}"#,
	)
	.unwrap();
	let ids: Vec<_> = s.nodes().iter().map(|n| n.id.as_str()).collect();
	assert_eq!(ids, vec!["frontend", "frontend/app.js", "README.md"]);
	assert_eq!(s.links().len(), 1);
	assert_eq!(s.links()[0].source, "frontend");
}

#[test]
fn newest_five_changes_in_arrival_order() {
	let mut tracker = ChangeFeedTracker::default();
	for i in 1..=6 {
		tracker.record(FileChange::new(
			ChangeKind::Modify,
			format!("E{i}"),
			Utc.timestamp_opt(i, 0).unwrap(),
		));
	}
	let paths: Vec<_> = tracker
		.recent_changes(5)
		.iter()
		.map(|c| c.path.as_str())
		.collect();
	assert_eq!(paths, vec!["E6", "E5", "E4", "E3", "E2"]);
	// Nothing is evicted by default.
	assert_eq!(tracker.len(), 6);
}

#[test]
fn feed_batches_mark_nodes_as_changed() {
	let structure = parse_payload(
		r#"{"structure": [
			{"name": "backend", "type": "folder", "path": "backend", "children": [
				{"name": "app.py", "type": "file", "path": "backend/app.py"}
			]}
		]}"#,
	)
	.unwrap();
	let mut tracker = ChangeFeedTracker::new(TrackerConfig {
		strip_prefix: Some("/babel_generated/".into()),
		..TrackerConfig::default()
	});
	let recorded = tracker.ingest_message(
		r#"{"changes": [
			{"type": "modified", "path": "/srv/babel_generated/backend/app.py"},
			{"path": "no-type.txt"},
			{"type": "created", "path": "backend/new.py"}
		]}"#,
	);
	assert_eq!(recorded, 2);
	assert_eq!(tracker.dropped(), 1);
	assert_eq!(tracker.recent()[0].kind, ChangeKind::Add);
	assert_eq!(tracker.changed_node_ids(&structure, 5), vec!["backend/app.py"]);
}

fn recorder() -> (Rc<RefCell<Vec<Point>>>, impl FnMut(Point)) {
	let out = Rc::new(RefCell::new(Vec::new()));
	let sink = out.clone();
	(out, move |p| sink.borrow_mut().push(p))
}

#[test]
fn drag_threshold_separates_jitter_from_drags() {
	let (out, set) = recorder();
	let mut drag = DragController::new(DragConfig::default(), set);
	let press = Point::new(200.0, 150.0);
	let element = Point::new(180.0, 140.0);
	drag.pointer_down(press, Some(element)).unwrap();

	assert_eq!(drag.pointer_move(Point::new(203.0, 150.0)), None);
	assert!(out.borrow().is_empty());

	let pointer = Point::new(210.0, 150.0);
	drag.pointer_move(pointer);
	assert_eq!(*out.borrow(), vec![pointer - (press - element)]);
	assert_eq!(out.borrow()[0], Point::new(190.0, 140.0));
}

#[test]
fn click_without_drag_releases_cleanly() {
	let (out, set) = recorder();
	let mut drag = DragController::new(DragConfig::default(), set);
	drag.pointer_down(Point::new(1.0, 1.0), Some(Point::new(0.0, 0.0)))
		.unwrap();
	assert!(drag.is_listening());
	drag.pointer_up();
	assert!(!drag.is_dragging());
	assert!(!drag.is_listening());
	assert!(out.borrow().is_empty());
	// A second release is a no-op.
	drag.pointer_up();
	assert!(!drag.is_dragging());
}

#[test]
fn detached_controller_ignores_everything() {
	let (out, set) = recorder();
	let mut drag = DragController::new(DragConfig::default(), set);
	drag.pointer_down(Point::new(0.0, 0.0), Some(Point::new(0.0, 0.0)))
		.unwrap();
	drag.detach();
	assert!(drag.is_detached());
	assert!(!drag.is_listening());
	assert_eq!(drag.pointer_move(Point::new(100.0, 100.0)), None);
	assert!(drag.pointer_down(Point::new(0.0, 0.0), Some(Point::new(0.0, 0.0))).is_err());
	assert!(out.borrow().is_empty());
}

#[test]
fn mode_round_trip_keeps_the_same_snapshot() {
	let structure = Arc::new(
		parse_payload(
			r#"{"nodes": [
				{"id": 1, "name": "root", "type": "directory"},
				{"id": 2, "name": "index.js", "type": "file"}
			], "links": [{"source": 1, "target": 2}]}"#,
		)
		.unwrap(),
	);
	let mut renderer = GraphRenderer::new(structure.clone(), RenderMode::Planar, RenderConfig::default());

	assert_eq!(renderer.toggle_mode(), RenderMode::Volumetric);
	assert!(Arc::ptr_eq(renderer.structure(), &structure));
	assert_eq!(renderer.frame().nodes().len(), 2);

	assert_eq!(renderer.toggle_mode(), RenderMode::Planar);
	assert!(Arc::ptr_eq(renderer.structure(), &structure));
	assert_eq!(Arc::strong_count(&structure), 2);
}
