//! Per-canvas interaction state around the renderer facade.
//!
//! Adds the pan/zoom transform, the current selection and the set of nodes
//! touched by recent changes. None of it survives a new snapshot except the
//! transform.

use std::collections::HashSet;
use std::sync::Arc;

use crate::drag::Point;
use crate::model::DirectoryStructure;
use crate::renderer::GraphRenderer;

use super::theme::Theme;

/// Extra pixels around a node that still count as a hit.
const HIT_SLOP: f64 = 4.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	/// Furthest the pointer got from the press; tells a click from a pan.
	pub travelled: f64,
}

/// Renderer plus everything the canvas needs between frames.
pub struct CanvasState {
	pub renderer: GraphRenderer,
	pub transform: ViewTransform,
	pub pan: PanState,
	/// Node currently under a drag gesture.
	pub dragged: Option<usize>,
	/// Whether the current node gesture moved the node at all.
	pub drag_moved: bool,
	selected: Option<usize>,
	highlighted: HashSet<usize>,
	changed: HashSet<usize>,
	pub width: f64,
	pub height: f64,
}

impl CanvasState {
	pub fn new(renderer: GraphRenderer, width: f64, height: f64) -> Self {
		Self {
			renderer,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			pan: PanState::default(),
			dragged: None,
			drag_moved: false,
			selected: None,
			highlighted: HashSet::new(),
			changed: HashSet::new(),
			width,
			height,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, p: Point) -> Point {
		Point::new(
			p.x * self.transform.k + self.transform.x,
			p.y * self.transform.k + self.transform.y,
		)
	}

	/// Front-most node under a screen point.
	pub fn node_at(&self, sx: f64, sy: f64, theme: &Theme) -> Option<usize> {
		let radius = (theme.directory_radius + HIT_SLOP) / self.transform.k.min(1.0);
		self.renderer
			.frame()
			.node_at(self.screen_to_graph(sx, sy), radius)
	}

	/// Screen position of a node's centre, if it is laid out.
	pub fn node_screen_position(&self, index: usize) -> Option<Point> {
		let frame = self.renderer.frame();
		let node = frame.position(index)?;
		Some(self.graph_to_screen(Point::new(node.x, node.y)))
	}

	pub fn selected(&self) -> Option<usize> {
		self.selected
	}

	/// Select a node; it and its neighbours get highlighted.
	pub fn select(&mut self, index: Option<usize>) {
		self.selected = index;
		self.highlighted.clear();
		let Some(index) = index else {
			return;
		};
		let structure = self.renderer.structure();
		let Some(node) = structure.nodes().get(index) else {
			self.selected = None;
			return;
		};
		self.highlighted.insert(index);
		for id in structure.neighbors(&node.id) {
			if let Some(i) = structure.nodes().iter().position(|n| n.id == id) {
				self.highlighted.insert(i);
			}
		}
	}

	pub fn is_highlighted(&self, index: usize) -> bool {
		self.highlighted.contains(&index)
	}

	pub fn has_selection(&self) -> bool {
		self.selected.is_some()
	}

	/// Mark the nodes with these ids as recently changed.
	pub fn set_changed(&mut self, ids: &[String]) {
		let structure = self.renderer.structure();
		self.changed = structure
			.nodes()
			.iter()
			.enumerate()
			.filter(|(_, n)| ids.contains(&n.id))
			.map(|(i, _)| i)
			.collect();
	}

	pub fn is_changed(&self, index: usize) -> bool {
		self.changed.contains(&index)
	}

	/// Show another snapshot. Indices change meaning, so selection and change
	/// marks are dropped.
	pub fn set_structure(&mut self, structure: Arc<DirectoryStructure>) {
		if Arc::ptr_eq(&structure, self.renderer.structure()) {
			return;
		}
		self.renderer.set_structure(structure);
		self.select(None);
		self.changed.clear();
		self.dragged = None;
	}

	/// Zoom by `factor` around the screen point `(x, y)`.
	pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f32) {
		self.renderer.tick(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
