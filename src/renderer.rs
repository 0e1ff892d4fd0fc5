//! Renderer facade: one configuration contract, two interchangeable layouts.
//!
//! The facade owns the snapshot handle and the active [`LayoutEngine`].
//! Switching between 2D and 3D swaps only the engine; the same
//! `Arc<DirectoryStructure>` keeps being used and nothing is re-normalized.

use std::fmt;
use std::sync::Arc;

use log::debug;
use serde::Deserialize;

use crate::drag::Point;
use crate::layout::{Frame, LayoutEngine, PlanarLayout, VolumetricLayout};
use crate::model::{DirectoryStructure, Node};

/// Planar (2D) or volumetric (3D) projection.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash)]
pub enum RenderMode {
	/// 2D force-directed layout.
	#[default]
	#[serde(rename = "2D", alias = "2d")]
	Planar,
	/// Depth-layered layout under an orbiting camera.
	#[serde(rename = "3D", alias = "3d")]
	Volumetric,
}

impl RenderMode {
	/// The other mode.
	pub fn toggled(self) -> Self {
		match self {
			RenderMode::Planar => RenderMode::Volumetric,
			RenderMode::Volumetric => RenderMode::Planar,
		}
	}
}

impl fmt::Display for RenderMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RenderMode::Planar => f.write_str("2D"),
			RenderMode::Volumetric => f.write_str("3D"),
		}
	}
}

/// Display settings shared by both layouts.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
	/// Node field shown as the label (`name`, `path`, `id` or `type`).
	pub node_label_field: String,
	/// Draw arrowheads on links.
	pub link_directional: bool,
	/// Camera distance from the layout centre. Ignored in 2D.
	pub camera_distance: f64,
	/// Draw node labels.
	pub show_labels: bool,
	/// Mode the view starts in.
	pub initial_mode: RenderMode,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			node_label_field: "name".to_string(),
			link_directional: true,
			camera_distance: 400.0,
			show_labels: true,
			initial_mode: RenderMode::Planar,
		}
	}
}

/// Builds the engine for a mode.
pub type EngineFactory = fn(RenderMode) -> Box<dyn LayoutEngine>;

/// The stock engines.
pub fn default_engine(mode: RenderMode) -> Box<dyn LayoutEngine> {
	match mode {
		RenderMode::Planar => Box::new(PlanarLayout::new()),
		RenderMode::Volumetric => Box::new(VolumetricLayout::new()),
	}
}

/// One snapshot, one active layout engine.
pub struct GraphRenderer {
	structure: Arc<DirectoryStructure>,
	mode: RenderMode,
	config: RenderConfig,
	engine: Box<dyn LayoutEngine>,
	factory: EngineFactory,
}

impl GraphRenderer {
	/// A renderer using the stock engines.
	pub fn new(structure: Arc<DirectoryStructure>, mode: RenderMode, config: RenderConfig) -> Self {
		Self::with_factory(structure, mode, config, default_engine)
	}

	/// A renderer whose engines come from `factory`.
	pub fn with_factory(
		structure: Arc<DirectoryStructure>,
		mode: RenderMode,
		config: RenderConfig,
		factory: EngineFactory,
	) -> Self {
		let mut engine = factory(mode);
		engine.load(&structure, &config);
		Self {
			structure,
			mode,
			config,
			engine,
			factory,
		}
	}

	/// The snapshot being shown.
	pub fn structure(&self) -> &Arc<DirectoryStructure> {
		&self.structure
	}

	/// The active mode.
	pub fn mode(&self) -> RenderMode {
		self.mode
	}

	/// Current settings.
	pub fn config(&self) -> &RenderConfig {
		&self.config
	}

	/// The active engine.
	pub fn engine(&self) -> &dyn LayoutEngine {
		self.engine.as_ref()
	}

	/// Swap the layout engine. The snapshot is handed to the new engine as is.
	pub fn set_mode(&mut self, mode: RenderMode) {
		if mode == self.mode {
			return;
		}
		let mut engine = (self.factory)(mode);
		engine.load(&self.structure, &self.config);
		self.engine = engine;
		self.mode = mode;
		debug!("dir-graph: switched to {mode} layout");
	}

	/// Switch 2D and 3D; returns the new mode.
	pub fn toggle_mode(&mut self) -> RenderMode {
		self.set_mode(self.mode.toggled());
		self.mode
	}

	/// Apply new settings without resetting positions.
	pub fn set_config(&mut self, config: RenderConfig) {
		self.engine.configure(&config);
		self.config = config;
	}

	/// Show a different snapshot. A pointer-identical snapshot is ignored so
	/// repeated pushes of the same data keep the current layout.
	pub fn set_structure(&mut self, structure: Arc<DirectoryStructure>) {
		if Arc::ptr_eq(&structure, &self.structure) {
			return;
		}
		self.engine.load(&structure, &self.config);
		self.structure = structure;
	}

	/// Advance the layout by `dt` seconds.
	pub fn tick(&mut self, dt: f32) {
		self.engine.tick(dt);
	}

	/// Project the current layout.
	pub fn frame(&self) -> Frame {
		self.engine.frame()
	}

	/// Node at a frame index.
	pub fn node(&self, index: usize) -> Option<&Node> {
		self.structure.nodes().get(index)
	}

	/// Label for a node according to `node_label_field`.
	pub fn label(&self, index: usize) -> Option<&str> {
		self.node(index).map(|n| n.field(&self.config.node_label_field))
	}

	/// Pin a node at `at`, in graph coordinates.
	pub fn move_node(&mut self, index: usize, at: Point) {
		self.engine.move_node(index, at);
	}

	/// Unpin a node.
	pub fn release_node(&mut self, index: usize) {
		self.engine.release_node(index);
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::normalize::parse_payload;

	thread_local! {
		static BUILT: Cell<usize> = const { Cell::new(0) };
	}

	fn counting_factory(mode: RenderMode) -> Box<dyn LayoutEngine> {
		BUILT.with(|b| b.set(b.get() + 1));
		default_engine(mode)
	}

	fn snapshot() -> Arc<DirectoryStructure> {
		Arc::new(
			parse_payload(
				r#"{"nodes": [
					{"id": 1, "name": "root", "type": "directory", "path": "."},
					{"id": 2, "name": "index.js", "type": "file", "path": "./index.js"}
				], "links": [{"source": 1, "target": 2}]}"#,
			)
			.unwrap(),
		)
	}

	#[test]
	fn toggle_swaps_engine_not_data() {
		let data = snapshot();
		let mut r = GraphRenderer::new(data.clone(), RenderMode::Planar, RenderConfig::default());
		assert_eq!(r.engine().mode(), RenderMode::Planar);
		assert_eq!(r.toggle_mode(), RenderMode::Volumetric);
		assert_eq!(r.engine().mode(), RenderMode::Volumetric);
		assert_eq!(r.toggle_mode(), RenderMode::Planar);
		assert!(Arc::ptr_eq(r.structure(), &data));
	}

	#[test]
	fn same_mode_keeps_engine() {
		BUILT.with(|b| b.set(0));
		let mut r = GraphRenderer::with_factory(
			snapshot(),
			RenderMode::Volumetric,
			RenderConfig::default(),
			counting_factory,
		);
		r.set_mode(RenderMode::Volumetric);
		assert_eq!(BUILT.with(Cell::get), 1);
		r.set_mode(RenderMode::Planar);
		assert_eq!(BUILT.with(Cell::get), 2);
	}

	#[test]
	fn label_field_is_configurable() {
		let mut r = GraphRenderer::new(snapshot(), RenderMode::Planar, RenderConfig::default());
		assert_eq!(r.label(1), Some("index.js"));
		r.set_config(RenderConfig {
			node_label_field: "path".into(),
			..RenderConfig::default()
		});
		assert_eq!(r.label(1), Some("./index.js"));
		assert_eq!(r.label(9), None);
	}

	#[test]
	fn mode_names_parse() {
		let m: RenderMode = serde_json::from_str("\"3D\"").unwrap();
		assert_eq!(m, RenderMode::Volumetric);
		assert_eq!(RenderMode::Planar.to_string(), "2D");
	}
}
