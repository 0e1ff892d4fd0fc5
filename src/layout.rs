//! Force-directed layout engines behind the renderer facade.
//!
//! The physics itself is the `force_graph` crate's. Both engines run the same
//! planar simulation; the volumetric one lifts every node onto a layer by its
//! directory depth and projects the result through a slowly orbiting
//! perspective camera.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::drag::Point;
use crate::model::DirectoryStructure;
use crate::renderer::{RenderConfig, RenderMode};

/// Vertical distance between directory levels in the 3D view.
const LAYER_SPACING: f64 = 60.0;
/// Camera orbit speed in radians per second.
const ORBIT_SPEED: f64 = 0.15;
/// Nodes closer to the camera than this are not drawn.
const NEAR_PLANE: f64 = 1.0;

/// One node as it should be drawn this frame, in graph coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedNode {
	/// Index into `DirectoryStructure::nodes()`.
	pub index: usize,
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Perspective size factor (1.0 in 2D).
	pub scale: f64,
	/// Distance from the camera; larger is further away.
	pub depth: f64,
}

/// Everything a painter needs for one frame. Nodes are sorted back to front.
#[derive(Clone, Debug, Default)]
pub struct Frame {
	nodes: Vec<ProjectedNode>,
	edges: Vec<(usize, usize)>,
	/// Snapshot index to position in `nodes`.
	slots: Vec<Option<usize>>,
}

impl Frame {
	/// Builds a frame and its index lookup. `nodes` must already be in
	/// drawing order.
	pub fn new(nodes: Vec<ProjectedNode>, edges: Vec<(usize, usize)>) -> Self {
		let len = nodes.iter().map(|n| n.index + 1).max().unwrap_or(0);
		let mut slots = vec![None; len];
		for (slot, node) in nodes.iter().enumerate() {
			slots[node.index] = Some(slot);
		}
		Self { nodes, edges, slots }
	}

	/// Nodes in drawing order.
	pub fn nodes(&self) -> &[ProjectedNode] {
		&self.nodes
	}

	/// Links as index pairs into `DirectoryStructure::nodes()`.
	pub fn edges(&self) -> &[(usize, usize)] {
		&self.edges
	}

	/// Where node `index` is drawn, if it is drawn at all.
	pub fn position(&self, index: usize) -> Option<&ProjectedNode> {
		let slot = (*self.slots.get(index)?)?;
		self.nodes.get(slot)
	}

	/// Front-most node within `radius` (scaled by perspective) of `p`.
	pub fn node_at(&self, p: Point, radius: f64) -> Option<usize> {
		self.nodes
			.iter()
			.rev()
			.find(|n| Point::new(n.x, n.y).distance(p) < radius * n.scale)
			.map(|n| n.index)
	}
}

/// The strategy the facade delegates to.
pub trait LayoutEngine {
	/// Which of the two views this engine draws.
	fn mode(&self) -> RenderMode;
	/// Lay out a snapshot from scratch.
	fn load(&mut self, structure: &DirectoryStructure, config: &RenderConfig);
	/// Apply a changed configuration without resetting positions.
	fn configure(&mut self, config: &RenderConfig);
	/// Advance the simulation by `dt` seconds.
	fn tick(&mut self, dt: f32);
	/// Project the current positions.
	fn frame(&self) -> Frame;
	/// Pin a node so that it is drawn at `at`.
	fn move_node(&mut self, index: usize, at: Point);
	/// Hand a pinned node back to the simulation.
	fn release_node(&mut self, index: usize);
}

/// Planar simulation shared by both engines. Node user data is the index
/// into the snapshot's node list.
struct Simulation {
	graph: ForceGraph<usize, ()>,
	indices: Vec<DefaultNodeIdx>,
	edges: Vec<(usize, usize)>,
}

impl Simulation {
	fn empty() -> Self {
		Self {
			graph: ForceGraph::new(Self::parameters()),
			indices: Vec::new(),
			edges: Vec::new(),
		}
	}

	fn parameters() -> SimulationParameters {
		SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}

	fn new(structure: &DirectoryStructure) -> Self {
		let mut graph = ForceGraph::new(Self::parameters());
		let count = structure.nodes().len().max(1);
		let mut by_id = HashMap::with_capacity(count);
		let mut indices = Vec::with_capacity(count);

		for (i, node) in structure.nodes().iter().enumerate() {
			// Start on a circle so the simulation has something to push apart.
			let angle = (i as f64) * 2.0 * PI / count as f64;
			let idx = graph.add_node(NodeData {
				x: (100.0 * angle.cos()) as f32,
				y: (100.0 * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: i,
			});
			by_id.insert(node.id.as_str(), i);
			indices.push(idx);
		}

		let mut edges = Vec::with_capacity(structure.links().len());
		for link in structure.links() {
			// Snapshots are integrity-checked, so both lookups succeed.
			if let (Some(&s), Some(&t)) = (by_id.get(link.source.as_str()), by_id.get(link.target.as_str())) {
				graph.add_edge(indices[s], indices[t], EdgeData::default());
				edges.push((s, t));
			}
		}

		Self {
			graph,
			indices,
			edges,
		}
	}

	fn positions(&self) -> Vec<(usize, f64, f64)> {
		let mut out = Vec::with_capacity(self.indices.len());
		self.graph.visit_nodes(|node| {
			out.push((node.data.user_data, node.x() as f64, node.y() as f64));
		});
		out
	}

	fn set_position(&mut self, index: usize, x: f64, y: f64, anchor: bool) {
		let Some(&target) = self.indices.get(index) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == target {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = anchor;
			}
		});
	}

	fn release(&mut self, index: usize) {
		let Some(&target) = self.indices.get(index) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == target {
				node.data.is_anchor = false;
			}
		});
	}
}

/// Flat force-directed layout.
pub struct PlanarLayout {
	sim: Simulation,
}

impl PlanarLayout {
	/// An engine with nothing loaded.
	pub fn new() -> Self {
		Self {
			sim: Simulation::empty(),
		}
	}
}

impl Default for PlanarLayout {
	fn default() -> Self {
		Self::new()
	}
}

impl LayoutEngine for PlanarLayout {
	fn mode(&self) -> RenderMode {
		RenderMode::Planar
	}

	fn load(&mut self, structure: &DirectoryStructure, _config: &RenderConfig) {
		self.sim = Simulation::new(structure);
	}

	fn configure(&mut self, _config: &RenderConfig) {}

	fn tick(&mut self, dt: f32) {
		self.sim.graph.update(dt);
	}

	fn frame(&self) -> Frame {
		let mut nodes: Vec<ProjectedNode> = self
			.sim
			.positions()
			.into_iter()
			.map(|(index, x, y)| ProjectedNode {
				index,
				x,
				y,
				scale: 1.0,
				depth: 0.0,
			})
			.collect();
		nodes.sort_by_key(|n| n.index);
		Frame::new(nodes, self.sim.edges.clone())
	}

	fn move_node(&mut self, index: usize, at: Point) {
		self.sim.set_position(index, at.x, at.y, true);
	}

	fn release_node(&mut self, index: usize) {
		self.sim.release(index);
	}
}

/// Layered force-directed layout seen through a perspective camera.
pub struct VolumetricLayout {
	sim: Simulation,
	/// Per-node height, indexed like the snapshot's nodes.
	heights: Vec<f64>,
	camera_distance: f64,
	yaw: f64,
}

impl VolumetricLayout {
	/// An engine with nothing loaded and the default camera.
	pub fn new() -> Self {
		Self {
			sim: Simulation::empty(),
			heights: Vec::new(),
			camera_distance: RenderConfig::default().camera_distance,
			yaw: 0.0,
		}
	}

	/// Distance from the camera to the orbit axis.
	pub fn camera_distance(&self) -> f64 {
		self.camera_distance
	}

	/// Rotate around the vertical axis and project. Returns `(x, y, scale, depth)`,
	/// or `None` for points at or behind the near plane.
	fn project(&self, x: f64, y: f64, h: f64) -> Option<(f64, f64, f64, f64)> {
		let (sin, cos) = self.yaw.sin_cos();
		// Layout plane is x/z; directory depth becomes screen height.
		let rx = x * cos - y * sin;
		let rz = x * sin + y * cos;
		let depth = self.camera_distance + rz;
		if depth <= NEAR_PLANE {
			return None;
		}
		let scale = self.camera_distance / depth;
		Some((rx * scale, h * scale, scale, depth))
	}
}

impl Default for VolumetricLayout {
	fn default() -> Self {
		Self::new()
	}
}

impl LayoutEngine for VolumetricLayout {
	fn mode(&self) -> RenderMode {
		RenderMode::Volumetric
	}

	fn load(&mut self, structure: &DirectoryStructure, config: &RenderConfig) {
		self.sim = Simulation::new(structure);
		let depths = structure.depths();
		let deepest = depths.values().copied().max().unwrap_or(0) as f64;
		self.heights = structure
			.nodes()
			.iter()
			.map(|n| {
				let d = depths.get(n.id.as_str()).copied().unwrap_or(0) as f64;
				(d - deepest / 2.0) * LAYER_SPACING
			})
			.collect();
		self.configure(config);
	}

	fn configure(&mut self, config: &RenderConfig) {
		self.camera_distance = config.camera_distance.max(1.0);
	}

	fn tick(&mut self, dt: f32) {
		self.sim.graph.update(dt);
		self.yaw = (self.yaw + ORBIT_SPEED * dt as f64) % (2.0 * PI);
	}

	fn frame(&self) -> Frame {
		let mut nodes: Vec<ProjectedNode> = self
			.sim
			.positions()
			.into_iter()
			.filter_map(|(index, x, y)| {
				let h = self.heights.get(index).copied().unwrap_or(0.0);
				let (px, py, scale, depth) = self.project(x, y, h)?;
				Some(ProjectedNode {
					index,
					x: px,
					y: py,
					scale,
					depth,
				})
			})
			.collect();
		nodes.sort_by(|a, b| b.depth.total_cmp(&a.depth));
		Frame::new(nodes, self.sim.edges.clone())
	}

	/// Dragging in 3D moves the node within its layer: the screen x is
	/// un-rotated back into the layout plane, keeping the node's depth.
	fn move_node(&mut self, index: usize, at: Point) {
		let Some(current) = self.frame().position(index).copied() else {
			return;
		};
		let (sin, cos) = self.yaw.sin_cos();
		let rx = at.x / current.scale;
		let rz = current.depth - self.camera_distance;
		let x = rx * cos + rz * sin;
		let y = -rx * sin + rz * cos;
		self.sim.set_position(index, x, y, true);
		if let Some(h) = self.heights.get_mut(index) {
			*h = at.y / current.scale;
		}
	}

	fn release_node(&mut self, index: usize) {
		self.sim.release(index);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::normalize::parse_payload;

	fn tree() -> DirectoryStructure {
		parse_payload(
			r#"{"nodes": [
				{"id": 1, "name": "root", "type": "directory"},
				{"id": 2, "name": "src", "type": "directory"},
				{"id": 3, "name": "main.rs", "type": "file"}
			], "links": [{"source": 1, "target": 2}, {"source": 2, "target": 3}]}"#,
		)
		.unwrap()
	}

	#[test]
	fn planar_frame_covers_every_node() {
		let mut engine = PlanarLayout::new();
		engine.load(&tree(), &RenderConfig::default());
		engine.tick(0.016);
		let frame = engine.frame();
		assert_eq!(frame.nodes().len(), 3);
		assert_eq!(frame.edges(), &[(0, 1), (1, 2)]);
		assert!(frame.nodes().iter().all(|n| n.scale == 1.0));
	}

	#[test]
	fn planar_move_pins_node() {
		let mut engine = PlanarLayout::new();
		engine.load(&tree(), &RenderConfig::default());
		engine.move_node(2, Point::new(42.0, -7.0));
		let p = *engine.frame().position(2).unwrap();
		assert_eq!((p.x, p.y), (42.0, -7.0));
		assert_eq!(engine.frame().node_at(Point::new(43.0, -7.0), 5.0), Some(2));
	}

	#[test]
	fn volumetric_layers_by_depth() {
		let mut engine = VolumetricLayout::new();
		engine.load(&tree(), &RenderConfig::default());
		assert_eq!(engine.heights, vec![-LAYER_SPACING, 0.0, LAYER_SPACING]);
		let frame = engine.frame();
		assert_eq!(frame.nodes().len(), 3);
		assert!(frame.nodes().windows(2).all(|w| w[0].depth >= w[1].depth));
	}

	#[test]
	fn volumetric_camera_follows_config() {
		let mut engine = VolumetricLayout::new();
		let config = RenderConfig {
			camera_distance: 900.0,
			..RenderConfig::default()
		};
		engine.load(&tree(), &config);
		assert_eq!(engine.camera_distance(), 900.0);
		engine.configure(&RenderConfig {
			camera_distance: -3.0,
			..config
		});
		assert_eq!(engine.camera_distance(), 1.0);
	}

	#[test]
	fn empty_snapshot_is_fine() {
		let mut engine = VolumetricLayout::new();
		engine.load(&DirectoryStructure::default(), &RenderConfig::default());
		engine.tick(0.016);
		assert!(engine.frame().nodes().is_empty());
	}

	#[test]
	fn position_follows_drawing_order() {
		let mut engine = VolumetricLayout::new();
		engine.load(&tree(), &RenderConfig::default());
		engine.sim.set_position(0, 0.0, 200.0, true);
		engine.sim.set_position(1, 0.0, -200.0, true);
		engine.sim.set_position(2, 0.0, 0.0, true);
		let frame = engine.frame();
		let order: Vec<_> = frame.nodes().iter().map(|n| n.index).collect();
		assert_eq!(order, vec![0, 2, 1]);
		for index in 0..3 {
			assert_eq!(frame.position(index).map(|n| n.index), Some(index));
		}
		assert_eq!(frame.position(3), None);
	}

	#[test]
	fn nodes_behind_the_camera_are_culled() {
		let mut engine = VolumetricLayout::new();
		engine.load(&tree(), &RenderConfig::default());
		engine.sim.set_position(0, 0.0, -1000.0, true);
		engine.sim.set_position(1, 300.0, 0.0, true);
		engine.sim.set_position(2, -300.0, 0.0, true);
		let frame = engine.frame();

		assert_eq!(frame.position(0), None);
		assert_eq!(frame.nodes().len(), 2);
		assert!(frame.nodes().iter().all(|n| n.scale <= 1.0 + f64::EPSILON));
		let front = *frame.position(1).unwrap();
		assert_eq!(frame.node_at(Point::new(front.x, front.y), 8.0), Some(1));
		// Edges into a culled node are still listed; painters skip them.
		assert!(frame.edges().contains(&(0, 1)));
	}

	#[test]
	fn empty_frame_has_no_positions() {
		let frame = Frame::default();
		assert_eq!(frame.position(0), None);
		assert_eq!(frame.node_at(Point::new(0.0, 0.0), 10.0), None);
	}
}
