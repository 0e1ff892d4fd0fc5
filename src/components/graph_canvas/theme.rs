//! Colours for the directory graph.
//!
//! Directories are coloured by well-known names (`frontend`, `tests`, ...),
//! files by extension. Everything else falls back to a neutral tone.

use crate::model::{Node, NodeKind};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque colour.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Colour with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same colour, different alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

const DIRECTORY_DEFAULT: Color = Color::rgba(0, 150, 255, 0.8);
const FILE_DEFAULT: Color = Color::rgba(200, 200, 200, 0.8);

fn directory_color(name: &str) -> Color {
	match name {
		"exe_history" => Color::rgba(255, 99, 71, 0.8),
		"frontend" => Color::rgba(255, 165, 0, 0.8),
		"backend" => Color::rgba(230, 130, 255, 0.8),
		"middleware" => Color::rgba(0, 255, 127, 0.8),
		"docs" => Color::rgba(138, 43, 226, 0.8),
		"tests" => Color::rgba(255, 20, 147, 0.8),
		"resources" => Color::rgba(0, 191, 255, 0.8),
		"database" => Color::rgba(255, 215, 0, 0.8),
		"logs" => Color::rgba(169, 169, 169, 0.8),
		"locales" => Color::rgba(0, 250, 154, 0.8),
		"meta" => Color::rgb(255, 215, 0),
		_ => DIRECTORY_DEFAULT,
	}
}

fn file_color(name: &str) -> Color {
	let lower = name.to_ascii_lowercase();
	// `Dockerfile` has no extension; the whole name is the key then.
	let ext = lower.rsplit_once('.').map_or(lower.as_str(), |(_, ext)| ext);
	match ext {
		"js" | "jsx" => Color::rgba(255, 165, 0, 0.8),
		"ts" => Color::rgba(255, 140, 0, 0.8),
		"tsx" => Color::rgba(255, 69, 0, 0.8),
		"css" | "scss" => Color::rgba(0, 220, 255, 0.8),
		"html" => Color::rgba(255, 100, 0, 0.8),
		"json" => Color::rgba(150, 150, 150, 0.8),
		"md" => Color::rgba(100, 255, 100, 0.8),
		"py" => Color::rgba(230, 130, 255, 0.8),
		"rb" => Color::rgba(255, 45, 85, 0.8),
		"php" => Color::rgba(255, 69, 58, 0.8),
		"java" => Color::rgba(255, 105, 97, 0.8),
		"go" => Color::rgba(255, 55, 95, 0.8),
		"rs" => Color::rgba(255, 85, 85, 0.8),
		"sql" => Color::rgba(255, 99, 71, 0.8),
		"sh" | "bash" => Color::rgba(255, 69, 0, 0.8),
		"yml" | "yaml" => Color::rgba(203, 23, 30, 0.8),
		"dockerfile" => Color::rgba(0, 128, 0, 0.8),
		_ => FILE_DEFAULT,
	}
}

/// Fill colour for a node.
pub fn node_color(node: &Node) -> Color {
	match node.kind {
		NodeKind::Directory => directory_color(&node.name),
		NodeKind::File => file_color(&node.name),
	}
}

/// Canvas-wide colours and sizes.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas fill.
	pub background: Color,
	/// Link stroke.
	pub edge: Color,
	/// Ring around nodes touched by a recent change.
	pub changed_ring: Color,
	/// Ring around the selected node and its neighbours.
	pub selected_ring: Color,
	/// Label text.
	pub label: Color,
	/// Node radius for directories, in graph units.
	pub directory_radius: f64,
	/// Node radius for files.
	pub file_radius: f64,
	/// CSS font for labels.
	pub label_font: &'static str,
}

impl Theme {
	/// Radius for a node of `kind`.
	pub fn radius(&self, kind: NodeKind) -> f64 {
		match kind {
			NodeKind::Directory => self.directory_radius,
			NodeKind::File => self.file_radius,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(30, 30, 30),
			edge: Color::rgba(255, 255, 255, 0.25),
			changed_ring: Color::rgba(255, 215, 0, 0.9),
			selected_ring: Color::rgba(0, 255, 255, 0.8),
			label: Color::rgba(255, 255, 255, 0.9),
			directory_radius: 6.0,
			file_radius: 4.0,
			label_font: "12px sans-serif",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(name: &str, kind: NodeKind) -> Node {
		Node {
			id: name.into(),
			name: name.into(),
			kind,
			path: None,
		}
	}

	#[test]
	fn files_by_extension() {
		assert_eq!(node_color(&node("App.TSX", NodeKind::File)), Color::rgba(255, 69, 0, 0.8));
		assert_eq!(node_color(&node("Dockerfile", NodeKind::File)), Color::rgba(0, 128, 0, 0.8));
		assert_eq!(node_color(&node("notes.txt", NodeKind::File)), FILE_DEFAULT);
	}

	#[test]
	fn directories_by_name() {
		assert_eq!(node_color(&node("meta", NodeKind::Directory)), Color::rgb(255, 215, 0));
		assert_eq!(node_color(&node("src", NodeKind::Directory)), DIRECTORY_DEFAULT);
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}
}
