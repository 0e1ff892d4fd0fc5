//! Application configuration.
//!
//! Read from an optional `<script id="graph-config" type="application/json">`
//! element next to the graph payload. Every field has a default, so an empty
//! object (or no element at all) is a valid configuration.

use serde::Deserialize;

use crate::changes::TrackerConfig;
use crate::drag::DragConfig;
use crate::renderer::RenderConfig;

/// Everything the page can configure.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
	/// Canvas settings.
	pub render: RenderConfig,
	/// Panel drag settings.
	pub drag: DragConfig,
	/// Change overlay settings.
	pub changes: TrackerConfig,
	/// Panels to show, by registry name, in order.
	pub panels: Vec<String>,
}

impl AppConfig {
	/// Parse a configuration object. Missing fields take their defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Configured panels, or the graph and change list when none are named.
	pub fn panel_names(&self) -> Vec<String> {
		if self.panels.is_empty() {
			vec!["directory-graph".to_string(), "recent-changes".to_string()]
		} else {
			self.panels.clone()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::renderer::RenderMode;

	#[test]
	fn empty_object_is_all_defaults() {
		let c = AppConfig::from_json("{}").unwrap();
		assert_eq!(c, AppConfig::default());
		assert_eq!(c.render.camera_distance, 400.0);
		assert_eq!(c.drag.threshold, 5.0);
		assert_eq!(c.changes.display_limit, 5);
		assert_eq!(c.panel_names(), vec!["directory-graph", "recent-changes"]);
	}

	#[test]
	fn partial_sections_fill_in() {
		let c = AppConfig::from_json(
			r#"{
				"render": {"nodeLabelField": "path", "cameraDistance": 250, "initialMode": "3D"},
				"drag": {"threshold": 8, "bounds": {"minX": 0, "minY": 0, "maxX": 1200, "maxY": 800}},
				"changes": {"displayLimit": 10, "stripPrefix": "/babel_generated/"}
			}"#,
		)
		.unwrap();
		assert_eq!(c.render.node_label_field, "path");
		assert!(c.render.link_directional);
		assert_eq!(c.render.initial_mode, RenderMode::Volumetric);
		assert_eq!(c.drag.threshold, 8.0);
		assert_eq!(c.drag.bounds.unwrap().max_x, 1200.0);
		assert_eq!(c.changes.display_limit, 10);
		assert_eq!(c.changes.retention, None);
		assert_eq!(c.changes.strip_prefix.as_deref(), Some("/babel_generated/"));
	}

	#[test]
	fn wrong_types_are_rejected() {
		assert!(AppConfig::from_json(r#"{"drag": {"threshold": "far"}}"#).is_err());
	}
}
