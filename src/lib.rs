//! dir-graph: interactive directory-structure graph with a live change feed.
//!
//! This crate provides a WASM-based view of a watched directory tree. Backend
//! payloads are normalized into immutable snapshots, shown as a 2D or 3D
//! graph, and overlaid with the most recent file changes reported by the
//! watcher.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod changes;
pub mod components;
pub mod config;
pub mod drag;
pub mod error;
pub mod feed;
pub mod layout;
pub mod listener;
pub mod model;
pub mod normalize;
pub mod registry;
pub mod renderer;

pub use components::draggable::DraggablePanel;
pub use components::graph_canvas::DirectoryGraphCanvas;
pub use components::graph_view::{GraphView, LoadState};
pub use components::recent_changes::RecentChanges;

use changes::ChangeFeedTracker;
use config::AppConfig;
use registry::{Lookup, PanelRegistry};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("dir-graph: logging initialized");
}

fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the snapshot from a script element with id="graph-data".
/// Without one the view stays loading until a snapshot event arrives.
fn load_structure() -> LoadState {
	match script_text("graph-data") {
		Some(json) => LoadState::from_payload(&json),
		None => {
			info!("dir-graph: no inline graph data, waiting for {}", feed::SNAPSHOT_EVENT);
			LoadState::Loading
		}
	}
}

/// Load configuration from a script element with id="graph-config".
fn load_config() -> AppConfig {
	let Some(json) = script_text("graph-config") else {
		return AppConfig::default();
	};
	AppConfig::from_json(&json).unwrap_or_else(|e| {
		warn!("dir-graph: invalid graph config, using defaults: {e}");
		AppConfig::default()
	})
}

/// Keep `value` alive until the current reactive owner is cleaned up.
fn hold_for_owner<T: 'static>(value: T) {
	let _ = StoredValue::new_local(value);
}

type PanelView = Box<dyn Fn() -> AnyView>;

fn panels(
	config: &AppConfig,
	load: RwSignal<LoadState>,
	changed: Signal<Vec<String>>,
	tracker: RwSignal<ChangeFeedTracker>,
) -> PanelRegistry<PanelView> {
	let mut registry = PanelRegistry::new();
	let (render, drag) = (config.render.clone(), config.drag.clone());
	registry.register("directory-graph", move || -> PanelView {
		let (render, drag) = (render.clone(), drag.clone());
		Box::new(move || {
			view! { <GraphView load=load changed=changed render=render.clone() drag=drag.clone() /> }
				.into_any()
		})
	});
	registry.register("recent-changes", move || -> PanelView {
		Box::new(move || view! { <RecentChanges tracker=tracker /> }.into_any())
	});
	registry
}

/// Main application component.
/// Loads the snapshot and configuration from the DOM, subscribes to the change
/// feed and lays out the configured panels.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let load = RwSignal::new(load_structure());
	let tracker = RwSignal::new(ChangeFeedTracker::new(config.changes.clone()));
	let changed = Signal::derive(move || {
		let Some(structure) = load.with(|l| l.structure().cloned()) else {
			return Vec::new();
		};
		tracker.with(|t| t.changed_node_ids(&structure, t.config().display_limit))
	});

	// Both subscriptions detach when the app is unmounted.
	hold_for_owner(feed::subscribe(move |message| {
		tracker.update(|t| {
			let recorded = t.ingest_message(&message);
			debug!("dir-graph: recorded {recorded} change(s)");
		});
	}));
	hold_for_owner(feed::subscribe_snapshots(move |payload| {
		load.set(LoadState::from_payload(&payload))
	}));

	let registry = panels(&config, load, changed, tracker);
	let views = config
		.panel_names()
		.into_iter()
		.map(|name| match registry.resolve(&name) {
			Lookup::Found(render) => render(),
			Lookup::NotFound(name) => {
				warn!("dir-graph: no panel named {name:?}");
				view! { <div class="panel-missing" role="alert">{format!("Unknown panel \"{name}\"")}</div> }
					.into_any()
			}
		})
		.collect::<Vec<_>>();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Directory Structure" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			{views}
			<div class="graph-overlay">
				<h1>"Directory Structure"</h1>
				<p class="subtitle">
					"Drag nodes to pin them, double-click to release. Scroll to zoom. Drag background to pan."
				</p>
			</div>
		</div>
	}
}
