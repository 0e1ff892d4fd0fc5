//! The directory graph panel: toolbar, canvas and node details.
//!
//! Load state (is there a snapshot yet, did it fail) is kept apart from view
//! state (mode, labels, search, selection), so neither can clobber the other.

use std::sync::Arc;

use leptos::prelude::*;
use log::{error, info};

use super::draggable::DraggablePanel;
use super::graph_canvas::DirectoryGraphCanvas;
use crate::drag::DragConfig;
use crate::model::{DirectoryStructure, NodeKind};
use crate::normalize::parse_payload;
use crate::renderer::{RenderConfig, RenderMode};

/// Where the snapshot is in its life.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
	/// Nothing has arrived yet.
	Loading,
	/// A normalized snapshot.
	Ready(Arc<DirectoryStructure>),
	/// Normalization or transport failed; the reason is shown to the user.
	Failed(String),
}

impl LoadState {
	/// Normalize a payload. Failures become [`LoadState::Failed`] and are
	/// logged.
	pub fn from_payload(json: &str) -> Self {
		match parse_payload(json) {
			Ok(structure) => {
				info!(
					"dir-graph: loaded {} nodes, {} links",
					structure.nodes().len(),
					structure.links().len()
				);
				LoadState::Ready(Arc::new(structure))
			}
			Err(e) => {
				error!("dir-graph: failed to load directory structure: {e}");
				LoadState::Failed(e.to_string())
			}
		}
	}

	/// The snapshot, once there is one.
	pub fn structure(&self) -> Option<&Arc<DirectoryStructure>> {
		match self {
			LoadState::Ready(s) => Some(s),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
	Loading,
	Ready,
	Failed,
}

/// The snapshot the canvas should show given the current search and focus.
/// Returns `base` itself when neither narrows it.
pub fn visible_structure(
	base: &Arc<DirectoryStructure>,
	query: &str,
	focus: Option<&str>,
) -> Arc<DirectoryStructure> {
	if let Some(id) = focus {
		return Arc::new(base.neighborhood(id));
	}
	if query.trim().is_empty() {
		return base.clone();
	}
	Arc::new(base.filter(query))
}

/// What the details panel shows for the selected node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetails {
	/// Node id.
	pub id: String,
	/// Display name.
	pub name: String,
	/// File or directory.
	pub kind: NodeKind,
	/// Path used for change matching.
	pub path: String,
	/// Number of linked nodes.
	pub degree: usize,
}

/// Details of node `id` in the loaded snapshot, if both exist.
pub fn node_details(load: &LoadState, id: &str) -> Option<NodeDetails> {
	let s = load.structure()?;
	let node = s.node(id)?;
	Some(NodeDetails {
		id: node.id.clone(),
		name: node.name.clone(),
		kind: node.kind,
		path: node.match_path().to_string(),
		degree: s.neighbors(id).len(),
	})
}

/// Focusing the node that is already focused shows everything again.
fn toggle_focus(current: Option<&str>, id: &str) -> Option<String> {
	(current != Some(id)).then(|| id.to_string())
}

/// Toolbar, canvas and a draggable details panel for the selected node.
///
/// The details panel stays mounted while the selection, focus or snapshot
/// change, so it keeps wherever the user dragged it.
#[component]
pub fn GraphView(
	/// Snapshot lifecycle; failures are shown in place of the canvas.
	#[prop(into)]
	load: Signal<LoadState>,
	/// Ids of recently changed nodes.
	#[prop(into, default = Signal::stored(Vec::new()))]
	changed: Signal<Vec<String>>,
	#[prop(optional)] render: RenderConfig,
	#[prop(optional)] drag: DragConfig,
) -> impl IntoView {
	let mode = RwSignal::new(render.initial_mode);
	let show_labels = RwSignal::new(render.show_labels);
	let query = RwSignal::new(String::new());
	let selected = RwSignal::new(None::<String>);
	let focused = RwSignal::new(None::<String>);

	let phase = Memo::new(move |_| {
		load.with(|l| match l {
			LoadState::Loading => Phase::Loading,
			LoadState::Ready(_) => Phase::Ready,
			LoadState::Failed(_) => Phase::Failed,
		})
	});

	let empty = Arc::new(DirectoryStructure::default());
	let visible = Signal::derive(move || {
		let Some(base) = load.with(|l| l.structure().cloned()) else {
			return empty.clone();
		};
		query.with(|q| focused.with(|f| visible_structure(&base, q, f.as_deref())))
	});
	let config = Signal::derive(move || RenderConfig {
		show_labels: show_labels.get(),
		..render.clone()
	});

	let details = Memo::new(move |_| {
		let id = selected.get()?;
		load.with(|l| node_details(l, &id))
	});
	let detail = move |f: fn(&NodeDetails) -> String| {
		move || details.with(|d| d.as_ref().map(f).unwrap_or_default())
	};
	let is_focused = move || {
		details.with(|d| {
			d.as_ref()
				.is_some_and(|d| focused.with(|f| f.as_deref() == Some(d.id.as_str())))
		})
	};

	let canvas_drag = drag.clone();
	let canvas = move || match phase.get() {
		Phase::Loading => view! { <p class="graph-status">"Loading directory structure..."</p> }.into_any(),
		Phase::Failed => {
			let reason = load.with(|l| match l {
				LoadState::Failed(reason) => reason.clone(),
				_ => String::new(),
			});
			view! {
				<div class="graph-status graph-error" role="alert">
					<strong>"Could not load the directory structure."</strong>
					<p>{reason}</p>
				</div>
			}
			.into_any()
		}
		Phase::Ready => view! {
			<DirectoryGraphCanvas
				structure=visible
				mode=mode
				config=config
				changed=changed
				drag_config=canvas_drag.clone()
				on_select={move |id: Option<String>| selected.set(id)}
				fullscreen=true
			/>
		}
		.into_any(),
	};

	view! {
		<div class="graph-view">
			{canvas}
			<div class="graph-toolbar">
				<button
					class="mode-toggle"
					on:click=move |_| mode.update(|m| *m = m.toggled())
				>
					{move || format!("Switch to {}", mode.get().toggled())}
				</button>
				<label>
					<input
						type="checkbox"
						prop:checked=show_labels
						on:change=move |ev| show_labels.set(event_target_checked(&ev))
					/>
					"Labels"
				</label>
				<input
					type="search"
					placeholder="Filter by name or path"
					prop:value=query
					on:input=move |ev| {
						focused.set(None);
						query.set(event_target_value(&ev));
					}
				/>
			</div>
			<Show when=move || details.with(Option::is_some)>
				<DraggablePanel
					title=Signal::derive(detail(|d| d.name.clone()))
					config=drag.clone()
					class="node-details"
				>
					<dl>
						<dt>"Type"</dt>
						<dd>{detail(|d| d.kind.as_str().to_string())}</dd>
						<dt>"Path"</dt>
						<dd>{detail(|d| d.path.clone())}</dd>
						<dt>"Links"</dt>
						<dd>{detail(|d| d.degree.to_string())}</dd>
					</dl>
					<button on:click=move |_| {
						let Some(id) = details.with_untracked(|d| d.as_ref().map(|d| d.id.clone())) else {
							return;
						};
						focused.update(|f| *f = toggle_focus(f.as_deref(), &id));
					}>
						{move || if is_focused() { "Show all" } else { "Focus neighbourhood" }}
					</button>
					<button on:click=move |_| selected.set(None)>"Close"</button>
				</DraggablePanel>
			</Show>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn base() -> Arc<DirectoryStructure> {
		Arc::new(
			parse_payload(
				r#"{"nodes": [
					{"id": "root", "name": "project", "type": "directory", "path": "project"},
					{"id": "src", "name": "src", "type": "directory", "path": "project/src"},
					{"id": "main", "name": "main.rs", "type": "file", "path": "project/src/main.rs"},
					{"id": "readme", "name": "README.md", "type": "file", "path": "project/README.md"}
				], "links": [
					{"source": "root", "target": "src"},
					{"source": "src", "target": "main"},
					{"source": "root", "target": "readme"}
				]}"#,
			)
			.unwrap(),
		)
	}

	#[test]
	fn unfiltered_view_shares_the_snapshot() {
		let base = base();
		assert!(Arc::ptr_eq(&visible_structure(&base, "  ", None), &base));
	}

	#[test]
	fn search_narrows_nodes_and_links() {
		let view = visible_structure(&base(), "SRC", None);
		let ids: Vec<_> = view.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["src", "main"]);
		assert_eq!(view.links().len(), 1);
	}

	#[test]
	fn focus_wins_over_search() {
		let view = visible_structure(&base(), "readme", Some("src"));
		let mut ids: Vec<_> = view.nodes().iter().map(|n| n.id.as_str()).collect();
		ids.sort();
		assert_eq!(ids, vec!["main", "root", "src"]);
	}

	#[test]
	fn broken_payload_is_a_visible_failure() {
		let state = LoadState::from_payload(
			r#"{"nodes": [{"id": "a", "name": "a", "type": "file"}], "links": [{"source": "a", "target": "ghost"}]}"#,
		);
		match &state {
			LoadState::Failed(reason) => assert!(reason.contains("ghost"), "{reason}"),
			other => panic!("expected a failure, got {other:?}"),
		}
	}

	#[test]
	fn details_follow_the_loaded_snapshot() {
		let load = LoadState::Ready(base());
		let details = node_details(&load, "src").unwrap();
		assert_eq!(details.name, "src");
		assert_eq!(details.kind, NodeKind::Directory);
		assert_eq!(details.path, "project/src");
		assert_eq!(details.degree, 2);
		assert_eq!(node_details(&load, "ghost"), None);
		assert_eq!(node_details(&LoadState::Loading, "src"), None);
	}

	#[test]
	fn focus_button_toggles() {
		assert_eq!(toggle_focus(None, "src"), Some("src".to_string()));
		assert_eq!(toggle_focus(Some("src"), "src"), None);
		assert_eq!(toggle_focus(Some("main"), "src"), Some("src".to_string()));
	}

	#[test]
	fn load_state_exposes_only_ready_snapshots() {
		assert!(LoadState::Loading.structure().is_none());
		assert!(LoadState::Failed("boom".into()).structure().is_none());
		assert!(LoadState::Ready(base()).structure().is_some());
	}
}
