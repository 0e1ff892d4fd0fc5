//! Floating panel that can be dragged around the viewport by its header.

use leptos::prelude::*;
use web_sys::MouseEvent;

use crate::drag::{DragConfig, Point};
use crate::listener::{client_point, window_drag};

/// A `position: fixed` panel whose top-left corner follows header drags.
///
/// Presses on the body are left alone so its content stays clickable.
/// `config.bounds`, if set, limits where the corner may go.
#[component]
pub fn DraggablePanel(
	#[prop(into)] title: Signal<String>,
	#[prop(optional)] config: DragConfig,
	/// Where the corner starts, in client coordinates.
	#[prop(default = Point::new(16.0, 96.0))]
	initial: Point,
	#[prop(optional, into)] class: String,
	children: Children,
) -> impl IntoView {
	let panel_ref = NodeRef::<leptos::html::Div>::new();
	let position = RwSignal::new(initial);
	let drag = window_drag(config, Box::new(move |p: Point| position.set(p)));

	let on_mousedown = move |ev: MouseEvent| {
		let Some(drag) = drag.as_ref() else {
			return;
		};
		let origin = panel_ref.get_untracked().map(|el| {
			let rect = el.get_bounding_client_rect();
			Point::new(rect.left(), rect.top())
		});
		if drag.borrow_mut().pointer_down(client_point(&ev), origin).is_ok() {
			// Keeps the browser from starting a text selection.
			ev.prevent_default();
		}
	};

	view! {
		<div
			node_ref=panel_ref
			class=format!("draggable-panel {class}")
			style=move || {
				let p = position.get();
				format!("position: fixed; left: {}px; top: {}px;", p.x, p.y)
			}
		>
			<div class="draggable-panel-header" style="cursor: move;" on:mousedown=on_mousedown>
				{move || title.get()}
			</div>
			<div class="draggable-panel-body">{children()}</div>
		</div>
	}
}
