//! Leptos component wrapping the directory graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, panning, zooming and selection. An animation
//! loop runs via `requestAnimationFrame`, ticking the active layout engine and
//! drawing each frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::CanvasState;
use super::theme::Theme;
use crate::drag::{DragConfig, Point};
use crate::listener::{GlobalListener, client_point, window_drag};
use crate::model::DirectoryStructure;
use crate::renderer::{GraphRenderer, RenderConfig, RenderMode};

/// Simulation step per animation frame, in seconds.
const FRAME_DT: f32 = 0.016;

/// Canvas state plus everything that lives exactly as long as it.
struct GraphContext {
	state: CanvasState,
	theme: Theme,
	_resize: Option<GlobalListener>,
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Renders an interactive view of a directory snapshot on a canvas element.
///
/// The snapshot, mode and render configuration are reactive. Changing the
/// mode swaps the layout engine over the same snapshot. `changed` holds ids
/// of nodes to ring as recently changed. Clicking a node (without dragging
/// it) toggles its selection and reports its id through `on_select`;
/// clicking the background clears it. Double-clicking a node unpins it.
#[component]
pub fn DirectoryGraphCanvas(
	#[prop(into)] structure: Signal<Arc<DirectoryStructure>>,
	#[prop(into)] mode: Signal<RenderMode>,
	#[prop(into)] config: Signal<RenderConfig>,
	#[prop(into, default = Signal::stored(Vec::new()))] changed: Signal<Vec<String>>,
	#[prop(optional)] drag_config: DragConfig,
	#[prop(optional, into)] on_select: Option<Callback<Option<String>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let click_threshold = drag_config.threshold;

	// Node drags are plain drags over the node's screen position; the setter
	// maps the emitted client position back into graph space.
	let drag_context: Weak<RefCell<Option<GraphContext>>> = Rc::downgrade(&context);
	let node_drag = window_drag(
		DragConfig {
			bounds: None,
			..drag_config
		},
		Box::new(move |client: Point| {
			let (Some(context), Some(canvas)) = (drag_context.upgrade(), canvas_ref.get_untracked())
			else {
				return;
			};
			let canvas: HtmlCanvasElement = canvas.into();
			let rect = canvas.get_bounding_client_rect();
			if let Some(ref mut c) = *context.borrow_mut() {
				let Some(index) = c.state.dragged else {
					return;
				};
				let at = c
					.state
					.screen_to_graph(client.x - rect.left(), client.y - rect.top());
				c.state.renderer.move_node(index, at);
				c.state.drag_moved = true;
			}
		}),
	);

	let (context_init, animate_init) = (context.clone(), animate.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("dir-graph: canvas has no 2d context");
			return;
		};

		let resize = fullscreen.then(|| {
			let (weak, canvas_resize) = (Rc::downgrade(&context_init), canvas.clone());
			GlobalListener::attached(window.clone(), "resize", move |_: Event| {
				let (Some(context), Some((nw, nh))) =
					(weak.upgrade(), web_sys::window().as_ref().and_then(viewport_size))
				else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context.borrow_mut() {
					c.state.resize(nw, nh);
				}
			})
		});

		let renderer = GraphRenderer::new(
			structure.get_untracked(),
			mode.get_untracked(),
			config.get_untracked(),
		);
		let mut state = CanvasState::new(renderer, w, h);
		state.set_changed(&changed.get_untracked());
		*context_init.borrow_mut() = Some(GraphContext {
			state,
			theme: Theme::default(),
			_resize: resize,
		});

		// The loop only holds the context weakly and stops once it is gone.
		let (context_anim, animate_inner) = (Rc::downgrade(&context_init), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(context) = context_anim.upgrade() else {
				return;
			};
			if let Some(ref mut c) = *context.borrow_mut() {
				c.state.tick(FRAME_DT);
				render::render(&c.state, &ctx, &c.theme);
			}
			if let (Some(cb), Some(window)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_structure = context.clone();
	Effect::new(move |_| {
		let next = structure.get();
		if let Some(ref mut c) = *context_structure.borrow_mut() {
			c.state.set_structure(next);
		}
	});

	let context_mode = context.clone();
	Effect::new(move |_| {
		let next = mode.get();
		if let Some(ref mut c) = *context_mode.borrow_mut() {
			c.state.renderer.set_mode(next);
		}
	});

	let context_config = context.clone();
	Effect::new(move |_| {
		let next = config.get();
		if let Some(ref mut c) = *context_config.borrow_mut() {
			c.state.renderer.set_config(next);
		}
	});

	let context_changed = context.clone();
	Effect::new(move |_| {
		let ids = changed.get();
		if let Some(ref mut c) = *context_changed.borrow_mut() {
			c.state.set_changed(&ids);
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = canvas_point(&canvas, &ev);

		let mut origin = None;
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.drag_moved = false;
			c.state.dragged = c.state.node_at(x, y, &c.theme);
			match c.state.dragged.and_then(|i| c.state.node_screen_position(i)) {
				Some(p) => origin = Some(Point::new(p.x + rect.left(), p.y + rect.top())),
				None => {
					c.state.dragged = None;
					c.state.pan.active = true;
					c.state.pan.start_x = x;
					c.state.pan.start_y = y;
					c.state.pan.transform_start_x = c.state.transform.x;
					c.state.pan.transform_start_y = c.state.transform.y;
					c.state.pan.travelled = 0.0;
				}
			}
		}
		if let (Some(origin), Some(drag)) = (origin, node_drag.as_ref()) {
			let _ = drag.borrow_mut().pointer_down(client_point(&ev), Some(origin));
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, &ev);

		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.state.pan.active {
				let (dx, dy) = (x - c.state.pan.start_x, y - c.state.pan.start_y);
				c.state.pan.travelled = c.state.pan.travelled.max((dx * dx + dy * dy).sqrt());
				c.state.transform.x = c.state.pan.transform_start_x + dx;
				c.state.transform.y = c.state.pan.transform_start_y + dy;
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		let mut picked = None;
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			if let Some(index) = c.state.dragged.take() {
				if !c.state.drag_moved {
					let next = (c.state.selected() != Some(index)).then_some(index);
					c.state.select(next);
					picked = Some(next.and_then(|i| c.state.renderer.node(i)).map(|n| n.id.clone()));
				}
			} else if c.state.pan.active && c.state.pan.travelled <= click_threshold {
				c.state.select(None);
				picked = Some(None);
			}
			c.state.pan.active = false;
		}
		if let (Some(selection), Some(on_select)) = (picked, on_select) {
			on_select.run(selection);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		// Node drags keep going outside the canvas; pans do not.
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.pan.active = false;
		}
	};

	let context_dc = context.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, &ev);
		if let Some(ref mut c) = *context_dc.borrow_mut() {
			if let Some(index) = c.state.node_at(x, y, &c.theme) {
				c.state.renderer.release_node(index);
			}
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, &ev);

		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.state.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="directory-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
