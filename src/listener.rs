//! Window-level event listeners with a scoped lifetime.
//!
//! A [`GlobalListener`] owns its closure and removes itself from the window
//! when dropped, so nothing stays registered after its owner goes away.
//! [`PointerListeners`] pairs a move and an up listener as the
//! [`ListenerScope`] for a [`DragController`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, MouseEvent, Window};

use crate::drag::{DragConfig, DragController, ListenerScope, Point};

/// One event listener on the window, detached on drop.
pub struct GlobalListener {
	window: Window,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
	attached: bool,
}

impl GlobalListener {
	/// Create a detached listener.
	pub fn new(window: Window, event: &'static str, handler: impl FnMut(Event) + 'static) -> Self {
		Self {
			window,
			event,
			callback: Closure::new(handler),
			attached: false,
		}
	}

	/// Create and attach in one go.
	pub fn attached(window: Window, event: &'static str, handler: impl FnMut(Event) + 'static) -> Self {
		let mut listener = Self::new(window, event, handler);
		listener.attach();
		listener
	}

	/// Register with the window. Idempotent.
	pub fn attach(&mut self) {
		if self.attached {
			return;
		}
		match self
			.window
			.add_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
		{
			Ok(()) => self.attached = true,
			Err(e) => warn!("dir-graph: could not listen for {}: {e:?}", self.event),
		}
	}

	/// Unregister from the window. Idempotent.
	pub fn detach(&mut self) {
		if !self.attached {
			return;
		}
		let _ = self
			.window
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
		self.attached = false;
	}
}

impl Drop for GlobalListener {
	fn drop(&mut self) {
		self.detach();
	}
}

/// `mousemove` + `mouseup` on the window, live only while a drag is active.
pub struct PointerListeners {
	moves: GlobalListener,
	ups: GlobalListener,
}

impl ListenerScope for PointerListeners {
	fn acquire(&mut self) {
		self.moves.attach();
		self.ups.attach();
	}

	fn release(&mut self) {
		self.moves.detach();
		self.ups.detach();
	}
}

/// A drag controller fed by window-level pointer events.
pub type WindowDrag = DragController<Box<dyn FnMut(Point)>, PointerListeners>;

/// Pointer position in client (viewport) coordinates.
pub fn client_point(ev: &MouseEvent) -> Point {
	Point::new(ev.client_x() as f64, ev.client_y() as f64)
}

/// Build a [`WindowDrag`]. The listeners only hold a weak handle, so the
/// controller (and with it every listener) goes away when the last strong
/// handle is dropped, typically together with the element's event handlers.
pub fn window_drag(config: DragConfig, on_move: Box<dyn FnMut(Point)>) -> Option<Rc<RefCell<WindowDrag>>> {
	let window = web_sys::window()?;
	Some(Rc::new_cyclic(|weak: &Weak<RefCell<WindowDrag>>| {
		let (weak_move, weak_up) = (weak.clone(), weak.clone());
		let moves = GlobalListener::new(window.clone(), "mousemove", move |ev: Event| {
			let Some(drag) = weak_move.upgrade() else {
				return;
			};
			if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
				drag.borrow_mut().pointer_move(client_point(ev));
			}
		});
		let ups = GlobalListener::new(window, "mouseup", move |_: Event| {
			if let Some(drag) = weak_up.upgrade() {
				drag.borrow_mut().pointer_up();
			}
		});
		RefCell::new(DragController::with_scope(
			config,
			on_move,
			PointerListeners { moves, ups },
		))
	}))
}
