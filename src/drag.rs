//! Pointer-drag state machine for repositioning any element.
//!
//! The controller knows nothing about what it moves. It turns
//! down/move/up events into absolute positions handed to a setter, and
//! swallows moves that stay within `threshold` of the press so a shaky click
//! is not mistaken for a drag.
//!
//! Move/up events must be observed at the outermost scope because the pointer
//! can leave the element mid-drag. The controller models that as a
//! [`ListenerScope`] it acquires on press and releases on release, on
//! [`detach`](DragController::detach) and on drop.

use std::ops::Sub;

use log::debug;
use serde::Deserialize;

use crate::error::DragAttachmentError;

/// Moves at or below this distance from the press point are ignored.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;

/// A position in pixels.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub struct Point {
	/// Horizontal, growing right.
	pub x: f64,
	/// Vertical, growing down.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

/// Allowed range for an element's top-left corner.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
	/// Left edge.
	pub min_x: f64,
	/// Top edge.
	pub min_y: f64,
	/// Right edge.
	pub max_x: f64,
	/// Bottom edge.
	pub max_y: f64,
}

impl Bounds {
	/// Pull `p` into range.
	pub fn clamp(&self, p: Point) -> Point {
		// min() then max(), so an inverted range pins to the minimum.
		Point::new(
			p.x.min(self.max_x).max(self.min_x),
			p.y.min(self.max_y).max(self.min_y),
		)
	}
}

/// Tunables for one draggable element.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DragConfig {
	/// Moves within this distance of the press are ignored.
	pub threshold: f64,
	/// Clamp emitted positions; `None` leaves them free.
	pub bounds: Option<Bounds>,
}

impl Default for DragConfig {
	fn default() -> Self {
		Self {
			threshold: DEFAULT_DRAG_THRESHOLD,
			bounds: None,
		}
	}
}

/// Per-gesture state. Belongs to exactly one controller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
	/// Set once the pointer passed the threshold.
	pub is_dragging: bool,
	/// Pointer position at press.
	pub start_position: Point,
	/// Press position relative to the element's top-left corner.
	pub pointer_offset: Point,
}

/// Where move/up listeners live while a gesture is in progress.
pub trait ListenerScope {
	/// Start delivering move/up events.
	fn acquire(&mut self);
	/// Stop delivering them. Called exactly once per `acquire`.
	fn release(&mut self);
}

/// For callers that feed events in by hand.
impl ListenerScope for () {
	fn acquire(&mut self) {}
	fn release(&mut self) {}
}

/// Turns pointer events into element positions handed to `on_move`.
///
/// `L` is where window-level move/up listeners live; `()` for callers that
/// feed events by hand.
pub struct DragController<F, L = ()>
where
	F: FnMut(Point),
	L: ListenerScope,
{
	config: DragConfig,
	state: DragState,
	on_move: F,
	scope: L,
	listening: bool,
	detached: bool,
}

impl<F: FnMut(Point)> DragController<F, ()> {
	/// A controller without listener scope.
	pub fn new(config: DragConfig, on_move: F) -> Self {
		Self::with_scope(config, on_move, ())
	}
}

impl<F, L> DragController<F, L>
where
	F: FnMut(Point),
	L: ListenerScope,
{
	/// A controller that acquires `scope` for the length of each gesture.
	pub fn with_scope(config: DragConfig, on_move: F, scope: L) -> Self {
		Self {
			config,
			state: DragState::default(),
			on_move,
			scope,
			listening: false,
			detached: false,
		}
	}

	/// State of the current gesture.
	pub fn state(&self) -> &DragState {
		&self.state
	}

	/// Past the threshold in the current gesture.
	pub fn is_dragging(&self) -> bool {
		self.state.is_dragging
	}

	/// Whether the listener scope is currently held.
	pub fn is_listening(&self) -> bool {
		self.listening
	}

	/// Press over the element. `element_origin` is the element's current
	/// top-left corner; `None` means the element could not be resolved and
	/// the press is ignored.
	pub fn pointer_down(
		&mut self,
		pointer: Point,
		element_origin: Option<Point>,
	) -> Result<(), DragAttachmentError> {
		let origin = match element_origin {
			Some(origin) if !self.detached => origin,
			_ => {
				debug!("dir-graph: ignoring pointer-down at ({}, {})", pointer.x, pointer.y);
				return Err(DragAttachmentError);
			}
		};
		self.state = DragState {
			is_dragging: true,
			start_position: pointer,
			pointer_offset: pointer - origin,
		};
		if !self.listening {
			self.scope.acquire();
			self.listening = true;
		}
		Ok(())
	}

	/// Pointer moved anywhere on the page. Returns the emitted position, if
	/// the move got past the threshold.
	pub fn pointer_move(&mut self, pointer: Point) -> Option<Point> {
		if !self.state.is_dragging {
			return None;
		}
		if pointer.distance(self.state.start_position) <= self.config.threshold {
			return None;
		}
		let mut position = pointer - self.state.pointer_offset;
		if let Some(bounds) = &self.config.bounds {
			position = bounds.clamp(position);
		}
		(self.on_move)(position);
		Some(position)
	}

	/// Pointer released. Always ends the gesture.
	pub fn pointer_up(&mut self) {
		self.state.is_dragging = false;
		self.stop_listening();
	}

	/// Tear down: cancel any gesture, release listeners, and refuse further
	/// presses.
	pub fn detach(&mut self) {
		self.pointer_up();
		self.detached = true;
	}

	/// Torn down by [`detach`](Self::detach).
	pub fn is_detached(&self) -> bool {
		self.detached
	}

	fn stop_listening(&mut self) {
		if self.listening {
			self.scope.release();
			self.listening = false;
		}
	}
}

impl<F, L> Drop for DragController<F, L>
where
	F: FnMut(Point),
	L: ListenerScope,
{
	fn drop(&mut self) {
		self.stop_listening();
	}
}
