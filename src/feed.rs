//! Browser side of the live change feed and snapshot delivery.
//!
//! Whatever transport the page uses (socket, polling, a watcher bridge) is
//! expected to dispatch `CustomEvent`s on `window` whose `detail` is the
//! message, either as a JSON string or as a plain object:
//!
//! ```js
//! window.dispatchEvent(new CustomEvent("dir-graph:changes", {
//!   detail: { changes: [{ type: "modified", path: "src/app.py" }] },
//! }));
//! window.dispatchEvent(new CustomEvent("dir-graph:structure", {
//!   detail: { structure: [{ name: "src", type: "folder", path: "src", children: [] }] },
//! }));
//! ```

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, Event};

use crate::listener::GlobalListener;

/// Carries change feed messages.
pub const FEED_EVENT: &str = "dir-graph:changes";
/// Carries a complete directory payload that replaces the current snapshot.
pub const SNAPSHOT_EVENT: &str = "dir-graph:structure";

/// Start receiving feed messages. Dropping the returned guard unsubscribes.
pub fn subscribe(on_message: impl FnMut(String) + 'static) -> Option<GlobalListener> {
	listen(FEED_EVENT, on_message)
}

/// Start receiving replacement snapshots. Dropping the returned guard
/// unsubscribes.
pub fn subscribe_snapshots(on_payload: impl FnMut(String) + 'static) -> Option<GlobalListener> {
	listen(SNAPSHOT_EVENT, on_payload)
}

fn listen(event: &'static str, mut on_message: impl FnMut(String) + 'static) -> Option<GlobalListener> {
	let window = web_sys::window()?;
	Some(GlobalListener::attached(window, event, move |ev: Event| {
		let Some(ev) = ev.dyn_ref::<CustomEvent>() else {
			return;
		};
		let detail = ev.detail();
		let message = detail
			.as_string()
			.or_else(|| js_sys::JSON::stringify(&detail).ok().map(String::from));
		match message {
			Some(message) => on_message(message),
			None => warn!("dir-graph: {event} event without a usable detail"),
		}
	}))
}
