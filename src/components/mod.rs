//! Leptos components: the graph canvas, its surrounding view and overlays.

pub mod draggable;
pub mod graph_canvas;
pub mod graph_view;
pub mod recent_changes;
