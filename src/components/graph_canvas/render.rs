//! Canvas rendering for the directory graph.
//!
//! Draws one [`Frame`](crate::layout::Frame) from the active layout engine.
//! Passes, back to front:
//! 1. Background (screen space)
//! 2. Edges, with arrowheads when links are directional (world space)
//! 3. Nodes in frame order, with change and selection rings, then labels

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::CanvasState;
use super::theme::{Theme, node_color};

/// Opacity of everything outside the selection while something is selected.
const DIMMED: f64 = 0.25;

/// Renders the complete graph to the canvas.
pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let frame = state.renderer.frame();
	let structure = state.renderer.structure();
	let config = state.renderer.config();

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	for &(s, t) in frame.edges() {
		let (Some(a), Some(b)) = (frame.position(s), frame.position(t)) else {
			continue;
		};
		let emphasized = state.is_highlighted(s) && state.is_highlighted(t);
		let alpha = if state.has_selection() && !emphasized {
			DIMMED
		} else {
			1.0
		};
		let target_radius = structure
			.nodes()
			.get(t)
			.map_or(theme.file_radius, |n| theme.radius(n.kind))
			* b.scale;
		draw_edge(
			ctx,
			theme,
			(a.x, a.y),
			(b.x, b.y),
			target_radius,
			alpha,
			config.link_directional,
			state.is_changed(t),
			state.transform.k,
		);
	}

	for projected in frame.nodes() {
		let Some(node) = structure.nodes().get(projected.index) else {
			continue;
		};
		let i = projected.index;
		let radius = theme.radius(node.kind) * projected.scale;
		let alpha = if state.has_selection() && !state.is_highlighted(i) {
			DIMMED
		} else {
			1.0
		};

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(projected.x, projected.y, radius, 0.0, 2.0 * PI);
		let fill = node_color(node);
		let fill = if state.selected() == Some(i) { fill.lighten(0.3) } else { fill };
		ctx.set_fill_style_str(&fill.to_css());
		ctx.fill();

		if state.is_changed(i) {
			ring(ctx, projected.x, projected.y, radius + 3.0, &theme.changed_ring.to_css(), 2.0);
		}
		if state.selected() == Some(i) {
			ring(ctx, projected.x, projected.y, radius + 2.0, &theme.selected_ring.to_css(), 2.0);
		} else if state.is_highlighted(i) {
			let color = theme.selected_ring.with_alpha(0.4).to_css();
			ring(ctx, projected.x, projected.y, radius + 2.0, &color, 1.0);
		}

		if config.show_labels {
			if let Some(label) = state.renderer.label(i) {
				ctx.set_fill_style_str(&theme.label.to_css());
				ctx.set_font(theme.label_font);
				ctx.set_text_align("center");
				let _ = ctx.fill_text(label, projected.x, projected.y + radius + 12.0);
			}
		}
		ctx.set_global_alpha(1.0);
	}

	ctx.restore();
}

fn ring(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, color: &str, width: f64) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(color);
	ctx.set_line_width(width);
	ctx.stroke();
}

#[allow(clippy::too_many_arguments)]
fn draw_edge(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	(x1, y1): (f64, f64),
	(x2, y2): (f64, f64),
	target_radius: f64,
	alpha: f64,
	directional: bool,
	dashed: bool,
	k: f64,
) {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let arrow = if directional { 6.0 / k.max(0.5) } else { 0.0 };
	let color = theme.edge.with_alpha(theme.edge.a * alpha).to_css();

	ctx.set_stroke_style_str(&color);
	ctx.set_line_width(1.4 / k.max(0.5));
	// Links into a recently changed node are dashed.
	if dashed {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(4.0),
			&JsValue::from_f64(3.0),
		));
	}
	let (tip_x, tip_y) = (x2 - ux * target_radius, y2 - uy * target_radius);
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(tip_x - ux * arrow, tip_y - uy * arrow);
	ctx.stroke();
	if dashed {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	if directional {
		let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
		let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);
		ctx.set_fill_style_str(&color);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}
