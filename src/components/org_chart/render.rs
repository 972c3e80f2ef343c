use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{distance, edge_point};
use super::state::OrgChartState;
use super::types::{EdgeSnapshot, NodeSnapshot};

pub fn render(state: &OrgChartState, ctx: &CanvasRenderingContext2d) {
	let view = state.viewport.get_state();
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(view.offset_x, view.offset_y);
	let _ = ctx.scale(view.scale, view.scale);

	let frame = state.frame();
	let by_id: HashMap<&str, &NodeSnapshot> = frame.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
	draw_edges(state, ctx, &frame.edges, &by_id);
	draw_nodes(state, ctx, &frame.nodes);
	ctx.restore();
}

fn draw_edges(
	state: &OrgChartState,
	ctx: &CanvasRenderingContext2d,
	edges: &[EdgeSnapshot],
	by_id: &HashMap<&str, &NodeSnapshot>,
) {
	let k = state.viewport.get_state().scale;
	let (line_width, arrow_size) = (1.5 / k, 8.0 / k);
	ctx.set_stroke_style_str("rgba(100, 180, 255, 0.6)");
	ctx.set_fill_style_str("rgba(100, 180, 255, 0.8)");
	ctx.set_line_width(line_width);

	for edge in edges {
		let (Some(parent), Some(child)) = (by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str())) else {
			continue;
		};
		let (p, c) = ((parent.x, parent.y), (child.x, child.y));
		if distance(p, c) <= parent.radius + child.radius {
			continue;
		}

		let start = edge_point(p, parent.radius, c);
		let tip = edge_point(c, child.radius, p);
		let dist = distance(start, tip);
		let (ux, uy) = ((tip.0 - start.0) / dist, (tip.1 - start.1) / dist);
		let (back_x, back_y) = (tip.0 - ux * arrow_size, tip.1 - uy * arrow_size);

		ctx.begin_path();
		ctx.move_to(start.0, start.1);
		ctx.line_to(back_x, back_y);
		ctx.stroke();

		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip.0, tip.1);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(state: &OrgChartState, ctx: &CanvasRenderingContext2d, nodes: &[NodeSnapshot]) {
	let k = state.viewport.get_state().scale;
	let font_px = 12.0 / k.max(0.5);
	let dragged = state.drag.dragged_node();

	for node in nodes {
		let (x, y, radius) = (node.x, node.y, node.radius);
		let (label, color) = state
			.info(&node.id)
			.map(|info| (info.label.as_str(), info.color.as_str()))
			.unwrap_or((node.id.as_str(), "#7f7f7f"));

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(color);
		ctx.fill();

		if node.is_pinned {
			// Dashed while held, solid once dropped.
			let dash = if dragged == Some(node.id.as_str()) {
				js_sys::Array::of2(&JsValue::from_f64(6.0 / k), &JsValue::from_f64(4.0 / k))
			} else {
				js_sys::Array::new()
			};
			let _ = ctx.set_line_dash(&dash);
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.85)");
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		} else if state.hovered.as_deref() == Some(node.id.as_str()) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
		ctx.set_font(&format!("{font_px}px sans-serif"));
		let _ = ctx.fill_text(label, x + radius + 4.0 / k, y + font_px / 3.0);
	}
}
