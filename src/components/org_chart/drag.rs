//! Per-node drag / pin state machine.
//!
//! ```text
//! Free ──down──► Dragging ──up (moved)──► Pinned ──double click──► Free
//!                    │
//!                    └──up (not moved)──► previous state, reported as a click
//! ```
//!
//! The pin lives on the simulation node; this controller is the only thing
//! that sets or clears it.

use log::trace;
use serde::{Deserialize, Serialize};

use super::simulation::Simulation;
use super::viewport::Viewport;

/// Where a node is in the drag/pin cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinState {
	/// Moved by the simulation.
	Free,
	/// Following the pointer.
	Dragging,
	/// Held at a fixed position.
	Pinned,
}

/// What a pointer release meant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragOutcome {
	/// Released within the click threshold; layout untouched.
	Click(String),
	/// Released after moving; the node stays where it was dropped.
	Pinned(String),
	/// Second click on a pinned node; the pin was released.
	Unpinned(String),
}

/// Thresholds for telling clicks from drags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
	/// Screen pixels the pointer must travel before a press becomes a drag.
	pub click_threshold: f64,
	/// Maximum gap between two clicks of a double click.
	pub double_click_ms: f64,
}

impl Default for DragConfig {
	fn default() -> Self {
		Self {
			click_threshold: 4.0,
			double_click_ms: 300.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
struct DragState {
	node_id: String,
	start_x: f64,
	start_y: f64,
	/// Node centre minus the graph point under the pointer at press time.
	grab_dx: f64,
	grab_dy: f64,
	previous_pin: Option<(f64, f64)>,
	moved: bool,
}

/// Drives pins from pointer gestures.
#[derive(Clone, Debug, Default)]
pub struct DragPinController {
	drag: Option<DragState>,
	last_click: Option<(String, f64)>,
	config: DragConfig,
}

impl DragPinController {
	/// Controller with the given thresholds.
	pub fn new(config: DragConfig) -> Self {
		Self {
			drag: None,
			last_click: None,
			config,
		}
	}

	/// Whether a node is currently held.
	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	/// Id of the held node.
	pub fn dragged_node(&self) -> Option<&str> {
		self.drag.as_ref().map(|d| d.node_id.as_str())
	}

	/// State of `id`, or `None` if the simulation has no such node.
	pub fn node_state(&self, sim: &Simulation, id: &str) -> Option<PinState> {
		let node = sim.node(id)?;
		Some(if self.dragged_node() == Some(id) {
			PinState::Dragging
		} else if node.pin.is_some() {
			PinState::Pinned
		} else {
			PinState::Free
		})
	}

	/// Press on node `id` at screen `(sx, sy)`. The node is pinned where it
	/// stands and the simulation is kept hot. Unknown ids are ignored.
	pub fn pointer_down(&mut self, sim: &mut Simulation, viewport: &Viewport, id: &str, sx: f64, sy: f64) -> bool {
		if self.drag.is_some() {
			self.cancel(sim);
		}
		let Some(node) = sim.node(id) else {
			return false;
		};
		let (x, y, previous_pin) = (node.x, node.y, node.pin);
		let (gx, gy) = viewport.screen_to_graph(sx, sy);
		sim.pin(id, x, y);
		sim.begin_interaction();
		self.drag = Some(DragState {
			node_id: id.to_owned(),
			start_x: sx,
			start_y: sy,
			grab_dx: x - gx,
			grab_dy: y - gy,
			previous_pin,
			moved: false,
		});
		true
	}

	/// Pointer moved to screen `(sx, sy)`. Returns `true` while a drag is
	/// in progress.
	pub fn pointer_move(&mut self, sim: &mut Simulation, viewport: &Viewport, sx: f64, sy: f64) -> bool {
		let Some(drag) = self.drag.as_mut() else {
			return false;
		};
		if !drag.moved {
			if (sx - drag.start_x).hypot(sy - drag.start_y) <= self.config.click_threshold {
				return true;
			}
			trace!("drag of {} passed the click threshold", drag.node_id);
			drag.moved = true;
		}
		let (gx, gy) = viewport.screen_to_graph(sx, sy);
		if !sim.pin(&drag.node_id, gx + drag.grab_dx, gy + drag.grab_dy) && sim.node(&drag.node_id).is_none() {
			// Node vanished with a graph replacement.
			self.drag = None;
			return false;
		}
		true
	}

	/// Pointer released at time `timestamp_ms`.
	pub fn pointer_up(&mut self, sim: &mut Simulation, timestamp_ms: f64) -> Option<DragOutcome> {
		let drag = self.drag.take()?;
		sim.end_interaction();
		if drag.moved {
			self.last_click = None;
			return Some(DragOutcome::Pinned(drag.node_id));
		}

		restore(sim, &drag);
		let double = matches!(
			&self.last_click,
			Some((id, at)) if *id == drag.node_id && (0.0..=self.config.double_click_ms).contains(&(timestamp_ms - at))
		);
		if double && drag.previous_pin.is_some() {
			self.last_click = None;
			self.unpin(sim, &drag.node_id);
			return Some(DragOutcome::Unpinned(drag.node_id));
		}
		self.last_click = Some((drag.node_id.clone(), timestamp_ms));
		Some(DragOutcome::Click(drag.node_id))
	}

	/// Abandon the gesture without click handling: a moved node stays
	/// pinned, an unmoved one goes back to how it was.
	pub fn cancel(&mut self, sim: &mut Simulation) {
		let Some(drag) = self.drag.take() else {
			return;
		};
		sim.end_interaction();
		if !drag.moved {
			restore(sim, &drag);
		}
	}

	/// Release `id`'s pin and reheat so it finds a natural position.
	/// No-op for unknown, free or currently dragged nodes.
	pub fn unpin(&mut self, sim: &mut Simulation, id: &str) -> bool {
		if self.dragged_node() == Some(id) || !sim.unpin(id) {
			return false;
		}
		sim.reheat(sim.config().unpin_alpha);
		true
	}
}

fn restore(sim: &mut Simulation, drag: &DragState) {
	match drag.previous_pin {
		Some((px, py)) => {
			sim.pin(&drag.node_id, px, py);
		}
		None => {
			sim.unpin(&drag.node_id);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::org_chart::types::{OrgChartData, OrgTeam};
	use crate::components::org_chart::{SimulationConfig, ViewportConfig};

	fn chart() -> Simulation {
		let team = |id: &str, weight, parent: Option<&str>| OrgTeam {
			id: id.into(),
			name: id.into(),
			weight,
			parent_id: parent.map(Into::into),
		};
		Simulation::new(
			&OrgChartData::new(vec![
				team("root", 5, None),
				team("a", 0, Some("root")),
				team("b", 2, Some("root")),
				team("c", 10, Some("root")),
			]),
			SimulationConfig::default(),
		)
	}

	fn zoomed(scale: f64) -> Viewport {
		let mut vp = Viewport::new(ViewportConfig::default());
		vp.zoom(scale, 0.0, 0.0);
		vp.pan_by(400.0, 300.0);
		vp
	}

	fn pos(sim: &Simulation, id: &str) -> (f64, f64) {
		let n = sim.node(id).unwrap();
		(n.x, n.y)
	}

	#[test]
	fn drag_at_double_scale_moves_half_the_pixels_and_sticks() {
		let mut sim = chart();
		let vp = zoomed(2.0);
		let mut ctl = DragPinController::default();
		let (nx, ny) = pos(&sim, "b");
		let (sx, sy) = vp.graph_to_screen(nx, ny);

		assert!(ctl.pointer_down(&mut sim, &vp, "b", sx, sy));
		assert_eq!(ctl.node_state(&sim, "b"), Some(PinState::Dragging));
		assert_eq!(pos(&sim, "b"), (nx, ny));
		assert!(sim.is_settling());

		assert!(ctl.pointer_move(&mut sim, &vp, sx + 100.0, sy));
		assert!(ctl.pointer_move(&mut sim, &vp, sx + 200.0, sy));
		let (dx, dy) = pos(&sim, "b");
		assert!((dx - (nx + 100.0)).abs() < 1e-9);
		assert!((dy - ny).abs() < 1e-9);

		assert_eq!(ctl.pointer_up(&mut sim, 1_000.0), Some(DragOutcome::Pinned("b".into())));
		assert_eq!(ctl.node_state(&sim, "b"), Some(PinState::Pinned));
		let dropped = pos(&sim, "b");
		for _ in 0..50 {
			sim.tick();
			assert_eq!(pos(&sim, "b"), dropped);
		}
	}

	#[test]
	fn grabbing_off_centre_does_not_jump() {
		let mut sim = chart();
		let vp = zoomed(1.5);
		let mut ctl = DragPinController::default();
		let (nx, ny) = pos(&sim, "c");
		let (sx, sy) = vp.graph_to_screen(nx + 10.0, ny - 5.0);
		ctl.pointer_down(&mut sim, &vp, "c", sx, sy);
		ctl.pointer_move(&mut sim, &vp, sx + 30.0, sy + 60.0);
		let (x, y) = pos(&sim, "c");
		assert!((x - (nx + 20.0)).abs() < 1e-9);
		assert!((y - (ny + 40.0)).abs() < 1e-9);
	}

	#[test]
	fn small_wobble_is_a_click_and_leaves_node_free() {
		let mut sim = chart();
		let vp = zoomed(1.0);
		let mut ctl = DragPinController::default();
		let (nx, ny) = pos(&sim, "a");
		let (sx, sy) = vp.graph_to_screen(nx, ny);
		ctl.pointer_down(&mut sim, &vp, "a", sx, sy);
		ctl.pointer_move(&mut sim, &vp, sx + 2.0, sy + 2.0);
		assert_eq!(pos(&sim, "a"), (nx, ny));
		assert_eq!(ctl.pointer_up(&mut sim, 10.0), Some(DragOutcome::Click("a".into())));
		assert_eq!(ctl.node_state(&sim, "a"), Some(PinState::Free));
		assert_eq!(sim.alpha_target(), 0.0);
	}

	#[test]
	fn click_on_pinned_node_keeps_the_pin() {
		let mut sim = chart();
		let vp = zoomed(1.0);
		let mut ctl = DragPinController::default();
		sim.pin("a", 50.0, 60.0);
		let (sx, sy) = vp.graph_to_screen(50.0, 60.0);
		ctl.pointer_down(&mut sim, &vp, "a", sx, sy);
		assert_eq!(ctl.pointer_up(&mut sim, 0.0), Some(DragOutcome::Click("a".into())));
		assert_eq!(sim.node("a").unwrap().pin, Some((50.0, 60.0)));
	}

	#[test]
	fn double_click_unpins() {
		let mut sim = chart();
		let vp = zoomed(1.0);
		let mut ctl = DragPinController::default();
		let (nx, ny) = pos(&sim, "c");
		let (sx, sy) = vp.graph_to_screen(nx, ny);

		ctl.pointer_down(&mut sim, &vp, "c", sx, sy);
		ctl.pointer_move(&mut sim, &vp, sx + 40.0, sy);
		ctl.pointer_up(&mut sim, 0.0);
		let (px, py) = pos(&sim, "c");
		let (sx, sy) = vp.graph_to_screen(px, py);

		ctl.pointer_down(&mut sim, &vp, "c", sx, sy);
		assert_eq!(ctl.pointer_up(&mut sim, 1_000.0), Some(DragOutcome::Click("c".into())));
		ctl.pointer_down(&mut sim, &vp, "c", sx, sy);
		assert_eq!(ctl.pointer_up(&mut sim, 1_200.0), Some(DragOutcome::Unpinned("c".into())));
		assert_eq!(ctl.node_state(&sim, "c"), Some(PinState::Free));
		assert!(sim.is_settling());
	}

	#[test]
	fn unpin_reheats_alpha_but_not_the_target() {
		let mut sim = chart();
		let vp = zoomed(1.0);
		let mut ctl = DragPinController::default();
		let (sx, sy) = {
			let (nx, ny) = pos(&sim, "b");
			vp.graph_to_screen(nx, ny)
		};
		ctl.pointer_down(&mut sim, &vp, "b", sx, sy);
		ctl.pointer_move(&mut sim, &vp, sx, sy + 50.0);
		ctl.pointer_up(&mut sim, 0.0);
		while sim.tick() {}
		assert_eq!(sim.alpha_target(), 0.0);

		assert!(ctl.unpin(&mut sim, "b"));
		assert!(sim.alpha() >= sim.config().unpin_alpha);
		assert_eq!(sim.alpha_target(), 0.0);
		while sim.tick() {}
		assert!(!sim.is_settling());
		assert!(!ctl.unpin(&mut sim, "b"));
	}

	#[test]
	fn slow_second_click_is_just_a_click() {
		let mut sim = chart();
		let vp = zoomed(1.0);
		let mut ctl = DragPinController::default();
		sim.pin("b", 0.0, 200.0);
		let (sx, sy) = vp.graph_to_screen(0.0, 200.0);
		ctl.pointer_down(&mut sim, &vp, "b", sx, sy);
		ctl.pointer_up(&mut sim, 0.0);
		ctl.pointer_down(&mut sim, &vp, "b", sx, sy);
		assert_eq!(ctl.pointer_up(&mut sim, 900.0), Some(DragOutcome::Click("b".into())));
		assert_eq!(ctl.node_state(&sim, "b"), Some(PinState::Pinned));
	}

	#[test]
	fn unknown_ids_are_ignored() {
		let mut sim = chart();
		let vp = zoomed(1.0);
		let mut ctl = DragPinController::default();
		assert!(!ctl.pointer_down(&mut sim, &vp, "nobody", 0.0, 0.0));
		assert!(!ctl.is_dragging());
		assert!(!ctl.pointer_move(&mut sim, &vp, 50.0, 50.0));
		assert_eq!(ctl.pointer_up(&mut sim, 0.0), None);
		assert!(!ctl.unpin(&mut sim, "nobody"));
		assert!(!ctl.unpin(&mut sim, "a"));
		assert_eq!(ctl.node_state(&sim, "nobody"), None);
	}

	#[test]
	fn cancel_keeps_a_moved_pin() {
		let mut sim = chart();
		let vp = zoomed(1.0);
		let mut ctl = DragPinController::default();
		let (nx, ny) = pos(&sim, "a");
		let (sx, sy) = vp.graph_to_screen(nx, ny);
		ctl.pointer_down(&mut sim, &vp, "a", sx, sy);
		ctl.pointer_move(&mut sim, &vp, sx, sy + 80.0);
		ctl.cancel(&mut sim);
		assert!(!ctl.is_dragging());
		assert_eq!(ctl.node_state(&sim, "a"), Some(PinState::Pinned));
		assert!((pos(&sim, "a").1 - (ny + 80.0)).abs() < 1e-9);
	}
}
