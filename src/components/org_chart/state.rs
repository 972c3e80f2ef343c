use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::drag::{DragConfig, DragOutcome, DragPinController, PinState};
use super::simulation::{Simulation, SimulationConfig};
use super::types::{LayoutSnapshot, OrgChartData};
use super::viewport::{Viewport, ViewportConfig};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Everything tunable about one chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgChartConfig {
	/// Layout forces and cooling.
	pub simulation: SimulationConfig,
	/// Zoom limits.
	pub viewport: ViewportConfig,
	/// Click/drag thresholds.
	pub drag: DragConfig,
}

/// Label and fill for one team.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeInfo {
	/// Team name.
	pub label: String,
	/// CSS colour, by depth in the tree.
	pub color: String,
}

/// Input forwarded by the canvas host. Coordinates are canvas-relative
/// screen pixels; touch lists hold every finger currently down.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
	/// Mouse button pressed.
	PointerDown {
		/// Screen x.
		x: f64,
		/// Screen y.
		y: f64,
	},
	/// Mouse moved.
	PointerMove {
		/// Screen x.
		x: f64,
		/// Screen y.
		y: f64,
	},
	/// Mouse button released.
	PointerUp {
		/// Event time in milliseconds.
		timestamp: f64,
	},
	/// Mouse left the canvas.
	PointerLeave,
	/// Wheel turned over the canvas.
	Wheel {
		/// Positive scrolls away from the user.
		delta_y: f64,
		/// Screen x of the cursor.
		x: f64,
		/// Screen y of the cursor.
		y: f64,
	},
	/// A finger touched down.
	TouchStart {
		/// All fingers down.
		touches: Vec<(f64, f64)>,
	},
	/// Fingers moved.
	TouchMove {
		/// All fingers down.
		touches: Vec<(f64, f64)>,
	},
	/// A finger lifted.
	TouchEnd {
		/// Fingers still down.
		touches: Vec<(f64, f64)>,
		/// Event time in milliseconds.
		timestamp: f64,
	},
}

/// One mounted chart: the simulation, its viewport and the drag controller,
/// driven by [`CanvasEvent`]s and ticks on a single thread.
pub struct OrgChartState {
	pub(crate) simulation: Simulation,
	pub(crate) viewport: Viewport,
	pub(crate) drag: DragPinController,
	/// Team under the mouse, when no gesture is running.
	pub(crate) hovered: Option<String>,
	pub(crate) width: f64,
	pub(crate) height: f64,
	frame: Rc<RefCell<LayoutSnapshot>>,
	info: HashMap<String, NodeInfo>,
	config: OrgChartConfig,
}

impl OrgChartState {
	/// Lay out `data` and fit it into a `width` × `height` canvas.
	pub fn new(data: &OrgChartData, width: f64, height: f64, config: OrgChartConfig) -> Self {
		let frame = Rc::new(RefCell::new(LayoutSnapshot::default()));
		let simulation = Self::start(Simulation::new(data, config.simulation.clone()), &frame);
		let mut viewport = Viewport::new(config.viewport.clone());
		match simulation.bounds() {
			Some(bounds) => viewport.fit_bounds(bounds, width, height),
			None => viewport.center_on(0.0, 0.0, width, height),
		}

		Self {
			simulation,
			viewport,
			drag: DragPinController::new(config.drag.clone()),
			hovered: None,
			width,
			height,
			frame,
			info: node_info(data),
			config,
		}
	}

	fn start(mut simulation: Simulation, frame: &Rc<RefCell<LayoutSnapshot>>) -> Simulation {
		if simulation.dropped_edges() > 0 {
			warn!(
				"{} teams reference a parent that is not in the chart",
				simulation.dropped_edges()
			);
		}
		let sink = Rc::clone(frame);
		simulation.subscribe(move |snapshot| *sink.borrow_mut() = snapshot.clone());
		simulation
	}

	/// Swap in a new team list, keeping positions and pins of surviving teams.
	pub fn replace_data(&mut self, data: &OrgChartData) {
		// The frame can trail pins set since the last tick.
		let previous = self.simulation.snapshot();
		self.simulation.dispose();
		let next = Simulation::reseeded(data, self.config.simulation.clone(), &previous);
		self.simulation = Self::start(next, &self.frame);
		debug!("reseeded chart with {} teams", self.simulation.nodes().len());

		if let Some(id) = self.drag.dragged_node().map(str::to_owned) {
			if self.simulation.node(&id).is_some() {
				self.simulation.begin_interaction();
			} else {
				self.drag.cancel(&mut self.simulation);
			}
		}
		if self
			.hovered
			.as_deref()
			.is_some_and(|id| self.simulation.node(id).is_none())
		{
			self.hovered = None;
		}
		self.info = node_info(data);
	}

	/// Layout engine. Replace it through [`replace_data`](Self::replace_data).
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	/// Pan/zoom.
	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	/// Pan/zoom, for programmatic zoom, fit or reset.
	pub fn viewport_mut(&mut self) -> &mut Viewport {
		&mut self.viewport
	}

	/// Drag/pin gestures.
	pub fn drag(&self) -> &DragPinController {
		&self.drag
	}

	/// Team under the mouse, when no gesture is running.
	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	/// Canvas size in pixels.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Where `id` is in the drag/pin cycle.
	pub fn pin_state(&self, id: &str) -> Option<PinState> {
		self.drag.node_state(&self.simulation, id)
	}

	/// Release `id`'s pin and let the layout settle around it again.
	pub fn unpin(&mut self, id: &str) -> bool {
		self.drag.unpin(&mut self.simulation, id)
	}

	/// Latest snapshot delivered by the simulation.
	pub fn frame(&self) -> Ref<'_, LayoutSnapshot> {
		self.frame.borrow()
	}

	/// Label and colour for a team.
	pub fn info(&self, id: &str) -> Option<&NodeInfo> {
		self.info.get(id)
	}

	/// Team under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.viewport.screen_to_graph(sx, sy);
		self.simulation.node_at(gx, gy).map(str::to_owned)
	}

	/// Advance the layout one frame; `false` once it is resting.
	pub fn tick(&mut self) -> bool {
		self.simulation.tick()
	}

	/// Track a canvas size change.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Stop the simulation for good.
	pub fn dispose(&mut self) {
		self.drag.cancel(&mut self.simulation);
		self.simulation.dispose();
	}

	/// Route one input event. Returns the outcome of a finished node press.
	pub fn handle(&mut self, event: CanvasEvent) -> Option<DragOutcome> {
		match event {
			CanvasEvent::PointerDown { x, y } => {
				match self.node_at_position(x, y) {
					Some(id) => {
						self.drag.pointer_down(&mut self.simulation, &self.viewport, &id, x, y);
					}
					None => self.viewport.begin_pan(x, y),
				}
				None
			}
			CanvasEvent::PointerMove { x, y } => {
				if self.drag.is_dragging() {
					self.drag.pointer_move(&mut self.simulation, &self.viewport, x, y);
				} else if !self.viewport.pan_to(x, y) {
					self.hovered = self.node_at_position(x, y);
				}
				None
			}
			CanvasEvent::PointerUp { timestamp } => {
				self.viewport.end_gesture();
				self.drag.pointer_up(&mut self.simulation, timestamp)
			}
			CanvasEvent::PointerLeave => {
				self.drag.cancel(&mut self.simulation);
				self.viewport.end_gesture();
				self.hovered = None;
				None
			}
			CanvasEvent::Wheel { delta_y, x, y } => {
				self.viewport.wheel(delta_y, x, y);
				None
			}
			CanvasEvent::TouchStart { touches } => {
				if let &[(x, y)] = touches.as_slice()
					&& !self.drag.is_dragging()
					&& let Some(id) = self.node_at_position(x, y)
				{
					self.viewport.end_gesture();
					self.drag.pointer_down(&mut self.simulation, &self.viewport, &id, x, y);
					return None;
				}
				// A second finger turns a node drag into a pinch.
				self.drag.cancel(&mut self.simulation);
				self.viewport.touch_start(&touches);
				None
			}
			CanvasEvent::TouchMove { touches } => {
				if self.drag.is_dragging() {
					if let [(x, y)] = touches.as_slice() {
						self.drag.pointer_move(&mut self.simulation, &self.viewport, *x, *y);
					}
				} else {
					self.viewport.touch_move(&touches);
				}
				None
			}
			CanvasEvent::TouchEnd { touches, timestamp } => {
				if self.drag.is_dragging() {
					return if touches.is_empty() {
						self.drag.pointer_up(&mut self.simulation, timestamp)
					} else {
						None
					};
				}
				self.viewport.touch_end(&touches);
				None
			}
		}
	}
}

fn node_info(data: &OrgChartData) -> HashMap<String, NodeInfo> {
	let depths = data.depths();
	data.teams
		.iter()
		.map(|team| {
			let depth = depths.get(team.id.as_str()).copied().unwrap_or(0);
			(
				team.id.clone(),
				NodeInfo {
					label: team.name.clone(),
					color: COLORS[depth % COLORS.len()].into(),
				},
			)
		})
		.collect()
}
