//! Graph → screen transform and the gestures that drive it.
//!
//! `screen = graph * scale + offset`. Every zoom keeps one screen point's
//! graph point fixed; pans translate in screen pixels. Each gesture mode
//! snapshots its own starting state on entry, so switching between one and
//! two fingers never jumps.

use log::trace;
use serde::{Deserialize, Serialize};

/// Scale and screen-space translation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
	/// Screen pixels per graph unit.
	pub scale: f64,
	/// Screen x of the graph origin.
	pub offset_x: f64,
	/// Screen y of the graph origin.
	pub offset_y: f64,
}

impl Default for ViewportState {
	fn default() -> Self {
		Self {
			scale: 1.0,
			offset_x: 0.0,
			offset_y: 0.0,
		}
	}
}

/// Limits and step sizes for [`Viewport`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Lower scale clamp.
	pub min_scale: f64,
	/// Upper scale clamp.
	pub max_scale: f64,
	/// Factor per wheel notch toward the user.
	pub wheel_zoom_in: f64,
	/// Factor per wheel notch away from the user.
	pub wheel_zoom_out: f64,
	/// Screen margin kept around content by [`Viewport::fit_bounds`].
	pub fit_padding: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.1,
			max_scale: 10.0,
			wheel_zoom_in: 1.1,
			wheel_zoom_out: 0.9,
			fit_padding: 40.0,
		}
	}
}

impl ViewportConfig {
	/// Positive, finite, ordered limits and zooming wheel factors. Anything
	/// unusable falls back to the default.
	fn sanitized(self) -> Self {
		let defaults = Self::default();
		let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
		let (a, b) = (
			positive(self.min_scale, defaults.min_scale),
			positive(self.max_scale, defaults.max_scale),
		);
		Self {
			min_scale: a.min(b),
			max_scale: a.max(b),
			wheel_zoom_in: positive(self.wheel_zoom_in, defaults.wheel_zoom_in),
			wheel_zoom_out: positive(self.wheel_zoom_out, defaults.wheel_zoom_out),
			fit_padding: if self.fit_padding.is_finite() { self.fit_padding.max(0.0) } else { defaults.fit_padding },
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PanGesture {
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PinchGesture {
	start_distance: f64,
	start_scale: f64,
	/// Graph point under the starting midpoint.
	anchor_x: f64,
	anchor_y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum GestureState {
	#[default]
	Idle,
	Panning(PanGesture),
	Pinching(PinchGesture),
}

/// Pan/zoom controller for one canvas.
#[derive(Clone, Debug, Default)]
pub struct Viewport {
	state: ViewportState,
	config: ViewportConfig,
	gesture: GestureState,
}

impl Viewport {
	/// Identity transform with the given limits.
	pub fn new(config: ViewportConfig) -> Self {
		Self {
			state: ViewportState::default(),
			config: config.sanitized(),
			gesture: GestureState::Idle,
		}
	}

	/// Current transform.
	pub fn get_state(&self) -> ViewportState {
		self.state
	}

	/// Active limits.
	pub fn config(&self) -> &ViewportConfig {
		&self.config
	}

	/// Screen point → graph point.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.state.offset_x) / self.state.scale,
			(sy - self.state.offset_y) / self.state.scale,
		)
	}

	/// Graph point → screen point.
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.state.scale + self.state.offset_x,
			gy * self.state.scale + self.state.offset_y,
		)
	}

	fn clamp_scale(&self, scale: f64) -> f64 {
		scale.clamp(self.config.min_scale, self.config.max_scale)
	}

	/// Multiply the scale by `factor`, keeping the graph point under
	/// `(anchor_x, anchor_y)` where it is.
	pub fn zoom(&mut self, factor: f64, anchor_x: f64, anchor_y: f64) {
		if !(factor.is_finite() && factor > 0.0 && anchor_x.is_finite() && anchor_y.is_finite()) {
			return;
		}
		let new_scale = self.clamp_scale(self.state.scale * factor);
		let ratio = new_scale / self.state.scale;
		self.state.offset_x = anchor_x - (anchor_x - self.state.offset_x) * ratio;
		self.state.offset_y = anchor_y - (anchor_y - self.state.offset_y) * ratio;
		self.state.scale = new_scale;
	}

	/// Translate by screen pixels.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		if dx.is_finite() && dy.is_finite() {
			self.state.offset_x += dx;
			self.state.offset_y += dy;
		}
	}

	/// Back to the identity transform; any gesture in progress is dropped.
	pub fn reset(&mut self) {
		self.state = ViewportState::default();
		self.gesture = GestureState::Idle;
	}

	/// Put graph point `(gx, gy)` in the middle of a `width` × `height` view.
	pub fn center_on(&mut self, gx: f64, gy: f64, width: f64, height: f64) {
		self.state.offset_x = width / 2.0 - gx * self.state.scale;
		self.state.offset_y = height / 2.0 - gy * self.state.scale;
	}

	/// Scale (within limits) and centre so the graph-space box
	/// `(min_x, min_y, max_x, max_y)` fits the view with padding.
	pub fn fit_bounds(&mut self, bounds: (f64, f64, f64, f64), width: f64, height: f64) {
		let (min_x, min_y, max_x, max_y) = bounds;
		let (bw, bh) = (max_x - min_x, max_y - min_y);
		let (aw, ah) = (
			width - 2.0 * self.config.fit_padding,
			height - 2.0 * self.config.fit_padding,
		);
		if bw > 0.0 && bh > 0.0 && aw > 0.0 && ah > 0.0 {
			self.state.scale = self.clamp_scale((aw / bw).min(ah / bh));
		}
		self.center_on((min_x + max_x) / 2.0, (min_y + max_y) / 2.0, width, height);
	}

	/// One wheel event at the cursor. Positive `delta_y` zooms out.
	pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) {
		if delta_y == 0.0 || !delta_y.is_finite() {
			return;
		}
		let factor = if delta_y > 0.0 {
			self.config.wheel_zoom_out
		} else {
			self.config.wheel_zoom_in
		};
		self.zoom(factor, sx, sy);
	}

	/// Pointer went down on empty canvas.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		trace!("pan from ({sx}, {sy})");
		self.gesture = GestureState::Panning(PanGesture {
			start_x: sx,
			start_y: sy,
			transform_start_x: self.state.offset_x,
			transform_start_y: self.state.offset_y,
		});
	}

	/// Pointer moved. Returns `false` when no pan is in progress.
	pub fn pan_to(&mut self, sx: f64, sy: f64) -> bool {
		let GestureState::Panning(pan) = self.gesture else {
			return false;
		};
		self.state.offset_x = pan.transform_start_x + (sx - pan.start_x);
		self.state.offset_y = pan.transform_start_y + (sy - pan.start_y);
		true
	}

	/// Pointer released or left.
	pub fn end_gesture(&mut self) {
		self.gesture = GestureState::Idle;
	}

	/// Whether a one-pointer pan is in progress.
	pub fn is_panning(&self) -> bool {
		matches!(self.gesture, GestureState::Panning(_))
	}

	/// Whether a two-finger pinch is in progress.
	pub fn is_pinching(&self) -> bool {
		matches!(self.gesture, GestureState::Pinching(_))
	}

	/// A finger was added. `touches` lists every finger now down.
	pub fn touch_start(&mut self, touches: &[(f64, f64)]) {
		self.enter_touch_mode(touches);
	}

	/// Fingers moved. `touches` lists every finger now down.
	pub fn touch_move(&mut self, touches: &[(f64, f64)]) {
		match (self.gesture, touches) {
			(GestureState::Panning(_), [only]) => {
				self.pan_to(only.0, only.1);
			}
			(GestureState::Pinching(pinch), [a, b, ..]) => self.pinch_to(pinch, *a, *b),
			_ => self.enter_touch_mode(touches),
		}
	}

	/// A finger lifted. `touches` lists the fingers still down.
	pub fn touch_end(&mut self, touches: &[(f64, f64)]) {
		self.enter_touch_mode(touches);
	}

	fn enter_touch_mode(&mut self, touches: &[(f64, f64)]) {
		match touches {
			[] => self.end_gesture(),
			[only] => self.begin_pan(only.0, only.1),
			[a, b, ..] => {
				let (mx, my) = midpoint(*a, *b);
				let (anchor_x, anchor_y) = self.screen_to_graph(mx, my);
				trace!("pinch around ({mx}, {my})");
				self.gesture = GestureState::Pinching(PinchGesture {
					start_distance: (a.0 - b.0).hypot(a.1 - b.1),
					start_scale: self.state.scale,
					anchor_x,
					anchor_y,
				});
			}
		}
	}

	fn pinch_to(&mut self, pinch: PinchGesture, a: (f64, f64), b: (f64, f64)) {
		let distance = (a.0 - b.0).hypot(a.1 - b.1);
		let factor = if pinch.start_distance > f64::EPSILON {
			distance / pinch.start_distance
		} else {
			1.0
		};
		if !factor.is_finite() {
			return;
		}
		let (mx, my) = midpoint(a, b);
		self.state.scale = self.clamp_scale(pinch.start_scale * factor);
		// The starting anchor follows the midpoint: zoom and pan in one.
		self.state.offset_x = mx - pinch.anchor_x * self.state.scale;
		self.state.offset_y = my - pinch.anchor_y * self.state.scale;
	}
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
	((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
