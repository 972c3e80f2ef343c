use std::f64::consts::TAU;

/// Separation substituted for coincident points.
pub const EPSILON: f64 = 1e-6;

pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	(a.0 - b.0).hypot(a.1 - b.1)
}

/// Point on the boundary of the `target` circle where a line from `source`
/// should stop. Coincident centres return the target centre.
pub fn edge_point(target: (f64, f64), target_radius: f64, source: (f64, f64)) -> (f64, f64) {
	let (dx, dy) = (source.0 - target.0, source.1 - target.1);
	let dist = dx.hypot(dy);
	if dist < EPSILON || !dist.is_finite() {
		return target;
	}
	(
		target.0 + dx / dist * target_radius,
		target.1 + dy / dist * target_radius,
	)
}

/// Deterministic tie-break offset of length [`EPSILON`] for a coincident pair.
pub fn jiggle(a: usize, b: usize) -> (f64, f64) {
	let angle = ((a as f64) * 0.618_034 + (b as f64) * 0.414_214 + 0.37) * TAU;
	(angle.cos() * EPSILON, angle.sin() * EPSILON)
}
