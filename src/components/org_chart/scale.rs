//! Weight → radius mapping.
//!
//! Node *area* grows linearly with weight (role count), so a team with twice
//! the roles reads as twice the ink rather than four times.

use std::f64::consts::PI;

/// Area of a weight-zero node, in graph units².
pub const MIN_AREA: f64 = 1600.0;
/// Area added per unit of weight.
pub const AREA_PER_UNIT: f64 = 400.0;
/// Area ceiling; weights past `(MAX_AREA - MIN_AREA) / AREA_PER_UNIT` saturate.
pub const MAX_AREA: f64 = 16_000.0;

/// Smallest radius [`radius`] can return.
pub fn min_radius() -> f64 {
	(MIN_AREA / PI).sqrt()
}

/// Largest radius [`radius`] can return.
pub fn max_radius() -> f64 {
	(MAX_AREA / PI).sqrt()
}

/// Display radius for a node of the given weight.
pub fn radius(weight: u32) -> f64 {
	let area = (MIN_AREA + weight as f64 * AREA_PER_UNIT).clamp(MIN_AREA, MAX_AREA);
	(area / PI).sqrt()
}

/// Input weights are signed; negatives count as zero.
pub fn clamp_weight(weight: i64) -> u32 {
	u32::try_from(weight.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn zero_weight_is_min_radius() {
		assert_eq!(radius(0), min_radius());
	}

	#[test]
	fn area_is_linear_below_the_ceiling() {
		let area = |w| PI * radius(w).powi(2);
		let step = area(3) - area(2);
		assert!((step - AREA_PER_UNIT).abs() < 1e-6);
		assert!((area(10) - area(5) - 5.0 * AREA_PER_UNIT).abs() < 1e-6);
	}

	#[test]
	fn large_weights_saturate() {
		assert_eq!(radius(36), max_radius());
		assert_eq!(radius(10_000), max_radius());
		assert_eq!(radius(u32::MAX), max_radius());
	}

	#[test]
	fn negative_weights_count_as_zero() {
		assert_eq!(clamp_weight(-7), 0);
		assert_eq!(clamp_weight(12), 12);
		assert_eq!(clamp_weight(i64::MAX), u32::MAX);
	}

	proptest! {
		#[test]
		fn radius_is_monotonic(a in any::<u32>(), b in any::<u32>()) {
			let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
			prop_assert!(radius(lo) <= radius(hi));
		}

		#[test]
		fn radius_is_bounded(w in any::<u32>()) {
			let r = radius(w);
			prop_assert!(r >= min_radius() && r <= max_radius());
		}
	}
}
