//! [`MembershipCurve`] – piecewise membership function over `[0, 1]`.
//!
//! A curve is an ordered list of `(position, value)` control points plus an
//! [`Interpolation`] rule.  Queries outside `[0, 1]` are clamped, and the
//! result is always clamped to `[0, 1]` even when a smooth curve overshoots.
//!
//! When several control points share a position, the curve takes the value
//! of the last one from that position onwards.  This is what lets a
//! trapezoid with `left_zero == left_one == 0` start at full membership.
//!
//! # Example
//!
//! ```rust
//! use fuzzynav_engine::curve::MembershipCurve;
//!
//! let curve = MembershipCurve::trapezoid(0.2, 0.4, 0.6, 0.8);
//! assert_eq!(curve.evaluate(0.5), 1.0);
//! assert!((curve.evaluate(0.3) - 0.5).abs() < 1e-5);
//! assert_eq!(curve.evaluate(0.9), 0.0);
//! ```

pub use fuzzynav_types::Interpolation;

/// Queries at (or extremely close to) the upper bound are evaluated this far
/// inside the domain so the final control point never wins on its own.
pub const UPPER_BOUND_NUDGE: f32 = 1e-3;

/// Clamp to `[0, 1]`, mapping NaN to `0`.
pub(crate) fn clamp01(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// One `(position, value)` sample of a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub position: f32,
    pub value: f32,
}

/// Piecewise-interpolated membership function.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipCurve {
    /// Sorted by position; ties keep their authored order.
    points: Vec<ControlPoint>,
    interpolation: Interpolation,
}

impl MembershipCurve {
    /// Build a linearly interpolated curve from `(position, value)` pairs.
    pub fn new(points: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut points: Vec<ControlPoint> = points
            .into_iter()
            .map(|(position, value)| ControlPoint { position, value })
            .collect();
        points.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self {
            points,
            interpolation: Interpolation::Linear,
        }
    }

    /// Standard trapezoid anchored at both domain edges:
    /// `(0,0) (left_zero,0) (left_one,1) (right_one,1) (right_zero,0) (1,0)`.
    ///
    /// The shoulders are expected to satisfy
    /// `left_zero ≤ left_one ≤ right_one ≤ right_zero` inside `[0, 1]`, but
    /// this is not checked.
    pub fn trapezoid(left_zero: f32, left_one: f32, right_one: f32, right_zero: f32) -> Self {
        Self::new([
            (0.0, 0.0),
            (left_zero, 0.0),
            (left_one, 1.0),
            (right_one, 1.0),
            (right_zero, 0.0),
            (1.0, 0.0),
        ])
    }

    /// Switch the interpolation rule.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Evaluate the curve at a normalized position.
    ///
    /// Returns `0.0` for a curve without control points.
    pub fn evaluate(&self, position: f32) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        let x = clamp01(position).min(1.0 - UPPER_BOUND_NUDGE);

        // Index of the first point strictly to the right of `x`.
        let idx = self.points.partition_point(|p| p.position <= x);
        let raw = if idx == 0 {
            self.points[0].value
        } else if idx == self.points.len() {
            self.points[idx - 1].value
        } else {
            let lo = self.points[idx - 1];
            let hi = self.points[idx];
            let u = (x - lo.position) / (hi.position - lo.position);
            let u = match self.interpolation {
                Interpolation::Linear => u,
                Interpolation::Smooth => u * u * (3.0 - 2.0 * u),
            };
            lo.value + (hi.value - lo.value) * u
        };
        clamp01(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trapezoid_shoulders() {
        let c = MembershipCurve::trapezoid(0.2, 0.4, 0.6, 0.8);
        assert_eq!(c.evaluate(0.2), 0.0);
        assert_eq!(c.evaluate(0.4), 1.0);
        assert_eq!(c.evaluate(0.6), 1.0);
        assert_eq!(c.evaluate(0.8), 0.0);
    }

    #[test]
    fn trapezoid_is_monotonic_between_shoulders() {
        let c = MembershipCurve::trapezoid(0.2, 0.4, 0.6, 0.8);
        let mut prev = c.evaluate(0.2);
        for i in 1..=20 {
            let v = c.evaluate(0.2 + 0.01 * i as f32);
            assert!(v >= prev, "rising edge must not decrease");
            prev = v;
        }
        let mut prev = c.evaluate(0.6);
        for i in 1..=20 {
            let v = c.evaluate(0.6 + 0.01 * i as f32);
            assert!(v <= prev, "falling edge must not increase");
            prev = v;
        }
    }

    #[test]
    fn left_shoulder_at_origin_starts_full() {
        // Coincident points at 0: the last one (value 1) wins.
        let c = MembershipCurve::trapezoid(0.0, 0.0, 0.1, 0.3);
        assert_eq!(c.evaluate(0.0), 1.0);
        assert!((c.evaluate(0.2) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn right_shoulder_at_one_stays_full_at_boundary() {
        // Without the inward nudge the trailing (1, 0) point would win.
        let c = MembershipCurve::trapezoid(0.5, 0.7, 1.0, 1.0);
        assert_eq!(c.evaluate(1.0), 1.0);
        assert_eq!(c.evaluate(5.0), 1.0);
    }

    #[test]
    fn query_is_clamped() {
        let c = MembershipCurve::trapezoid(0.0, 0.0, 0.1, 0.3);
        assert_eq!(c.evaluate(-3.0), 1.0);
        assert_eq!(c.evaluate(f32::NAN), 1.0);
    }

    #[test]
    fn output_is_clamped() {
        let c = MembershipCurve::new([(0.0, -1.0), (0.5, 2.0), (1.0, 0.5)]);
        assert_eq!(c.evaluate(0.0), 0.0);
        assert_eq!(c.evaluate(0.5), 1.0);
        for i in 0..=10 {
            let v = c.evaluate(i as f32 / 10.0);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn unsorted_points_are_ordered() {
        let c = MembershipCurve::new([(1.0, 0.0), (0.0, 0.0), (0.5, 1.0)]);
        let positions: Vec<f32> = c.points().iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0.0, 0.5, 1.0]);
        assert!((c.evaluate(0.25) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn empty_curve_is_zero() {
        let c = MembershipCurve::new(Vec::<(f32, f32)>::new());
        assert_eq!(c.evaluate(0.5), 0.0);
    }

    #[test]
    fn smooth_interpolation_eases_but_keeps_endpoints() {
        let c = MembershipCurve::new([(0.0, 0.0), (0.5, 1.0)])
            .with_interpolation(Interpolation::Smooth);
        assert_eq!(c.interpolation(), Interpolation::Smooth);
        assert!((c.evaluate(0.25) - 0.5).abs() < 1e-5);
        // Flat tangents: a quarter of the way up the ramp is below linear.
        assert!(c.evaluate(0.125) < 0.25);
        assert_eq!(c.evaluate(0.5), 1.0);
    }
}
