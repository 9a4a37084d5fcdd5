//! [`FuzzySet`] – a linguistic label ("Near", "Fast", …) bound to a curve.

use crate::curve::MembershipCurve;

/// A named membership curve.  Owned by exactly one
/// [`FuzzyVariable`][crate::variable::FuzzyVariable].
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzySet {
    name: String,
    curve: MembershipCurve,
}

impl FuzzySet {
    pub fn new(name: impl Into<String>, curve: MembershipCurve) -> Self {
        Self {
            name: name.into(),
            curve,
        }
    }

    /// Trapezoidal set; see [`MembershipCurve::trapezoid`].
    pub fn trapezoid(
        name: impl Into<String>,
        left_zero: f32,
        left_one: f32,
        right_one: f32,
        right_zero: f32,
    ) -> Self {
        Self::new(
            name,
            MembershipCurve::trapezoid(left_zero, left_one, right_one, right_zero),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn curve(&self) -> &MembershipCurve {
        &self.curve
    }

    /// Degree of membership in `[0, 1]` for a normalized value.
    pub fn get_membership(&self, position_normalized: f32) -> f32 {
        self.curve.evaluate(position_normalized)
    }
}
