//! `fuzzynav-engine` – Mamdani fuzzy inference core.
//!
//! Turns named crisp readings into one crisp control value through
//! fuzzification, rule evaluation and sampled centroid defuzzification.
//!
//! # Modules
//!
//! - [`curve`] – [`MembershipCurve`][curve::MembershipCurve]: piecewise
//!   membership function over the normalized domain `[0, 1]`.
//! - [`set`] – [`FuzzySet`][set::FuzzySet]: a linguistic label bound to a
//!   curve.
//! - [`variable`] – [`FuzzyVariable`][variable::FuzzyVariable]: crisp domain
//!   `[min, max]` that fuzzifies values into per-set degrees.
//! - [`rule`] – [`FuzzyRule`][rule::FuzzyRule]: AND-conjunction of
//!   antecedents with a weighted consequent.
//! - [`system`] – [`FuzzyInferenceSystem`][system::FuzzyInferenceSystem]:
//!   owns the variables and rules and runs the full pipeline.
//! - [`builder`] – construction from a
//!   [`SystemDescriptor`][fuzzynav_types::SystemDescriptor] plus reference
//!   diagnostics and file loading.

pub mod builder;
pub mod curve;
pub mod rule;
pub mod set;
pub mod system;
pub mod variable;

pub use builder::{UnresolvedReference, load_descriptor, load_system};
pub use curve::{ControlPoint, Interpolation, MembershipCurve};
pub use rule::{Antecedent, FuzzyRule};
pub use set::FuzzySet;
pub use system::{FiredRule, FuzzyInferenceSystem, Inference, Outcome};
pub use variable::{FuzzyVariable, MembershipSnapshot, SetMemberships};
