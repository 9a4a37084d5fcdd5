//! [`FuzzyInferenceSystem`] – the fuzzify → evaluate → defuzzify pipeline.
//!
//! 1. **Fuzzification** – every input variable fuzzifies its crisp value.
//!    A variable absent from the input map is evaluated at its `min`.
//! 2. **Rule evaluation** – every rule computes its firing strength; rules
//!    with strength `> 0` are *fired*.
//! 3. **Defuzzification** – Mamdani implication and centroid over
//!    `N = max(6, sampling_resolution)` evenly spaced samples:
//!
//! ```text
//! μ(t)   = max over fired rules of min(consequent(t), strength)
//! output = Σ μ(t)·denormalize(t) / Σ μ(t)
//! ```
//!
//! When nothing fires, or the aggregated weight is degenerate (`≤ 1e-6`),
//! the midpoint of the output domain is returned instead.  The only error is
//! a missing output variable.
//!
//! No state is kept between calls: a system is configured once and then
//! evaluated read-only on every control tick.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use fuzzynav_engine::{FuzzyInferenceSystem, FuzzyRule, FuzzySet, FuzzyVariable};
//!
//! let mut dist = FuzzyVariable::new("Dist", 0.0, 10.0);
//! dist.add_set(FuzzySet::trapezoid("Near", 0.0, 0.0, 0.1, 0.3)).unwrap();
//! dist.add_set(FuzzySet::trapezoid("Far", 0.5, 0.7, 1.0, 1.0)).unwrap();
//!
//! let mut speed = FuzzyVariable::new("Speed", 0.0, 1.0);
//! speed.add_set(FuzzySet::trapezoid("Slow", 0.0, 0.0, 0.1, 0.3)).unwrap();
//! speed.add_set(FuzzySet::trapezoid("Fast", 0.5, 0.7, 1.0, 1.0)).unwrap();
//!
//! let mut fis = FuzzyInferenceSystem::new("speed");
//! fis.add_input(dist).unwrap();
//! fis.set_output(speed);
//! fis.add_rule(FuzzyRule::new("A", "Slow", 1.0).with_antecedent("Dist", "Near"));
//! fis.add_rule(FuzzyRule::new("B", "Fast", 1.0).with_antecedent("Dist", "Far"));
//!
//! let slow = fis.calculate(&HashMap::from([("Dist".to_string(), 0.0)])).unwrap();
//! let fast = fis.calculate(&HashMap::from([("Dist".to_string(), 10.0)])).unwrap();
//! assert!(slow < 0.2);
//! assert!(fast > 0.7);
//! ```

use std::collections::HashMap;
use std::fmt;

use fuzzynav_types::FuzzyError;
use tracing::{debug, instrument, trace, warn};

use crate::rule::FuzzyRule;
use crate::set::FuzzySet;
use crate::variable::{FuzzyVariable, MembershipSnapshot};

/// Sample count used when none is configured.
pub const DEFAULT_SAMPLING_RESOLUTION: usize = 60;

/// Lower bound on the number of defuzzification samples.
pub const MIN_SAMPLING_RESOLUTION: usize = 6;

/// Aggregated weight at or below which the centroid is considered undefined.
const DEGENERATE_WEIGHT: f32 = 1e-6;

// ────────────────────────────────────────────────────────────────────────────
// Inference report
// ────────────────────────────────────────────────────────────────────────────

/// A rule that fired during one inference run.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredRule {
    /// Position of the rule in the system's rule list.
    pub index: usize,
    pub name: String,
    pub consequent: String,
    pub strength: f32,
}

/// How the crisp output of a run was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Regular centroid of the aggregated output membership.
    Centroid,
    /// No rule had a positive strength; output is the domain midpoint.
    NoRuleFired,
    /// Rules fired but their consequents contributed no weight (e.g. they
    /// name sets missing from the output variable); output is the midpoint.
    DegenerateAggregation,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Centroid => write!(f, "centroid"),
            Outcome::NoRuleFired => write!(f, "no rule fired"),
            Outcome::DegenerateAggregation => write!(f, "degenerate aggregation"),
        }
    }
}

/// Full result of [`FuzzyInferenceSystem::infer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub memberships: MembershipSnapshot,
    /// Fired rules in rule-list order.
    pub fired: Vec<FiredRule>,
    pub output: f32,
    pub outcome: Outcome,
}

// ────────────────────────────────────────────────────────────────────────────
// FuzzyInferenceSystem
// ────────────────────────────────────────────────────────────────────────────

/// Input variables, one output variable, and a rule list.
///
/// Build with [`FuzzyInferenceSystem::add_input`],
/// [`FuzzyInferenceSystem::set_output`] and [`FuzzyInferenceSystem::add_rule`]
/// (or from a descriptor, see [`crate::builder`]), then call
/// [`FuzzyInferenceSystem::calculate`] once per tick.
#[derive(Debug, Clone)]
pub struct FuzzyInferenceSystem {
    name: String,
    inputs: Vec<FuzzyVariable>,
    input_index: HashMap<String, usize>,
    output: Option<FuzzyVariable>,
    rules: Vec<FuzzyRule>,
    sampling_resolution: usize,
}

impl FuzzyInferenceSystem {
    /// Create an empty system with the default sampling resolution.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            input_index: HashMap::new(),
            output: None,
            rules: Vec::new(),
            sampling_resolution: DEFAULT_SAMPLING_RESOLUTION,
        }
    }

    /// Override the number of defuzzification samples.  Values below
    /// [`MIN_SAMPLING_RESOLUTION`] are raised to it at evaluation time.
    pub fn with_sampling_resolution(mut self, samples: usize) -> Self {
        self.sampling_resolution = samples;
        self
    }

    pub fn set_sampling_resolution(&mut self, samples: usize) {
        self.sampling_resolution = samples;
    }

    /// Register an input variable.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DuplicateVariable`] when an input with the same
    /// name is already registered.
    pub fn add_input(&mut self, variable: FuzzyVariable) -> Result<(), FuzzyError> {
        if self.input_index.contains_key(variable.name()) {
            return Err(FuzzyError::DuplicateVariable(variable.name().to_string()));
        }
        self.input_index
            .insert(variable.name().to_string(), self.inputs.len());
        self.inputs.push(variable);
        Ok(())
    }

    /// Install the output variable, replacing any previous one.
    pub fn set_output(&mut self, variable: FuzzyVariable) {
        self.output = Some(variable);
    }

    /// Append a rule.  Order is kept for diagnostics only.
    pub fn add_rule(&mut self, rule: FuzzyRule) {
        self.rules.push(rule);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input variables in registration order.
    pub fn inputs(&self) -> &[FuzzyVariable] {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&FuzzyVariable> {
        self.input_index.get(name).map(|&i| &self.inputs[i])
    }

    pub fn output(&self) -> Option<&FuzzyVariable> {
        self.output.as_ref()
    }

    pub fn rules(&self) -> &[FuzzyRule] {
        &self.rules
    }

    /// Configured resolution, before the [`MIN_SAMPLING_RESOLUTION`] floor.
    pub fn sampling_resolution(&self) -> usize {
        self.sampling_resolution
    }

    /// Run the pipeline and return the crisp output.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::MissingOutput`] when no output variable has been
    /// set.
    pub fn calculate(&self, inputs: &HashMap<String, f32>) -> Result<f32, FuzzyError> {
        self.infer(inputs).map(|inference| inference.output)
    }

    /// Run the pipeline and return every intermediate stage.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::MissingOutput`] when no output variable has been
    /// set.
    #[instrument(level = "debug", skip_all, fields(system = %self.name))]
    pub fn infer(&self, inputs: &HashMap<String, f32>) -> Result<Inference, FuzzyError> {
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| FuzzyError::MissingOutput(self.name.clone()))?;

        let memberships = self.fuzzify(inputs);
        let fired = self.fire(&memberships);

        if fired.is_empty() {
            warn!(system = %self.name, "no rule fired; returning output midpoint");
            return Ok(Inference {
                memberships,
                fired,
                output: output.midpoint(),
                outcome: Outcome::NoRuleFired,
            });
        }
        debug!(fired = fired.len(), "rules fired");

        let (value, outcome) = match self.centroid(output, &fired) {
            Some(value) => (value, Outcome::Centroid),
            None => {
                warn!(system = %self.name, "aggregated output weight is zero; returning output midpoint");
                (output.midpoint(), Outcome::DegenerateAggregation)
            }
        };
        debug!(output = value, %outcome, "inference complete");

        Ok(Inference {
            memberships,
            fired,
            output: value,
            outcome,
        })
    }

    // ── Stage 1 ──────────────────────────────────────────────────────────
    fn fuzzify(&self, inputs: &HashMap<String, f32>) -> MembershipSnapshot {
        self.inputs
            .iter()
            .map(|variable| {
                let value = match inputs.get(variable.name()) {
                    Some(&v) => v,
                    None => {
                        debug!(variable = variable.name(), "input missing; using domain minimum");
                        variable.min()
                    }
                };
                let degrees = variable.fuzzify(value);
                trace!(variable = variable.name(), value, degrees = ?degrees, "fuzzified");
                (variable.name().to_string(), degrees)
            })
            .collect()
    }

    // ── Stage 2 ──────────────────────────────────────────────────────────
    fn fire(&self, memberships: &MembershipSnapshot) -> Vec<FiredRule> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                let strength = rule.evaluate(memberships);
                if strength > 0.0 {
                    trace!(rule = %rule, strength, "rule fired");
                    Some(FiredRule {
                        index,
                        name: rule.name().to_string(),
                        consequent: rule.consequent().to_string(),
                        strength,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    // ── Stage 3 ──────────────────────────────────────────────────────────
    /// Sampled centroid of the clipped-max aggregation, or `None` when the
    /// aggregated weight is degenerate.
    fn centroid(&self, output: &FuzzyVariable, fired: &[FiredRule]) -> Option<f32> {
        // Rules whose consequent is not an output set contribute nothing.
        let clipped: Vec<(&FuzzySet, f32)> = fired
            .iter()
            .filter_map(|f| output.set(&f.consequent).map(|set| (set, f.strength)))
            .collect();

        let n = self.sampling_resolution.max(MIN_SAMPLING_RESOLUTION);
        let last = (n - 1) as f32;

        let mut sum_weighted = 0.0_f32;
        let mut sum_weights = 0.0_f32;
        for i in 0..n {
            let t = i as f32 / last;
            let aggregated = clipped
                .iter()
                .map(|(set, strength)| set.get_membership(t).min(*strength))
                .fold(0.0_f32, f32::max);
            sum_weighted += aggregated * output.denormalize(t);
            sum_weights += aggregated;
        }

        if sum_weights <= DEGENERATE_WEIGHT {
            return None;
        }
        let lo = output.min().min(output.max());
        let hi = output.min().max(output.max());
        Some((sum_weighted / sum_weights).clamp(lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::MembershipCurve;

    fn inputs(pairs: &[(&str, f32)]) -> HashMap<String, f32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    /// Dist ∈ [0,10] {Near, Far} → Speed ∈ [0,1] {Slow, Fast}.
    fn two_rule_system() -> FuzzyInferenceSystem {
        let mut dist = FuzzyVariable::new("Dist", 0.0, 10.0);
        dist.add_set(FuzzySet::trapezoid("Near", 0.0, 0.0, 0.1, 0.3)).unwrap();
        dist.add_set(FuzzySet::trapezoid("Far", 0.5, 0.7, 1.0, 1.0)).unwrap();

        let mut speed = FuzzyVariable::new("Speed", 0.0, 1.0);
        speed.add_set(FuzzySet::trapezoid("Slow", 0.0, 0.0, 0.1, 0.3)).unwrap();
        speed.add_set(FuzzySet::trapezoid("Fast", 0.5, 0.7, 1.0, 1.0)).unwrap();

        let mut fis = FuzzyInferenceSystem::new("speed");
        fis.add_input(dist).unwrap();
        fis.set_output(speed);
        fis.add_rule(FuzzyRule::new("A", "Slow", 1.0).with_antecedent("Dist", "Near"));
        fis.add_rule(FuzzyRule::new("B", "Fast", 1.0).with_antecedent("Dist", "Far"));
        fis
    }

    /// One input `X` ∈ [0,1] with a single always-full set, and an output
    /// `Y` ∈ [0,1] carrying the given sets.
    fn single_input_system(out_sets: Vec<FuzzySet>) -> FuzzyInferenceSystem {
        let mut x = FuzzyVariable::new("X", 0.0, 1.0);
        x.add_set(FuzzySet::new("All", MembershipCurve::new([(0.0, 1.0), (1.0, 1.0)])))
            .unwrap();
        let mut y = FuzzyVariable::new("Y", 0.0, 1.0);
        for s in out_sets {
            y.add_set(s).unwrap();
        }
        let mut fis = FuzzyInferenceSystem::new("single");
        fis.add_input(x).unwrap();
        fis.set_output(y);
        fis
    }

    // ------------------------------------------------------------------ scenario

    #[test]
    fn near_obstacle_drives_slow() {
        let fis = two_rule_system();
        let inf = fis.infer(&inputs(&[("Dist", 0.0)])).unwrap();
        assert_eq!(inf.fired.len(), 1);
        assert_eq!(inf.fired[0].name, "A");
        assert!((inf.fired[0].strength - 1.0).abs() < 1e-6);
        assert_eq!(inf.outcome, Outcome::Centroid);
        assert!(inf.output > 0.08 && inf.output < 0.2, "got {}", inf.output);
    }

    #[test]
    fn far_obstacle_drives_fast() {
        let fis = two_rule_system();
        let inf = fis.infer(&inputs(&[("Dist", 10.0)])).unwrap();
        assert_eq!(inf.fired.len(), 1);
        assert_eq!(inf.fired[0].name, "B");
        assert!(inf.output > 0.75 && inf.output <= 0.9, "got {}", inf.output);
    }

    #[test]
    fn ambiguous_distance_lands_mid_range() {
        let fis = two_rule_system();
        let out = fis.calculate(&inputs(&[("Dist", 5.0)])).unwrap();
        assert!(out > 0.3 && out < 0.7, "got {out}");
    }

    #[test]
    fn partial_membership_stays_on_its_side() {
        let fis = two_rule_system();
        let out = fis.calculate(&inputs(&[("Dist", 2.0)])).unwrap();
        assert!(out < 0.3, "got {out}");
    }

    // ------------------------------------------------------------------ fallbacks

    #[test]
    fn missing_output_is_an_error() {
        let mut fis = FuzzyInferenceSystem::new("headless");
        fis.add_input(FuzzyVariable::new("Dist", 0.0, 10.0)).unwrap();
        let err = fis.calculate(&HashMap::new()).unwrap_err();
        assert_eq!(err, FuzzyError::MissingOutput("headless".to_string()));
    }

    #[test]
    fn missing_input_uses_domain_minimum() {
        let fis = two_rule_system();
        let missing = fis.calculate(&HashMap::new()).unwrap();
        let at_min = fis.calculate(&inputs(&[("Dist", 0.0)])).unwrap();
        assert_eq!(missing, at_min);
    }

    #[test]
    fn no_rules_returns_midpoint() {
        let mut fis = two_rule_system();
        fis.rules.clear();
        let mut steer = FuzzyVariable::new("Steer", -1.0, 3.0);
        steer.add_set(FuzzySet::trapezoid("L", 0.0, 0.0, 0.2, 0.4)).unwrap();
        fis.set_output(steer);
        let inf = fis.infer(&inputs(&[("Dist", 0.0)])).unwrap();
        assert_eq!(inf.output, 1.0);
        assert_eq!(inf.outcome, Outcome::NoRuleFired);
        assert!(inf.fired.is_empty());
    }

    #[test]
    fn rules_on_unknown_sets_return_midpoint() {
        let mut fis = two_rule_system();
        fis.rules.clear();
        fis.add_rule(FuzzyRule::new("typo", "Slow", 1.0).with_antecedent("Dist", "Nera"));
        let inf = fis.infer(&inputs(&[("Dist", 0.0)])).unwrap();
        assert_eq!(inf.output, 0.5);
        assert_eq!(inf.outcome, Outcome::NoRuleFired);
    }

    #[test]
    fn unknown_consequent_gives_degenerate_midpoint() {
        let mut fis = two_rule_system();
        fis.rules.clear();
        fis.add_rule(FuzzyRule::new("ghost", "Reverse", 1.0).with_antecedent("Dist", "Near"));
        let inf = fis.infer(&inputs(&[("Dist", 0.0)])).unwrap();
        assert_eq!(inf.fired.len(), 1);
        assert_eq!(inf.outcome, Outcome::DegenerateAggregation);
        assert_eq!(inf.output, 0.5);
    }

    #[test]
    fn unknown_consequent_does_not_disturb_valid_rules() {
        let mut fis = two_rule_system();
        let baseline = fis.calculate(&inputs(&[("Dist", 0.0)])).unwrap();
        fis.add_rule(FuzzyRule::new("ghost", "Reverse", 1.0).with_antecedent("Dist", "Near"));
        let with_ghost = fis.calculate(&inputs(&[("Dist", 0.0)])).unwrap();
        assert_eq!(baseline, with_ghost);
    }

    // ------------------------------------------------------------------ properties

    #[test]
    fn calculate_is_deterministic() {
        let fis = two_rule_system();
        let input = inputs(&[("Dist", 2.7)]);
        let first = fis.calculate(&input).unwrap();
        for _ in 0..10 {
            assert_eq!(fis.calculate(&input).unwrap(), first);
        }
    }

    #[test]
    fn output_stays_in_domain() {
        let fis = two_rule_system();
        for i in -20..=40 {
            let d = i as f32 * 0.5;
            let out = fis.calculate(&inputs(&[("Dist", d)])).unwrap();
            assert!((0.0..=1.0).contains(&out), "Dist={d} gave {out}");
            assert!(out.is_finite());
        }
        for d in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let out = fis.calculate(&inputs(&[("Dist", d)])).unwrap();
            assert!((0.0..=1.0).contains(&out), "Dist={d} gave {out}");
        }
    }

    #[test]
    fn single_dominant_rule_converges_to_peak() {
        let p = 0.6;
        let mut fis = single_input_system(Vec::new());
        let mut steer = FuzzyVariable::new("Steer", -1.0, 1.0);
        steer
            .add_set(FuzzySet::trapezoid("Peak", p - 0.02, p, p, p + 0.02))
            .unwrap();
        fis.set_output(steer.clone());
        fis.add_rule(FuzzyRule::new("only", "Peak", 1.0).with_antecedent("X", "All"));
        fis.set_sampling_resolution(601);

        let out = fis.calculate(&inputs(&[("X", 0.5)])).unwrap();
        assert!((out - steer.denormalize(p)).abs() < 0.01, "got {out}");
    }

    #[test]
    fn halving_weight_keeps_symmetric_centroid() {
        let mid = || FuzzySet::trapezoid("Mid", 0.3, 0.4, 0.6, 0.7);

        let mut full = single_input_system(vec![mid()]);
        full.add_rule(FuzzyRule::new("r", "Mid", 1.0).with_antecedent("X", "All"));
        let mut half = single_input_system(vec![mid()]);
        half.add_rule(FuzzyRule::new("r", "Mid", 0.5).with_antecedent("X", "All"));

        let input = inputs(&[("X", 0.5)]);
        let a = full.infer(&input).unwrap();
        let b = half.infer(&input).unwrap();
        assert!((a.output - 0.5).abs() < 1e-3);
        assert!((a.output - b.output).abs() < 1e-3);
        assert!((b.fired[0].strength - 0.5).abs() < 1e-6);
    }

    #[test]
    fn competing_rules_blend_by_strength() {
        let sets = || {
            vec![
                FuzzySet::trapezoid("Low", 0.1, 0.2, 0.2, 0.3),
                FuzzySet::trapezoid("High", 0.7, 0.8, 0.8, 0.9),
            ]
        };
        let blended = |high_weight: f32| {
            let mut fis = single_input_system(sets());
            fis.add_rule(FuzzyRule::new("low", "Low", 1.0).with_antecedent("X", "All"));
            fis.add_rule(FuzzyRule::new("high", "High", high_weight).with_antecedent("X", "All"));
            fis.calculate(&inputs(&[("X", 0.5)])).unwrap()
        };

        let equal = blended(1.0);
        let halved = blended(0.5);
        let quarter = blended(0.25);
        assert!((equal - 0.5).abs() < 1e-3, "got {equal}");
        assert!(halved < equal && halved > 0.2, "got {halved}");
        assert!(quarter < halved && quarter > 0.2, "got {quarter}");
    }

    #[test]
    fn sampling_resolution_has_a_floor() {
        let mut fis = two_rule_system();
        fis.set_sampling_resolution(0);
        let coarse = fis.calculate(&inputs(&[("Dist", 10.0)])).unwrap();
        fis.set_sampling_resolution(MIN_SAMPLING_RESOLUTION);
        let floor = fis.calculate(&inputs(&[("Dist", 10.0)])).unwrap();
        assert_eq!(coarse, floor);
        assert!(coarse.is_finite());
    }

    #[test]
    fn fired_rules_keep_rule_order() {
        let mut fis = two_rule_system();
        fis.add_rule(FuzzyRule::new("C", "Slow", 0.3).with_antecedent("Dist", "Near"));
        let inf = fis.infer(&inputs(&[("Dist", 0.0)])).unwrap();
        let order: Vec<usize> = inf.fired.iter().map(|f| f.index).collect();
        assert_eq!(order, vec![0, 2]);
    }

    #[test]
    fn duplicate_input_rejected() {
        let mut fis = two_rule_system();
        let err = fis.add_input(FuzzyVariable::new("Dist", 0.0, 1.0)).unwrap_err();
        assert_eq!(err, FuzzyError::DuplicateVariable("Dist".to_string()));
        assert_eq!(fis.inputs().len(), 1);
        assert_eq!(fis.input("Dist").map(|v| v.max()), Some(10.0));
    }

    #[test]
    fn memberships_cover_every_input() {
        let fis = two_rule_system();
        let inf = fis.infer(&inputs(&[("Dist", 4.0)])).unwrap();
        assert_eq!(inf.memberships.len(), 1);
        assert_eq!(inf.memberships["Dist"].len(), 2);
    }

    #[test]
    fn shared_system_evaluates_from_many_threads() {
        let fis = two_rule_system();
        let expected = fis.calculate(&inputs(&[("Dist", 0.0)])).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| fis.calculate(&inputs(&[("Dist", 0.0)])).unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
