//! [`FuzzyRule`] – `IF v1 is S1 AND v2 is S2 … THEN consequent`.
//!
//! Firing strength is the fuzzy AND (minimum) of the antecedent degrees,
//! scaled by the rule weight:
//!
//! ```text
//! strength = clamp01(min(μ(v_i, S_i)) × weight)
//! ```
//!
//! Antecedents are by-name references.  A reference to a variable or set
//! that is not in the membership snapshot counts as membership `0`, so a
//! rule with a typo simply never fires instead of failing the whole tick.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use fuzzynav_engine::FuzzyRule;
//!
//! let rule = FuzzyRule::new("brake", "Slow", 0.5).with_antecedent("Dist", "Near");
//!
//! let mut snapshot = HashMap::new();
//! snapshot.insert("Dist".to_string(), HashMap::from([("Near".to_string(), 0.8)]));
//!
//! assert!((rule.evaluate(&snapshot) - 0.4).abs() < 1e-6);
//! ```

use std::fmt;

use crate::curve::clamp01;
use crate::variable::MembershipSnapshot;

/// One `variable is set` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Antecedent {
    pub variable: String,
    pub set: String,
}

/// AND-conjunction of antecedents voting for one output set.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRule {
    name: String,
    antecedents: Vec<Antecedent>,
    consequent: String,
    weight: f32,
}

impl FuzzyRule {
    /// Create a rule with no antecedents.  `weight` is clamped to `[0, 1]`.
    pub fn new(name: impl Into<String>, consequent: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            antecedents: Vec::new(),
            consequent: consequent.into(),
            weight: clamp01(weight),
        }
    }

    /// Append an antecedent, builder style.
    pub fn with_antecedent(mut self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.add_antecedent(variable, set);
        self
    }

    pub fn add_antecedent(&mut self, variable: impl Into<String>, set: impl Into<String>) {
        self.antecedents.push(Antecedent {
            variable: variable.into(),
            set: set.into(),
        });
    }

    /// Diagnostic name; has no effect on inference.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn antecedents(&self) -> &[Antecedent] {
        &self.antecedents
    }

    /// Name of the output set this rule votes for.
    pub fn consequent(&self) -> &str {
        &self.consequent
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Firing strength in `[0, 1]` against a membership snapshot.
    ///
    /// Rules without antecedents never fire.
    pub fn evaluate(&self, memberships: &MembershipSnapshot) -> f32 {
        if self.antecedents.is_empty() {
            return 0.0;
        }
        let mut min = 1.0_f32;
        for a in &self.antecedents {
            let degree = memberships
                .get(&a.variable)
                .and_then(|sets| sets.get(&a.set))
                .copied()
                .unwrap_or(0.0);
            min = min.min(degree);
            if min <= 0.0 {
                return 0.0;
            }
        }
        clamp01(min * self.weight)
    }
}

impl fmt::Display for FuzzyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF ")?;
        for (i, a) in self.antecedents.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{} is {}", a.variable, a.set)?;
        }
        write!(f, " THEN {} (w={:.2})", self.consequent, self.weight)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn snapshot() -> MembershipSnapshot {
        let mut m = MembershipSnapshot::new();
        m.insert(
            "Front".to_string(),
            HashMap::from([("Near".to_string(), 0.7), ("Far".to_string(), 0.0)]),
        );
        m.insert(
            "Target".to_string(),
            HashMap::from([("Near".to_string(), 0.4)]),
        );
        m
    }

    #[test]
    fn strength_is_minimum_of_antecedents() {
        let rule = FuzzyRule::new("r", "Slow", 1.0)
            .with_antecedent("Front", "Near")
            .with_antecedent("Target", "Near");
        assert!((rule.evaluate(&snapshot()) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn weight_scales_strength() {
        let rule = FuzzyRule::new("r", "Slow", 0.5).with_antecedent("Front", "Near");
        assert!((rule.evaluate(&snapshot()) - 0.35).abs() < 1e-6);
    }

    #[test]
    fn weight_clamped_at_construction() {
        assert_eq!(FuzzyRule::new("hi", "X", 3.0).weight(), 1.0);
        assert_eq!(FuzzyRule::new("lo", "X", -1.0).weight(), 0.0);
        assert_eq!(FuzzyRule::new("nan", "X", f32::NAN).weight(), 0.0);
    }

    #[test]
    fn empty_rule_never_fires() {
        let rule = FuzzyRule::new("empty", "Slow", 1.0);
        assert_eq!(rule.evaluate(&snapshot()), 0.0);
    }

    #[test]
    fn unknown_variable_counts_as_zero() {
        let rule = FuzzyRule::new("r", "Slow", 1.0)
            .with_antecedent("Front", "Near")
            .with_antecedent("Rear", "Near");
        assert_eq!(rule.evaluate(&snapshot()), 0.0);
    }

    #[test]
    fn unknown_set_counts_as_zero() {
        let rule = FuzzyRule::new("r", "Slow", 1.0).with_antecedent("Target", "Far");
        assert_eq!(rule.evaluate(&snapshot()), 0.0);
    }

    #[test]
    fn zero_membership_short_circuits() {
        let rule = FuzzyRule::new("r", "Fast", 1.0)
            .with_antecedent("Front", "Far")
            .with_antecedent("Target", "Near");
        assert_eq!(rule.evaluate(&snapshot()), 0.0);
    }

    #[test]
    fn display_reads_like_a_rule() {
        let rule = FuzzyRule::new("r", "Slow", 1.0)
            .with_antecedent("Front", "Near")
            .with_antecedent("Target", "Near");
        assert_eq!(
            rule.to_string(),
            "IF Front is Near AND Target is Near THEN Slow (w=1.00)"
        );
    }
}
