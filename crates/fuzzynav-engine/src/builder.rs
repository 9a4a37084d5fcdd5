//! Building a [`FuzzyInferenceSystem`] from a [`SystemDescriptor`].
//!
//! Structural problems are rejected here, once, instead of being discovered
//! every tick: duplicate variable or set names, empty or non-finite curves,
//! and non-finite domains.  Curves that leave the unit square are accepted
//! with a warning; evaluation clamps their membership.
//!
//! Dangling by-name references are a different matter.  Rule sets authored
//! against older variable layouts may name sets that no longer exist; such
//! rules are kept and evaluate with membership `0` (or contribute nothing,
//! for an unknown consequent).  The builder reports them through
//! [`tracing::warn!`] and [`FuzzyInferenceSystem::diagnostics`] but never
//! refuses to build.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use fuzzynav_engine::FuzzyInferenceSystem;
//! use fuzzynav_types::SystemDescriptor;
//!
//! let raw = r#"
//! name = "speed"
//!
//! [[inputs]]
//! name = "Dist"
//! min = 0.0
//! max = 10.0
//! sets = [
//!     { name = "Near", curve = { shape = "trapezoid", left_zero = 0.0, left_one = 0.0, right_one = 0.1, right_zero = 0.3 } },
//! ]
//!
//! [output]
//! name = "Speed"
//! min = 0.0
//! max = 1.0
//! sets = [
//!     { name = "Slow", curve = { shape = "trapezoid", left_zero = 0.0, left_one = 0.0, right_one = 0.1, right_zero = 0.3 } },
//! ]
//!
//! [[rule_groups]]
//! name = "braking"
//! rules = [
//!     { name = "near-slow", consequent = "Slow", antecedents = [{ variable = "Dist", set = "Near" }] },
//! ]
//! "#;
//!
//! let desc = SystemDescriptor::from_toml_str(raw).unwrap();
//! let fis = FuzzyInferenceSystem::from_descriptor(&desc).unwrap();
//! assert!(fis.diagnostics().is_empty());
//!
//! let out = fis.calculate(&HashMap::from([("Dist".to_string(), 0.0)])).unwrap();
//! assert!(out < 0.2);
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use fuzzynav_types::{CurveDescriptor, FuzzyError, SystemDescriptor, VariableDescriptor};
use tracing::{info, warn};

use crate::curve::MembershipCurve;
use crate::rule::FuzzyRule;
use crate::set::FuzzySet;
use crate::system::FuzzyInferenceSystem;
use crate::variable::FuzzyVariable;

// ────────────────────────────────────────────────────────────────────────────
// Diagnostics
// ────────────────────────────────────────────────────────────────────────────

/// A by-name reference in a rule that does not resolve against the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReference {
    /// The antecedent names a variable that is not an input.
    UnknownVariable { rule: String, variable: String },
    /// The antecedent names a set its variable does not have.
    UnknownSet {
        rule: String,
        variable: String,
        set: String,
    },
    /// The consequent names a set the output variable does not have.
    UnknownConsequent { rule: String, set: String },
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReference::UnknownVariable { rule, variable } => {
                write!(f, "rule '{rule}': unknown input variable '{variable}'")
            }
            UnresolvedReference::UnknownSet { rule, variable, set } => {
                write!(f, "rule '{rule}': variable '{variable}' has no set '{set}'")
            }
            UnresolvedReference::UnknownConsequent { rule, set } => {
                write!(f, "rule '{rule}': output has no set '{set}'")
            }
        }
    }
}

impl FuzzyInferenceSystem {
    /// Build a system from its descriptor.
    ///
    /// Rule groups are flattened in declaration order.
    ///
    /// # Errors
    ///
    /// - [`FuzzyError::DuplicateVariable`] – two inputs share a name.
    /// - [`FuzzyError::DuplicateSet`] – two sets of one variable share a name.
    /// - [`FuzzyError::InvalidCurve`] – a curve has no control points or a
    ///   non-finite one.  Points outside `[0, 1]` only log a warning.
    /// - [`FuzzyError::InvalidDomain`] – a variable bound is non-finite.
    pub fn from_descriptor(desc: &SystemDescriptor) -> Result<Self, FuzzyError> {
        let mut fis = FuzzyInferenceSystem::new(desc.name.clone());
        if let Some(samples) = desc.sampling_resolution {
            fis.set_sampling_resolution(samples);
        }

        for var in &desc.inputs {
            fis.add_input(build_variable(var)?)?;
        }
        if let Some(out) = &desc.output {
            fis.set_output(build_variable(out)?);
        }

        for group in &desc.rule_groups {
            for rule in &group.rules {
                let mut r = FuzzyRule::new(rule.name.clone(), rule.consequent.clone(), rule.weight);
                for a in &rule.antecedents {
                    r.add_antecedent(a.variable.clone(), a.set.clone());
                }
                fis.add_rule(r);
            }
        }

        if fis.output().is_none() {
            warn!(system = %fis.name(), "descriptor has no output variable; calculate will fail");
        }
        for issue in fis.diagnostics() {
            warn!(system = %fis.name(), %issue, "unresolved rule reference");
        }
        info!(
            system = %fis.name(),
            inputs = fis.inputs().len(),
            rules = fis.rules().len(),
            "fuzzy system built"
        );
        Ok(fis)
    }

    /// Every rule reference that does not resolve, in rule order.
    ///
    /// Consequents are only checked when an output variable is configured.
    pub fn diagnostics(&self) -> Vec<UnresolvedReference> {
        let mut issues = Vec::new();
        for rule in self.rules() {
            for a in rule.antecedents() {
                match self.input(&a.variable) {
                    None => issues.push(UnresolvedReference::UnknownVariable {
                        rule: rule.name().to_string(),
                        variable: a.variable.clone(),
                    }),
                    Some(var) if var.set(&a.set).is_none() => {
                        issues.push(UnresolvedReference::UnknownSet {
                            rule: rule.name().to_string(),
                            variable: a.variable.clone(),
                            set: a.set.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
            if let Some(out) = self.output()
                && out.set(rule.consequent()).is_none()
            {
                issues.push(UnresolvedReference::UnknownConsequent {
                    rule: rule.name().to_string(),
                    set: rule.consequent().to_string(),
                });
            }
        }
        issues
    }
}

impl TryFrom<&SystemDescriptor> for FuzzyInferenceSystem {
    type Error = FuzzyError;

    fn try_from(desc: &SystemDescriptor) -> Result<Self, Self::Error> {
        FuzzyInferenceSystem::from_descriptor(desc)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loading
// ────────────────────────────────────────────────────────────────────────────

/// Read a descriptor file.  `.json` files are parsed as JSON, anything else
/// as TOML.
pub fn load_descriptor(path: &Path) -> Result<SystemDescriptor, FuzzyError> {
    let raw = fs::read_to_string(path).map_err(|e| FuzzyError::Io {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => SystemDescriptor::from_json_str(&raw),
        _ => SystemDescriptor::from_toml_str(&raw),
    }
}

/// Read a descriptor file and build the system it describes.
pub fn load_system(path: &Path) -> Result<FuzzyInferenceSystem, FuzzyError> {
    FuzzyInferenceSystem::from_descriptor(&load_descriptor(path)?)
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn build_variable(desc: &VariableDescriptor) -> Result<FuzzyVariable, FuzzyError> {
    if !desc.min.is_finite() || !desc.max.is_finite() {
        return Err(FuzzyError::InvalidDomain {
            variable: desc.name.clone(),
            min: desc.min,
            max: desc.max,
        });
    }
    if desc.max <= desc.min {
        warn!(variable = %desc.name, min = desc.min, max = desc.max, "degenerate domain; values normalize to 0");
    }

    let mut var = FuzzyVariable::new(desc.name.clone(), desc.min, desc.max);
    for set in &desc.sets {
        let curve = build_curve(&set.name, &set.curve)?;
        var.add_set(FuzzySet::new(set.name.clone(), curve))?;
    }
    Ok(var)
}

fn build_curve(set: &str, desc: &CurveDescriptor) -> Result<MembershipCurve, FuzzyError> {
    let (points, interpolation) = match desc {
        CurveDescriptor::Trapezoid {
            left_zero,
            left_one,
            right_one,
            right_zero,
        } => {
            if !(left_zero <= left_one && left_one <= right_one && right_one <= right_zero) {
                warn!(set, "trapezoid shoulders are out of order");
            }
            let curve = MembershipCurve::trapezoid(*left_zero, *left_one, *right_one, *right_zero);
            let points: Vec<(f32, f32)> =
                curve.points().iter().map(|p| (p.position, p.value)).collect();
            (points, Default::default())
        }
        CurveDescriptor::Points {
            points,
            interpolation,
        } => (points.clone(), *interpolation),
    };

    if points.is_empty() {
        return Err(FuzzyError::InvalidCurve {
            set: set.to_string(),
            details: "no control points".to_string(),
        });
    }
    if let Some((position, value)) = points
        .iter()
        .find(|(p, v)| !p.is_finite() || !v.is_finite())
    {
        return Err(FuzzyError::InvalidCurve {
            set: set.to_string(),
            details: format!("control point ({position}, {value}) is not finite"),
        });
    }
    let unit = 0.0..=1.0;
    if let Some((position, value)) = points
        .iter()
        .find(|(p, v)| !unit.contains(p) || !unit.contains(v))
    {
        warn!(set, position, value, "control point outside [0, 1]; membership is clamped");
    }

    Ok(MembershipCurve::new(points).with_interpolation(interpolation))
}
