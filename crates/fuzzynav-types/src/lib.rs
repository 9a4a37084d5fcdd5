//! `fuzzynav-types` – shared descriptor and error types.
//!
//! A [`SystemDescriptor`] is the serialisable form of a fuzzy inference
//! system: input variables, one output variable, and rule groups.  The
//! engine crate turns a descriptor into a runnable system; authoring tools
//! only ever see these plain data types.
//!
//! # Example
//!
//! ```
//! use fuzzynav_types::{CurveDescriptor, SystemDescriptor};
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
//! "#;
//!
//! let desc = SystemDescriptor::from_toml_str(raw).unwrap();
//! assert_eq!(desc.inputs[0].name, "Dist");
//! assert!(matches!(desc.inputs[0].sets[0].curve, CurveDescriptor::Trapezoid { .. }));
//! assert!(desc.output.is_none());
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Curves
// ────────────────────────────────────────────────────────────────────────────

/// How a membership curve is interpolated between its control points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Straight segments between control points.
    #[default]
    Linear,
    /// Cubic Hermite segments with flat tangents at every control point.
    Smooth,
}

/// Shape of a membership curve over the normalized domain `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum CurveDescriptor {
    /// Standard trapezoid anchored at both domain edges.
    Trapezoid {
        left_zero: f32,
        left_one: f32,
        right_one: f32,
        right_zero: f32,
    },
    /// Free-form `[position, value]` control points.
    Points {
        points: Vec<(f32, f32)>,
        #[serde(default)]
        interpolation: Interpolation,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Variables
// ────────────────────────────────────────────────────────────────────────────

/// A named fuzzy set inside a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SetDescriptor {
    pub name: String,
    pub curve: CurveDescriptor,
}

/// A crisp scalar domain `[min, max]` and its fuzzy sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VariableDescriptor {
    pub name: String,
    pub min: f32,
    pub max: f32,
    #[serde(default)]
    pub sets: Vec<SetDescriptor>,
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

/// One `variable is set` condition of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AntecedentDescriptor {
    pub variable: String,
    pub set: String,
}

fn default_weight() -> f32 {
    1.0
}

/// `IF a AND b … THEN consequent` with a weight in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub antecedents: Vec<AntecedentDescriptor>,
    pub consequent: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

/// Organisational bucket of rules.  Groups carry no runtime semantics; the
/// engine flattens them in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleGroupDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rules: Vec<RuleDescriptor>,
}

// ────────────────────────────────────────────────────────────────────────────
// System
// ────────────────────────────────────────────────────────────────────────────

/// Complete serialisable description of a fuzzy inference system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SystemDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sampling_resolution: Option<usize>,
    #[serde(default)]
    pub inputs: Vec<VariableDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<VariableDescriptor>,
    #[serde(default)]
    pub rule_groups: Vec<RuleGroupDescriptor>,
}

impl SystemDescriptor {
    /// Parse a descriptor from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, FuzzyError> {
        toml::from_str(raw).map_err(|e| FuzzyError::Descriptor(e.to_string()))
    }

    /// Parse a descriptor from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, FuzzyError> {
        serde_json::from_str(raw).map_err(|e| FuzzyError::Descriptor(e.to_string()))
    }

    /// Render the descriptor as pretty-printed TOML.
    pub fn to_toml_string(&self) -> Result<String, FuzzyError> {
        toml::to_string_pretty(self).map_err(|e| FuzzyError::Descriptor(e.to_string()))
    }

    /// JSON Schema of the descriptor format, for external authoring tools.
    pub fn json_schema() -> Result<String, FuzzyError> {
        let schema = schemars::schema_for!(SystemDescriptor);
        serde_json::to_string_pretty(&schema).map_err(|e| FuzzyError::Descriptor(e.to_string()))
    }

    /// Total number of rules across all groups.
    pub fn rule_count(&self) -> usize {
        self.rule_groups.iter().map(|g| g.rules.len()).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Errors raised while building or running a fuzzy inference system.
///
/// Only configuration problems surface here.  Gaps during inference (missing
/// inputs, unknown set references, rules that never fire) are absorbed with
/// defined fallback values instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FuzzyError {
    #[error("No output variable configured for system '{0}'")]
    MissingOutput(String),

    #[error("Duplicate variable '{0}'")]
    DuplicateVariable(String),

    #[error("Duplicate set '{set}' in variable '{variable}'")]
    DuplicateSet { variable: String, set: String },

    #[error("Invalid curve for set '{set}': {details}")]
    InvalidCurve { set: String, details: String },

    #[error("Invalid domain for variable '{variable}': [{min}, {max}]")]
    InvalidDomain { variable: String, min: f32, max: f32 },

    #[error("Descriptor Error: {0}")]
    Descriptor(String),

    #[error("I/O Error on {path}: {details}")]
    Io { path: String, details: String },
}
