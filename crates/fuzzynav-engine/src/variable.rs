//! [`FuzzyVariable`] – a crisp domain `[min, max]` and its fuzzy sets.
//!
//! Crisp values are normalized into `[0, 1]` before the sets are consulted:
//!
//! ```text
//! norm = clamp01((value − min) / (max − min))      (0 when max ≤ min)
//! ```
//!
//! # Example
//!
//! ```rust
//! use fuzzynav_engine::{FuzzySet, FuzzyVariable};
//!
//! let mut dist = FuzzyVariable::new("Dist", 0.0, 10.0);
//! dist.add_set(FuzzySet::trapezoid("Near", 0.0, 0.0, 0.1, 0.3)).unwrap();
//! dist.add_set(FuzzySet::trapezoid("Far", 0.5, 0.7, 1.0, 1.0)).unwrap();
//!
//! let degrees = dist.fuzzify(0.0);
//! assert_eq!(degrees["Near"], 1.0);
//! assert_eq!(degrees["Far"], 0.0);
//! assert_eq!(dist.denormalize(0.5), 5.0);
//! ```

use std::collections::HashMap;

use fuzzynav_types::FuzzyError;

use crate::curve::clamp01;
use crate::set::FuzzySet;

/// Set name → membership degree for one variable.
pub type SetMemberships = HashMap<String, f32>;

/// Variable name → [`SetMemberships`]; the fuzzified view of all inputs.
pub type MembershipSnapshot = HashMap<String, SetMemberships>;

/// A named scalar domain holding an ordered collection of [`FuzzySet`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyVariable {
    name: String,
    min: f32,
    max: f32,
    sets: Vec<FuzzySet>,
}

impl FuzzyVariable {
    /// Create a variable with no sets.
    pub fn new(name: impl Into<String>, min: f32, max: f32) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            sets: Vec::new(),
        }
    }

    /// Append a set.  Set names are unique within a variable.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::DuplicateSet`] when a set with the same name is
    /// already registered.
    pub fn add_set(&mut self, set: FuzzySet) -> Result<(), FuzzyError> {
        if self.set(set.name()).is_some() {
            return Err(FuzzyError::DuplicateSet {
                variable: self.name.clone(),
                set: set.name().to_string(),
            });
        }
        self.sets.push(set);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Sets in insertion order.
    pub fn sets(&self) -> &[FuzzySet] {
        &self.sets
    }

    /// Look up a set by name.
    pub fn set(&self, name: &str) -> Option<&FuzzySet> {
        self.sets.iter().find(|s| s.name() == name)
    }

    /// Centre of the domain; the fallback output of an inference run.
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    /// Map a crisp value into `[0, 1]`.  A degenerate domain (`max ≤ min`)
    /// normalizes everything to `0`.
    pub fn normalize(&self, value: f32) -> f32 {
        let denom = self.max - self.min;
        let norm = if denom <= 0.0 {
            0.0
        } else {
            (value - self.min) / denom
        };
        clamp01(norm)
    }

    /// Membership of `value` in every set.  The result always holds exactly
    /// one entry per set, including zero degrees.
    pub fn fuzzify(&self, value: f32) -> SetMemberships {
        let norm = self.normalize(value);
        self.sets
            .iter()
            .map(|s| (s.name().to_string(), s.get_membership(norm)))
            .collect()
    }

    /// Map a normalized position back onto `[min, max]`.
    pub fn denormalize(&self, norm: f32) -> f32 {
        self.min + (self.max - self.min) * clamp01(norm)
    }
}
