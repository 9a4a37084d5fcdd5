//! [`SteeringAgent`] – throttle/steering controller for a ground vehicle.
//!
//! Each control tick the host supplies a [`SensorSnapshot`] (range-finder
//! distances plus an optional target fix).  The agent maps it onto the named
//! inputs of two fuzzy systems, one for speed and one for steering, and
//! returns a [`DriveCommand`] for the motor.
//!
//! Rays are read left to right: the first ray is the left distance, the last
//! ray the right distance, and the middle ray the front distance.  With no
//! rays every distance equals the sensor range.
//!
//! | System | Inputs fed |
//! |---|---|
//! | speed | `FrontDist`, `AngleAbs`, `TargetDist` |
//! | turn  | `LeftDist`, `RightDist`, `FrontDist`, `Angle` |
//!
//! # Example
//!
//! ```rust
//! use fuzzynav_control::agent::{AgentConfig, SensorSnapshot, SteeringAgent, TargetFix};
//!
//! let agent = SteeringAgent::with_presets(5.0, AgentConfig::default()).unwrap();
//!
//! let snapshot = SensorSnapshot {
//!     distances: vec![5.0, 5.0, 5.0, 5.0, 5.0],
//!     max_range: 5.0,
//!     target: Some(TargetFix { distance: 15.0, signed_angle_deg: 0.0 }),
//! };
//!
//! let cmd = agent.tick(&snapshot).unwrap();
//! assert!(cmd.throttle > 0.5);
//! assert!(cmd.steering.abs() < 0.1);
//! ```

use std::collections::HashMap;

use fuzzynav_engine::FuzzyInferenceSystem;
use fuzzynav_types::FuzzyError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::presets;

// ────────────────────────────────────────────────────────────────────────────
// Input types
// ────────────────────────────────────────────────────────────────────────────

/// Where the target is relative to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFix {
    /// Planar distance to the target.
    pub distance: f32,
    /// Signed heading error in degrees, `-180..180`; negative means the
    /// target is to the left.
    pub signed_angle_deg: f32,
}

impl TargetFix {
    /// Build a fix from planar `[x, z]` vectors: the vehicle's forward
    /// direction and the offset from the vehicle to the target.
    ///
    /// `+z` is forward and `+x` is right, so a target to the right yields a
    /// positive angle.  A zero offset yields distance `0` and angle `0`.
    pub fn from_planar(forward: [f32; 2], to_target: [f32; 2]) -> Self {
        let [fx, fz] = forward;
        let [tx, tz] = to_target;
        let cross = fz * tx - fx * tz;
        let dot = fx * tx + fz * tz;
        Self {
            distance: (tx * tx + tz * tz).sqrt(),
            signed_angle_deg: cross.atan2(dot).to_degrees(),
        }
    }
}

/// One tick of sensor data.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSnapshot {
    /// Range-finder distances, leftmost ray first.  Rays that hit nothing
    /// report `max_range`.
    pub distances: Vec<f32>,
    pub max_range: f32,
    /// `None` when the host has no target; the agent then holds still.
    pub target: Option<TargetFix>,
}

/// Front, left, and right distances extracted from a [`SensorSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clearance {
    pub front: f32,
    pub left: f32,
    pub right: f32,
}

impl SensorSnapshot {
    pub fn clearance(&self) -> Clearance {
        match self.distances.as_slice() {
            [] => Clearance {
                front: self.max_range,
                left: self.max_range,
                right: self.max_range,
            },
            d => Clearance {
                front: d[d.len() / 2],
                left: d[0],
                right: d[d.len() - 1],
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output type
// ────────────────────────────────────────────────────────────────────────────

/// Motor command produced by [`SteeringAgent::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Forward throttle in `[0, 1]`.
    pub throttle: f32,
    /// Steering in `[-1, 1]`; negative turns left.
    pub steering: f32,
}

impl DriveCommand {
    /// Full stop, wheels straight.
    pub const STOP: DriveCommand = DriveCommand {
        throttle: 0.0,
        steering: 0.0,
    };
}

// ────────────────────────────────────────────────────────────────────────────
// SteeringAgent
// ────────────────────────────────────────────────────────────────────────────

/// Behaviour thresholds of a [`SteeringAgent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Distance to the target at which the vehicle stops.
    pub arrive_radius: f32,
    /// Front clearance below which throttle is cut (steering still applies).
    pub safety_distance: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            arrive_radius: 1.0,
            safety_distance: 0.6,
        }
    }
}

/// Pairs a speed system and a turn system into one controller.
///
/// The agent holds no per-tick state; [`SteeringAgent::tick`] takes `&self`.
#[derive(Debug, Clone)]
pub struct SteeringAgent {
    speed: FuzzyInferenceSystem,
    turn: FuzzyInferenceSystem,
    config: AgentConfig,
}

impl SteeringAgent {
    pub fn new(speed: FuzzyInferenceSystem, turn: FuzzyInferenceSystem, config: AgentConfig) -> Self {
        Self { speed, turn, config }
    }

    /// Agent running the built-in [`presets`] for the given sensor range.
    pub fn with_presets(max_sensor: f32, config: AgentConfig) -> Result<Self, FuzzyError> {
        let speed = FuzzyInferenceSystem::from_descriptor(&presets::speed_system(max_sensor))?;
        let turn = FuzzyInferenceSystem::from_descriptor(&presets::turn_system(max_sensor))?;
        Ok(Self::new(speed, turn, config))
    }

    pub fn speed_system(&self) -> &FuzzyInferenceSystem {
        &self.speed
    }

    pub fn turn_system(&self) -> &FuzzyInferenceSystem {
        &self.turn
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Named inputs for the speed system.
    pub fn speed_inputs(snapshot: &SensorSnapshot, target: &TargetFix) -> HashMap<String, f32> {
        let c = snapshot.clearance();
        HashMap::from([
            ("FrontDist".to_string(), c.front),
            ("AngleAbs".to_string(), target.signed_angle_deg.abs()),
            ("TargetDist".to_string(), target.distance),
        ])
    }

    /// Named inputs for the turn system.
    pub fn turn_inputs(snapshot: &SensorSnapshot, target: &TargetFix) -> HashMap<String, f32> {
        let c = snapshot.clearance();
        HashMap::from([
            ("LeftDist".to_string(), c.left),
            ("RightDist".to_string(), c.right),
            ("FrontDist".to_string(), c.front),
            ("Angle".to_string(), target.signed_angle_deg),
        ])
    }

    /// Compute the motor command for one control tick.
    ///
    /// - No target → [`DriveCommand::STOP`].
    /// - Within `arrive_radius` of the target → [`DriveCommand::STOP`].
    /// - Front clearance below `safety_distance` → throttle `0`, steering
    ///   unchanged.
    ///
    /// # Errors
    ///
    /// Propagates [`FuzzyError::MissingOutput`] from either system.
    pub fn tick(&self, snapshot: &SensorSnapshot) -> Result<DriveCommand, FuzzyError> {
        let Some(target) = snapshot.target else {
            debug!("no target; holding still");
            return Ok(DriveCommand::STOP);
        };
        if target.distance <= self.config.arrive_radius {
            debug!(distance = target.distance, "target reached");
            return Ok(DriveCommand::STOP);
        }

        let speed = self.speed.calculate(&Self::speed_inputs(snapshot, &target))?;
        let turn = self.turn.calculate(&Self::turn_inputs(snapshot, &target))?;

        let mut throttle = speed.clamp(0.0, 1.0);
        let steering = turn.clamp(-1.0, 1.0);

        let front = snapshot.clearance().front;
        if front < self.config.safety_distance {
            debug!(front, "inside safety distance; cutting throttle");
            throttle = 0.0;
        }

        debug!(throttle, steering, "drive command");
        Ok(DriveCommand { throttle, steering })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
