//! `fuzzynav-control` – Fuzzy steering for ground vehicles.
//!
//! Couples two fuzzy inference systems, one producing throttle and one
//! producing steering, into a single per-tick controller.
//!
//! # Modules
//!
//! - [`presets`] – built-in speed and turn rule bases as
//!   [`SystemDescriptor`][fuzzynav_types::SystemDescriptor]s.
//! - [`agent`] – [`SteeringAgent`][agent::SteeringAgent]: maps a
//!   [`SensorSnapshot`][agent::SensorSnapshot] to a
//!   [`DriveCommand`][agent::DriveCommand].

pub mod agent;
pub mod presets;

pub use agent::{AgentConfig, Clearance, DriveCommand, SensorSnapshot, SteeringAgent, TargetFix};
