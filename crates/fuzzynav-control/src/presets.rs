//! Default rule bases for the speed and steering systems.
//!
//! Both presets take the sensor range so that distance variables span
//! `[0, max_sensor]`; every other domain is fixed.
//!
//! | System | Inputs | Output | Rules |
//! |---|---|---|---|
//! | speed | `FrontDist`, `AngleAbs` (0..180°), `TargetDist` (0..20) | `Speed` 0..1 | 16 |
//! | turn  | `LeftDist`, `RightDist`, `FrontDist`, `Angle` (−180..180°) | `Steer` −1..1 | 32 |
//!
//! `AngleAbs` is declared but not referenced by any speed rule; it is kept so
//! that host code feeding it keeps working when rules are added.

use fuzzynav_types::{
    AntecedentDescriptor, CurveDescriptor, RuleDescriptor, RuleGroupDescriptor, SetDescriptor,
    SystemDescriptor, VariableDescriptor,
};

/// Sensor range assumed when none is configured.
pub const DEFAULT_MAX_SENSOR: f32 = 5.0;

/// Speed system: slows down near obstacles and near the target.
pub fn speed_system(max_sensor: f32) -> SystemDescriptor {
    let front = variable(
        "FrontDist",
        0.0,
        max_sensor,
        &[
            ("VeryNear", [0.0, 0.0, 0.1, 0.2]),
            ("Near", [0.1, 0.2, 0.3, 0.4]),
            ("Mid", [0.3, 0.4, 0.6, 0.8]),
            ("Far", [0.7, 0.8, 1.0, 1.0]),
        ],
    );
    let angle_abs = variable(
        "AngleAbs",
        0.0,
        180.0,
        &[
            ("Small", [0.0, 0.0, 10.0 / 180.0, 30.0 / 180.0]),
            ("Mid", [10.0 / 180.0, 30.0 / 180.0, 70.0 / 180.0, 100.0 / 180.0]),
            ("Large", [70.0 / 180.0, 100.0 / 180.0, 1.0, 1.0]),
        ],
    );
    let target = variable(
        "TargetDist",
        0.0,
        20.0,
        &[
            ("VeryNear", [0.0, 0.0, 0.05, 0.1]),
            ("Near", [0.05, 0.1, 0.15, 0.2]),
            ("Mid", [0.15, 0.2, 0.3, 0.4]),
            ("Far", [0.3, 0.4, 1.0, 1.0]),
        ],
    );
    let speed = variable(
        "Speed",
        0.0,
        1.0,
        &[
            ("Stop", [0.0, 0.0, 0.05, 0.1]),
            ("Slow", [0.05, 0.1, 0.2, 0.3]),
            ("Mid", [0.2, 0.3, 0.5, 0.6]),
            ("Fast", [0.5, 0.6, 1.0, 1.0]),
        ],
    );

    // (FrontDist, TargetDist) → Speed
    const TABLE: [(&str, &str, &str); 16] = [
        ("VeryNear", "VeryNear", "Slow"),
        ("VeryNear", "Near", "Slow"),
        ("VeryNear", "Mid", "Slow"),
        ("VeryNear", "Far", "Slow"),
        ("Near", "VeryNear", "Slow"),
        ("Near", "Near", "Slow"),
        ("Near", "Mid", "Slow"),
        ("Near", "Far", "Slow"),
        ("Mid", "VeryNear", "Slow"),
        ("Mid", "Near", "Slow"),
        ("Mid", "Mid", "Mid"),
        ("Mid", "Far", "Mid"),
        ("Far", "VeryNear", "Slow"),
        ("Far", "Near", "Slow"),
        ("Far", "Mid", "Mid"),
        ("Far", "Far", "Fast"),
    ];
    let rules = TABLE
        .iter()
        .map(|(f, t, out)| rule(out, 1.0, &[("FrontDist", f), ("TargetDist", t)]))
        .collect();

    SystemDescriptor {
        name: "speed".to_string(),
        sampling_resolution: None,
        inputs: vec![front, angle_abs, target],
        output: Some(speed),
        rule_groups: vec![RuleGroupDescriptor {
            name: "clearance".to_string(),
            rules,
        }],
    }
}

/// Steering system: weak target tracking plus obstacle avoidance.
pub fn turn_system(max_sensor: f32) -> SystemDescriptor {
    let ranges = [
        ("Near", [0.0, 0.0, 0.1, 0.3]),
        ("Mid", [0.1, 0.3, 0.5, 0.7]),
        ("Far", [0.5, 0.7, 1.0, 1.0]),
    ];
    let left = variable("LeftDist", 0.0, max_sensor, &ranges);
    let right = variable("RightDist", 0.0, max_sensor, &ranges);
    let front = variable("FrontDist", 0.0, max_sensor, &ranges);
    let angle = variable(
        "Angle",
        -180.0,
        180.0,
        &[
            ("LeftLarge", [0.0, 0.0, 135.0 / 360.0, 150.0 / 360.0]),
            ("LeftSmall", [135.0 / 360.0, 150.0 / 360.0, 170.0 / 360.0, 180.0 / 360.0]),
            ("Center", [170.0 / 360.0, 180.0 / 360.0, 180.0 / 360.0, 190.0 / 360.0]),
            ("RightSmall", [180.0 / 360.0, 190.0 / 360.0, 210.0 / 360.0, 225.0 / 360.0]),
            ("RightLarge", [210.0 / 360.0, 225.0 / 360.0, 1.0, 1.0]),
        ],
    );
    let steer = variable(
        "Steer",
        -1.0,
        1.0,
        &[
            ("LL", [0.0, 0.0, 0.15, 0.25]),
            ("L", [0.15, 0.25, 0.35, 0.45]),
            ("F", [0.35, 0.45, 0.55, 0.65]),
            ("R", [0.55, 0.65, 0.75, 0.85]),
            ("RR", [0.75, 0.85, 1.0, 1.0]),
        ],
    );

    let tracking = [
        ("RightLarge", "RR"),
        ("RightSmall", "R"),
        ("LeftLarge", "LL"),
        ("LeftSmall", "L"),
        ("Center", "F"),
    ]
    .iter()
    .map(|(a, out)| rule(out, 0.2, &[("Angle", a)]))
    .collect();

    // (RightDist, FrontDist, LeftDist) → Steer, weight
    const AVOIDANCE: [(&str, &str, &str, &str, f32); 27] = [
        ("Near", "Near", "Near", "RR", 1.0),
        ("Near", "Near", "Mid", "LL", 1.0),
        ("Near", "Near", "Far", "LL", 1.0),
        ("Near", "Mid", "Near", "LL", 1.0),
        ("Near", "Mid", "Mid", "LL", 1.0),
        ("Near", "Mid", "Far", "LL", 1.0),
        ("Near", "Far", "Near", "F", 1.0),
        ("Near", "Far", "Mid", "LL", 1.0),
        ("Near", "Far", "Far", "LL", 1.0),
        ("Mid", "Near", "Near", "RR", 1.0),
        ("Mid", "Near", "Mid", "RR", 1.0),
        ("Mid", "Near", "Far", "LL", 1.0),
        ("Mid", "Mid", "Near", "RR", 1.0),
        ("Mid", "Mid", "Mid", "RR", 1.0),
        ("Mid", "Mid", "Far", "LL", 1.0),
        ("Mid", "Far", "Near", "RR", 1.0),
        ("Mid", "Far", "Mid", "F", 1.0),
        ("Mid", "Far", "Far", "LL", 0.5),
        ("Far", "Near", "Near", "RR", 1.0),
        ("Far", "Near", "Mid", "RR", 1.0),
        ("Far", "Near", "Far", "RR", 1.0),
        ("Far", "Mid", "Near", "RR", 1.0),
        ("Far", "Mid", "Mid", "RR", 1.0),
        ("Far", "Mid", "Far", "RR", 0.5),
        ("Far", "Far", "Near", "RR", 1.0),
        ("Far", "Far", "Mid", "RR", 0.5),
        ("Far", "Far", "Far", "F", 0.5),
    ];
    let avoidance = AVOIDANCE
        .iter()
        .map(|(r, f, l, out, w)| {
            rule(out, *w, &[("RightDist", r), ("FrontDist", f), ("LeftDist", l)])
        })
        .collect();

    SystemDescriptor {
        name: "turn".to_string(),
        sampling_resolution: None,
        inputs: vec![left, right, front, angle],
        output: Some(steer),
        rule_groups: vec![
            RuleGroupDescriptor {
                name: "target_tracking".to_string(),
                rules: tracking,
            },
            RuleGroupDescriptor {
                name: "obstacle_avoidance".to_string(),
                rules: avoidance,
            },
        ],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn variable(name: &str, min: f32, max: f32, sets: &[(&str, [f32; 4])]) -> VariableDescriptor {
    VariableDescriptor {
        name: name.to_string(),
        min,
        max,
        sets: sets
            .iter()
            .map(|(set, [a, b, c, d])| SetDescriptor {
                name: set.to_string(),
                curve: CurveDescriptor::Trapezoid {
                    left_zero: *a,
                    left_one: *b,
                    right_one: *c,
                    right_zero: *d,
                },
            })
            .collect(),
    }
}

/// Rules are named after their antecedents, e.g. `FrontDist=Near & TargetDist=Far`.
fn rule(consequent: &str, weight: f32, antecedents: &[(&str, &str)]) -> RuleDescriptor {
    let name = antecedents
        .iter()
        .map(|(v, s)| format!("{v}={s}"))
        .collect::<Vec<_>>()
        .join(" & ");
    RuleDescriptor {
        name,
        antecedents: antecedents
            .iter()
            .map(|(v, s)| AntecedentDescriptor {
                variable: v.to_string(),
                set: s.to_string(),
            })
            .collect(),
        consequent: consequent.to_string(),
        weight,
    }
}
