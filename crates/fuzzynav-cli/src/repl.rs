//! REPL – Read-Eval-Print Loop for the fuzzynav interactive shell.
//!
//! Supported slash-commands:
//!   /help            – show this list
//!   /systems         – list the loaded speed and turn systems
//!   /use speed|turn  – choose the system that plain input is evaluated by
//!   /vars            – show the active system's variables and sets
//!   /rules           – show the active system's rules and broken references
//!   /trace           – toggle the per-stage inference trace
//!   /agent k=v …     – run one steering-agent tick
//!   /schema          – print the JSON schema of system descriptors
//!   /save            – write the current settings to `~/.fuzzynav/config.toml`
//!   /quit | /exit    – exit the CLI
//!
//! Any other line is read as `Name=value` pairs and evaluated against the
//! active system, e.g. `FrontDist=1.2 TargetDist=8`.

use colored::Colorize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fuzzynav_control::presets;
use fuzzynav_control::{SensorSnapshot, SteeringAgent, TargetFix};
use fuzzynav_engine::{FuzzyInferenceSystem, Inference, load_descriptor};
use fuzzynav_types::{FuzzyError, SystemDescriptor};
use tracing::info;

use crate::config::{self, Config};

// ─────────────────────────────────────────────────────────────────────────────
// Session state
// ─────────────────────────────────────────────────────────────────────────────

/// Which of the agent's systems plain input is evaluated by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Active {
    Speed,
    Turn,
}

impl std::fmt::Display for Active {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Active::Speed => write!(f, "speed"),
            Active::Turn => write!(f, "turn"),
        }
    }
}

/// Everything the REPL keeps between lines.
pub struct Session {
    config: Config,
    agent: SteeringAgent,
    speed_source: String,
    turn_source: String,
    active: Active,
    trace: bool,
}

impl Session {
    /// Load both systems named by `config`, falling back to the presets for
    /// empty paths.
    pub fn from_config(config: Config) -> Result<Self, FuzzyError> {
        let samples = config.sampling_resolution;
        let range = config.max_sensor_range;
        let (speed_desc, speed_source) =
            resolve_descriptor(&config.speed_system, || presets::speed_system(range), samples)?;
        let (turn_desc, turn_source) =
            resolve_descriptor(&config.turn_system, || presets::turn_system(range), samples)?;

        let agent = SteeringAgent::new(
            FuzzyInferenceSystem::from_descriptor(&speed_desc)?,
            FuzzyInferenceSystem::from_descriptor(&turn_desc)?,
            config.agent,
        );
        info!(speed = %speed_source, turn = %turn_source, "session ready");
        Ok(Self {
            config,
            agent,
            speed_source,
            turn_source,
            active: Active::Speed,
            trace: false,
        })
    }

    pub fn active_system(&self) -> &FuzzyInferenceSystem {
        match self.active {
            Active::Speed => self.agent.speed_system(),
            Active::Turn => self.agent.turn_system(),
        }
    }
}

/// Descriptor at `path`, or the preset when `path` is empty.  The configured
/// sampling resolution fills in when the descriptor leaves it unset.
fn resolve_descriptor(
    path: &str,
    preset: impl FnOnce() -> SystemDescriptor,
    samples: usize,
) -> Result<(SystemDescriptor, String), FuzzyError> {
    let (mut desc, source) = if path.is_empty() {
        (preset(), "built-in preset".to_string())
    } else {
        (load_descriptor(Path::new(path))?, path.to_string())
    };
    desc.sampling_resolution.get_or_insert(samples);
    Ok((desc, source))
}

// ─────────────────────────────────────────────────────────────────────────────
// Loop
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(mut session: Session, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", format!("fuzzynav[{}]>", session.active).bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match cmd {
            "/help" => cmd_help(),
            "/systems" => cmd_systems(&session),
            "/use" => cmd_use(&mut session, rest.trim()),
            "/vars" => cmd_vars(session.active_system()),
            "/rules" => cmd_rules(session.active_system()),
            "/trace" => {
                session.trace = !session.trace;
                println!("  trace {}", if session.trace { "on".green() } else { "off".yellow() });
            }
            "/agent" => cmd_agent(&session, rest),
            "/schema" => match SystemDescriptor::json_schema() {
                Ok(schema) => println!("{}", schema),
                Err(e) => println!("{}: {}", "Schema error".red(), e),
            },
            "/save" => cmd_save(&session.config),
            "/quit" | "/exit" => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            other if other.starts_with('/') => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "/help".bold()
                );
            }
            _ => cmd_evaluate(&session, line),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "fuzzynav Commands".bold().underline());
    println!("  {}         – list the loaded systems", "/systems".bold().cyan());
    println!("  {}  – choose the active system", "/use speed|turn".bold().cyan());
    println!("  {}            – show variables and sets", "/vars".bold().cyan());
    println!("  {}           – show rules and broken references", "/rules".bold().cyan());
    println!("  {}           – toggle the inference trace", "/trace".bold().cyan());
    println!(
        "  {}     – one agent tick, keys: front left right dist angle",
        "/agent k=v …".bold().cyan()
    );
    println!("  {}          – print the descriptor JSON schema", "/schema".bold().cyan());
    println!("  {}            – save settings to ~/.fuzzynav/config.toml", "/save".bold().cyan());
    println!("  {}     – exit the CLI", "/quit  /exit".bold().cyan());
    println!();
    println!("  Anything else is evaluated as {} pairs.", "Name=value".bold());
    println!();
}

fn cmd_systems(session: &Session) {
    for (label, fis, source) in [
        (Active::Speed, session.agent.speed_system(), &session.speed_source),
        (Active::Turn, session.agent.turn_system(), &session.turn_source),
    ] {
        let marker = if label == session.active { "*".green().bold() } else { " ".normal() };
        println!(
            " {} {:<6} {}  {} input(s), {} rule(s), {} samples  {}",
            marker,
            label.to_string().bold(),
            fis.name(),
            fis.inputs().len(),
            fis.rules().len(),
            fis.sampling_resolution(),
            format!("[{}]", source).dimmed()
        );
    }
}

fn cmd_use(session: &mut Session, which: &str) {
    session.active = match which {
        "speed" => Active::Speed,
        "turn" => Active::Turn,
        other => {
            println!("{} '{}' – expected speed or turn", "Unknown system".red(), other.yellow());
            return;
        }
    };
    println!("  active system: {}", session.active_system().name().bold());
}

fn cmd_vars(fis: &FuzzyInferenceSystem) {
    for var in fis.inputs() {
        print_variable("in ", var);
    }
    match fis.output() {
        Some(var) => print_variable("out", var),
        None => println!("  {}", "no output variable".red()),
    }
}

fn print_variable(kind: &str, var: &fuzzynav_engine::FuzzyVariable) {
    let sets: Vec<&str> = var.sets().iter().map(|s| s.name()).collect();
    println!(
        "  {} {:<12} [{}, {}]  {}",
        kind.dimmed(),
        var.name().bold(),
        var.min(),
        var.max(),
        sets.join(" ")
    );
}

fn cmd_rules(fis: &FuzzyInferenceSystem) {
    for (i, rule) in fis.rules().iter().enumerate() {
        println!("  {:>3}  {}", i, rule);
    }
    let issues = fis.diagnostics();
    if !issues.is_empty() {
        println!();
        println!("  {}", "Unresolved references:".yellow().bold());
        for issue in issues {
            println!("    • {}", issue);
        }
    }
}

fn cmd_evaluate(session: &Session, line: &str) {
    let inputs = match parse_assignments(line) {
        Ok(inputs) => inputs,
        Err(e) => {
            println!("{}: {}", "Input error".red(), e);
            return;
        }
    };
    let fis = session.active_system();
    match fis.infer(&inputs) {
        Ok(inference) => {
            if session.trace {
                print!("{}", render_trace(fis, &inference));
            }
            let name = fis.output().map(|v| v.name()).unwrap_or("output");
            println!("  {} = {}", name.bold(), format!("{:.4}", inference.output).green().bold());
        }
        Err(e) => println!("{}: {}", "Inference error".red(), e),
    }
}

fn cmd_agent(session: &Session, args: &str) {
    let snapshot = match snapshot_from_args(args, session.config.max_sensor_range) {
        Ok(s) => s,
        Err(e) => {
            println!("{}: {}", "Input error".red(), e);
            return;
        }
    };
    match session.agent.tick(&snapshot) {
        Ok(cmd) => println!(
            "  throttle = {}  steering = {}",
            format!("{:.4}", cmd.throttle).green().bold(),
            format!("{:+.4}", cmd.steering).green().bold()
        ),
        Err(e) => println!("{}: {}", "Agent error".red(), e),
    }
}

fn cmd_save(cfg: &Config) {
    match config::save(cfg) {
        Ok(()) => println!(
            "  {} Config saved to {}",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Load the config, falling back to defaults (with environment overrides)
/// when the file is absent or broken.
pub fn load_config_or_default() -> Config {
    match config::load() {
        Ok(Some(c)) => c,
        Ok(None) => {
            let mut c = Config::default();
            config::apply_env_overrides(&mut c);
            c
        }
        Err(e) => {
            println!("{}: {} – using defaults", "Config error".red(), e);
            let mut c = Config::default();
            config::apply_env_overrides(&mut c);
            c
        }
    }
}

/// Parse `Name=value` pairs separated by whitespace or commas.
pub fn parse_assignments(line: &str) -> Result<HashMap<String, f32>, String> {
    let mut out = HashMap::new();
    for token in line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let (name, value) = token
            .split_once('=')
            .ok_or_else(|| format!("'{}' is not a Name=value pair", token))?;
        if name.is_empty() {
            return Err(format!("'{}' has no variable name", token));
        }
        let value: f32 = value
            .parse()
            .map_err(|_| format!("'{}' is not a number in '{}'", value, token))?;
        out.insert(name.to_string(), value);
    }
    Ok(out)
}

/// Build a sensor snapshot from `/agent` arguments.
///
/// Keys are `front`, `left`, `right` (default: `max_range`), `dist` and
/// `angle` (default `0`).  Without `dist` the snapshot has no target.
pub fn snapshot_from_args(args: &str, max_range: f32) -> Result<SensorSnapshot, String> {
    let mut front = max_range;
    let mut left = max_range;
    let mut right = max_range;
    let mut dist = None;
    let mut angle = 0.0;
    for (key, value) in parse_assignments(args)? {
        match key.as_str() {
            "front" => front = value,
            "left" => left = value,
            "right" => right = value,
            "dist" => dist = Some(value),
            "angle" => angle = value,
            other => return Err(format!("unknown key '{}'", other)),
        }
    }
    Ok(SensorSnapshot {
        distances: vec![left, front, right],
        max_range,
        target: dist.map(|distance| TargetFix {
            distance,
            signed_angle_deg: angle,
        }),
    })
}

/// Plain-text trace of one inference: memberships per input, fired rules in
/// rule order, and how the output was obtained.
pub fn render_trace(fis: &FuzzyInferenceSystem, inference: &Inference) -> String {
    let mut out = String::new();
    for var in fis.inputs() {
        let Some(degrees) = inference.memberships.get(var.name()) else {
            continue;
        };
        write!(out, "  {:<12}", var.name()).ok();
        for set in var.sets() {
            let mu = degrees.get(set.name()).copied().unwrap_or(0.0);
            write!(out, " {}={:.2}", set.name(), mu).ok();
        }
        out.push('\n');
    }
    for fired in &inference.fired {
        writeln!(
            out,
            "  fired #{:<3} {:.3} -> {}  {}",
            fired.index, fired.strength, fired.consequent, fired.name
        )
        .ok();
    }
    writeln!(out, "  outcome: {}", inference.outcome).ok();
    out
}
