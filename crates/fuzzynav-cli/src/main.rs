//! `fuzzynav-cli` – fuzzynav Command Line Interface
//!
//! Two modes:
//!
//! 1. **One-shot**: `fuzzynav <descriptor> Name=value …` loads a system
//!    descriptor (TOML, or JSON by `.json` extension), evaluates it once and
//!    prints the crisp output.  Exit status is non-zero on any error.
//! 2. **Interactive**: with no arguments, loads `~/.fuzzynav/config.toml`,
//!    builds the speed and turn systems (configured descriptors or built-in
//!    presets) and drops into a REPL with slash-commands (`/help`, `/systems`,
//!    `/rules`, `/agent`, …).  **Ctrl-C** ends the session.

mod config;
mod repl;

use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use fuzzynav_engine::{Outcome, load_system};
use fuzzynav_types::SystemDescriptor;

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the level (default "info"); FUZZYNAV_LOG_FORMAT=json
    // switches to newline-delimited JSON.  Logs go to stderr so one-shot
    // output on stdout stays clean.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("FUZZYNAV_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("-h" | "--help") => {
            print_usage();
            ExitCode::SUCCESS
        }
        Some("--schema") => match SystemDescriptor::json_schema() {
            Ok(schema) => {
                println!("{}", schema);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                ExitCode::FAILURE
            }
        },
        Some(path) => match run_once(Path::new(path), &args[1..]) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                ExitCode::FAILURE
            }
        },
        None => {
            run_interactive();
            ExitCode::SUCCESS
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot evaluation
// ─────────────────────────────────────────────────────────────────────────────

fn run_once(path: &Path, assignments: &[String]) -> Result<(), String> {
    let fis = load_system(path).map_err(|e| e.to_string())?;
    let inputs = repl::parse_assignments(&assignments.join(" "))?;
    for name in inputs.keys() {
        if fis.input(name).is_none() {
            warn!(input = %name, system = %fis.name(), "input is not a variable of this system");
        }
    }
    let inference = fis.infer(&inputs).map_err(|e| e.to_string())?;
    if inference.outcome != Outcome::Centroid {
        eprintln!("{} {}", "note:".yellow(), inference.outcome);
    }
    println!("{}", inference.output);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Interactive session
// ─────────────────────────────────────────────────────────────────────────────

fn run_interactive() {
    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – ending session …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Config ────────────────────────────────────────────────────────────
    let path = config::config_path();
    if path.exists() {
        println!("  Config loaded from {}", path.display().to_string().bold());
    } else {
        println!(
            "  No config at {} – using defaults ({} writes one).",
            path.display().to_string().dimmed(),
            "/save".bold()
        );
    }
    let cfg = repl::load_config_or_default();

    let session = match repl::Session::from_config(cfg) {
        Ok(s) => s,
        Err(e) => {
            println!("{}: {}", "Failed to load systems".red(), e);
            println!("  Falling back to the built-in presets.");
            let fallback = config::Config {
                speed_system: String::new(),
                turn_system: String::new(),
                ..repl::load_config_or_default()
            };
            match repl::Session::from_config(fallback) {
                Ok(s) => s,
                Err(e) => {
                    println!("{}: {}", "Preset error".red(), e);
                    return;
                }
            }
        }
    };

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(session, shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___                           "#.bold().cyan());
    println!("{}", r#"  / _/_ ________ __ _  ___ __  __"#.bold().cyan());
    println!("{}", r#" / _/ // /_ /_ // _ \/ _ `/ |/ /"#.bold().cyan());
    println!("{}", r#"/_/ \_,_//__/__/_//_/\_,_/|___/ "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "fuzzynav".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Fuzzy steering for autonomous vehicles");
    println!();
}

fn print_usage() {
    println!("Usage:");
    println!("  fuzzynav                              interactive shell");
    println!("  fuzzynav <descriptor> [Name=value …]  evaluate a system once");
    println!("  fuzzynav --schema                     print the descriptor JSON schema");
    println!();
    println!("Environment:");
    println!("  RUST_LOG              log filter (default: info)");
    println!("  FUZZYNAV_LOG_FORMAT   set to 'json' for JSON logs");
    println!("  FUZZYNAV_*            config overrides, see ~/.fuzzynav/config.toml");
}
