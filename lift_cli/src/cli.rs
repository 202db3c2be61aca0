//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "lift", version, about = "Single-shaft elevator controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/lift_config.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); falls back to [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop until Ctrl-C (or --max-ticks)
    Run {
        /// Stop after this many control ticks
        #[arg(long, value_name = "N")]
        max_ticks: Option<u64>,
        /// Queue a call for FLOOR before the first tick (repeatable)
        #[arg(long = "call", value_name = "FLOOR", action = ArgAction::Append)]
        calls: Vec<usize>,
        /// Read monitor commands as JSON lines from stdin
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Read monitor override commands as JSON lines from stdin, e.g.\n{\"command\":\"set_auto_mode\",\"enabled\":false}\n{\"command\":\"request_floor\",\"floor\":2}\nCommands apply at the start of the next tick. Malformed lines are logged and skipped."
        )]
        monitor_stdin: bool,
    },
    /// Read every sensor once and report (hardware presence / sim ok)
    SelfCheck,
    /// Run one tick and print the telemetry snapshot as JSON
    Status,
}
