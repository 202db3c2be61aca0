//! `lift` binary: control loop, self-check and status over simulated or real hardware.

mod assemble;
mod cli;
mod error_fmt;

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use lift_core::monitor::{self, MonitorHandle};
use lift_core::{ActuatorGateway, ElevatorState, OverrideCommand, RunSummary};
use serde_json::json;
use tracing_appender::non_blocking::WorkerGuard;

use crate::assemble::Devices;
use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> Result<()> {
    let _ = color_eyre::install();
    let cfg = lift_config::load_file(&cli.config)?;
    let _file_guard = init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging);
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run {
            max_ticks,
            calls,
            monitor_stdin,
        } => run(&cfg, cli.json, max_ticks, &calls, monitor_stdin),
        Commands::SelfCheck => self_check(&cfg, cli.json),
        Commands::Status => status(&cfg),
    }
}

// ── Logging ──────────────────────────────────────────────────────────────────

/// Console layer on stderr plus an optional JSON file sink from `[logging]`.
///
/// Level precedence: RUST_LOG, then --log-level, then `[logging].level`.
/// The returned guard flushes the file sink when dropped.
fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &lift_config::Logging,
) -> Option<WorkerGuard> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers = Vec::new();
    if json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed(),
        );
    } else {
        layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
    }

    let mut guard = None;
    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "lift.log".into(), |n| n.to_string_lossy().into_owned());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init();
    guard
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn run(
    cfg: &lift_config::Config,
    json: bool,
    max_ticks: Option<u64>,
    calls: &[usize],
    monitor_stdin: bool,
) -> Result<()> {
    let (devices, backend) = Devices::from_config(cfg)?;
    let (handle, port) = monitor::channel();
    let mut controller = devices.into_controller(cfg)?.with_monitor(port);
    for &floor in calls {
        controller.elevator_mut().request_floor(floor);
    }
    if monitor_stdin {
        spawn_stdin_monitor(handle);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    tracing::info!(backend, ?max_ticks, calls = ?calls, "starting control loop");
    let summary = controller.run(&shutdown, max_ticks);
    print_summary(&summary, json);

    if summary.state == ElevatorState::Error
        && let Some(fault) = controller.elevator().fault()
    {
        return Err(eyre::Report::new(fault.clone())).wrap_err("controller stopped in the error state");
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        println!(
            "{}",
            json!({
                "timestamp": unix_ms(),
                "ticks": summary.ticks,
                "state": summary.state,
                "current_floor": summary.current_floor,
                "pending_calls": summary.pending_calls,
            })
        );
    } else {
        println!(
            "Run complete: {} ticks, state {}, floor {}, pending calls {:?}",
            summary.ticks, summary.state, summary.current_floor, summary.pending_calls
        );
    }
}

/// Milliseconds since the Unix epoch for report timestamps.
fn unix_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Forward JSON-line override commands from stdin until EOF.
fn spawn_stdin_monitor(handle: MonitorHandle) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<OverrideCommand>(line) {
                Ok(cmd) => {
                    if handle.send(cmd).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, line, "ignoring malformed monitor command"),
            }
        }
        tracing::debug!("monitor input closed");
    });
}

fn self_check(cfg: &lift_config::Config, json: bool) -> Result<()> {
    let (mut devices, backend) = Devices::from_config(cfg)?;
    let report = devices.self_check(backend, cfg.load_cell.ready_timeout_ms)?;
    if json {
        println!(
            "{}",
            json!({
                "ok": true,
                "backend": report.backend,
                "floors_active": report.floors_active,
                "emergency": report.emergency,
                "obstruction": report.obstruction,
                "load_raw": report.load_raw,
            })
        );
    } else {
        println!(
            "OK ({}): floor sensors active {:?}, emergency {}, obstruction {}, load raw {}",
            report.backend,
            report.floors_active,
            report.emergency,
            report.obstruction,
            report
                .load_raw
                .map_or_else(|| "n/a".to_string(), |r| r.to_string())
        );
    }
    Ok(())
}

fn status(cfg: &lift_config::Config) -> Result<()> {
    let (devices, _) = Devices::from_config(cfg)?;
    let (handle, port) = monitor::channel();
    let mut controller = devices.into_controller(cfg)?.with_monitor(port);
    controller.tick();
    if let Err(e) = controller.elevator_mut().actuators_mut().stop() {
        tracing::warn!(error = %e, "motor stop after status tick failed");
    }
    let telemetry = handle
        .telemetry_json()
        .ok_or_else(|| eyre::eyre!("no telemetry published"))?;
    println!("{telemetry}");
    Ok(())
}
