//! Human-readable error descriptions and structured JSON error formatting.

use lift_core::error::{BuildError, FaultReason, LiftError};

/// Exit code when the controller stopped in the Error state.
pub const EXIT_FAULT: i32 = 3;
/// Exit code for sensor read timeouts.
pub const EXIT_TIMEOUT: i32 = 4;
/// Exit code for other hardware failures.
pub const EXIT_HARDWARE: i32 = 5;

fn find<'a, T: std::error::Error + 'static>(err: &'a eyre::Report) -> Option<&'a T> {
    err.chain().find_map(|e| e.downcast_ref::<T>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = find::<BuildError>(err) {
        return match be {
            BuildError::MissingSensors => {
                "What happened: No sensor gateway was provided to the controller.\nLikely causes: Floor sensors or lines failed to initialize.\nHow to fix: Check the [pins] section and GPIO permissions.".to_string()
            }
            BuildError::MissingActuators => {
                "What happened: No actuator gateway was provided to the controller.\nLikely causes: Motor driver or door servo failed to initialize.\nHow to fix: Check [pins] and [motor], then rerun.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(fault) = find::<FaultReason>(err) {
        return match fault {
            FaultReason::MultipleFloorsActive(floors) => format!(
                "What happened: Floor sensors {floors:?} reported the car at the same time.\nLikely causes: Shorted or stuck sensor, wrong pin order in pins.floor_sensors.\nHow to fix: Inspect the sensors, then reset the fault from the monitor once exactly one reads active."
            ),
            FaultReason::ArrivalWithoutTarget(floor) => format!(
                "What happened: Arrival at floor {floor} was detected while moving with no target.\nLikely causes: Manual override during a trip or inconsistent motor state.\nHow to fix: Check the car position and reset the fault from the monitor."
            ),
        };
    }

    if let Some(le) = find::<LiftError>(err) {
        return match le {
            LiftError::Timeout => "What happened: Load cell read timed out.\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify DT/SCK pins and power, and consider increasing load_cell.ready_timeout_ms in the config.".to_string(),
            LiftError::Hardware(m) | LiftError::HardwareFault(m) => format!(
                "What happened: Hardware error ({m}).\nLikely causes: Wiring, power, or GPIO/UART permissions.\nHow to fix: Check [pins] and [motor.serial], then rerun with --log-level=debug."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = format!("{err:#}").to_ascii_lowercase();

    if lower.contains("open gpio") || (lower.contains(" pin ") && lower.contains("open")) {
        return "What happened: Failed to initialize hardware pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO.".to_string();
    }

    if lower.contains("read config") {
        return format!(
            "What happened: Config file could not be read ({msg}).\nHow to fix: Pass --config with an existing TOML file."
        );
    }

    if lower.contains("invalid configuration")
        || lower.contains("parse config")
        || lower.contains(" must ")
    {
        return format!(
            "What happened: Configuration is invalid or incomplete ({err:#}).\nLikely causes: Missing [pins] for hardware, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes for typed failures; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if find::<FaultReason>(err).is_some() {
        return EXIT_FAULT;
    }
    match find::<LiftError>(err) {
        Some(LiftError::Timeout) => EXIT_TIMEOUT,
        Some(LiftError::Hardware(_) | LiftError::HardwareFault(_)) => EXIT_HARDWARE,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(f) = find::<FaultReason>(err) {
        return match f {
            FaultReason::MultipleFloorsActive(_) => "MultipleFloorsActive",
            FaultReason::ArrivalWithoutTarget(_) => "ArrivalWithoutTarget",
        };
    }
    if find::<BuildError>(err).is_some() {
        return "Build";
    }
    match find::<LiftError>(err) {
        Some(LiftError::Timeout) => "Timeout",
        Some(LiftError::Hardware(_) | LiftError::HardwareFault(_)) => "Hardware",
        Some(_) => "Lift",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
