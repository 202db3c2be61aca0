#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the elevator controller.
//!
//! Every section has defaults matching the reference four-stop installation,
//! so an empty file is a valid simulator config. `Config::validate` rejects
//! values the controller cannot run with.
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Physical pin assignment (BCM numbering). Only read when driving real hardware.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Pins {
    /// One per floor, index = floor number
    pub floor_sensors: Vec<u8>,
    pub call_buttons: Vec<u8>,
    pub indicators: Vec<u8>,
    pub emergency: Option<u8>,
    /// Door obstruction beam; absent means never obstructed
    pub obstruction: Option<u8>,
    pub hx711_dt: Option<u8>,
    pub hx711_sck: Option<u8>,
    /// H-bridge direction inputs and PWM enable
    pub motor_in1: Option<u8>,
    pub motor_in2: Option<u8>,
    pub motor_pwm: Option<u8>,
    /// Direction line for the serial driver
    pub motor_dir: Option<u8>,
    pub door_servo: Option<u8>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ElevatorCfg {
    pub floors: usize,
    /// Fallback position when no floor sensor is active at startup
    pub ground_floor: usize,
    /// Control loop period
    pub tick_ms: u64,
}

impl Default for ElevatorCfg {
    fn default() -> Self {
        Self {
            floors: 4,
            ground_floor: 0,
            tick_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DoorCfg {
    pub hold_ms: u64,
    /// Absolute limit on DoorOpen regardless of overload
    pub max_open_ms: u64,
    /// Time an open/close command blocks so the actuator reaches position
    pub settle_ms: u64,
    pub open_angle: u8,
    pub close_angle: u8,
}

impl Default for DoorCfg {
    fn default() -> Self {
        Self {
            hold_ms: 3000,
            max_open_ms: 30_000,
            settle_ms: 500,
            open_angle: 90,
            close_angle: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MotorDriver {
    #[default]
    Hbridge,
    Serial,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SerialCfg {
    pub port: PathBuf,
    pub baud: u32,
    /// Modbus slave address of the driver board
    pub address: u8,
    /// PWM frequency programmed into the driver at startup (1..=1000)
    pub pwm_frequency_hz: u16,
}

impl Default for SerialCfg {
    fn default() -> Self {
        Self {
            port: PathBuf::from("/dev/serial0"),
            baud: 9600,
            address: 0x32,
            pwm_frequency_hz: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MotorCfg {
    pub driver: MotorDriver,
    /// Travel speed as a percentage of full scale
    pub speed_percent: u8,
    /// H-bridge PWM frequency
    pub pwm_hz: f64,
    pub serial: SerialCfg,
}

impl Default for MotorCfg {
    fn default() -> Self {
        Self {
            driver: MotorDriver::Hbridge,
            speed_percent: 68,
            pwm_hz: 1000.0,
            serial: SerialCfg::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoadCellCfg {
    pub overload_threshold_kg: f32,
    /// Raw counts per kilogram
    pub scale: f32,
    /// Raw reading at zero load
    pub offset: i32,
    /// Rolling average length in samples
    pub window: usize,
    /// Max wait for data-ready before the sample counts as a transient fault
    pub ready_timeout_ms: u64,
    /// Total clock pulses per read: 25 (A/128), 26 (B/32), 27 (A/64)
    pub gain_pulses: u8,
    /// Samples averaged by a tare
    pub tare_samples: usize,
}

impl Default for LoadCellCfg {
    fn default() -> Self {
        Self {
            overload_threshold_kg: 500.0,
            scale: 1.0,
            offset: 0,
            window: 5,
            ready_timeout_ms: 1000,
            gain_pulses: 25,
            tare_samples: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ButtonsCfg {
    pub debounce_ms: u64,
}

impl Default for ButtonsCfg {
    fn default() -> Self {
        Self { debounce_ms: 50 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LinesCfg {
    /// Treat low level as asserted on every input line
    pub active_low: bool,
}

impl Default for LinesCfg {
    fn default() -> Self {
        Self { active_low: true }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MonitorCfg {
    /// Automatic dispatch at startup
    pub auto_mode: bool,
    /// Weight change that restarts stable-weight averaging
    pub stable_delta_kg: f32,
    pub stable_window_ms: u64,
}

impl Default for MonitorCfg {
    fn default() -> Self {
        Self {
            auto_mode: true,
            stable_delta_kg: 0.13,
            stable_window_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Simulated shaft used when no hardware is attached.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimCfg {
    pub travel_ms_per_floor: u64,
    /// Where the car starts; `None` leaves it between floors
    pub start_floor: Option<usize>,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            travel_ms_per_floor: 2000,
            start_floor: Some(0),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub elevator: ElevatorCfg,
    pub door: DoorCfg,
    pub motor: MotorCfg,
    pub load_cell: LoadCellCfg,
    pub buttons: ButtonsCfg,
    pub lines: LinesCfg,
    pub monitor: MonitorCfg,
    pub logging: Logging,
    pub sim: SimCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        let floors = self.elevator.floors;

        // Elevator
        if floors < 2 {
            eyre::bail!("elevator.floors must be >= 2");
        }
        if floors > 64 {
            eyre::bail!("elevator.floors is unreasonably large (>64)");
        }
        if self.elevator.ground_floor >= floors {
            eyre::bail!("elevator.ground_floor must be < elevator.floors");
        }
        if self.elevator.tick_ms == 0 {
            eyre::bail!("elevator.tick_ms must be >= 1");
        }
        if self.elevator.tick_ms > 10_000 {
            eyre::bail!("elevator.tick_ms is unreasonably large (>10s)");
        }

        // Door
        if self.door.hold_ms == 0 {
            eyre::bail!("door.hold_ms must be >= 1");
        }
        if self.door.max_open_ms < self.door.hold_ms {
            eyre::bail!("door.max_open_ms must be >= door.hold_ms");
        }
        if self.door.settle_ms > 10_000 {
            eyre::bail!("door.settle_ms is unreasonably large (>10s)");
        }
        if self.door.open_angle > 180 || self.door.close_angle > 180 {
            eyre::bail!("door angles must be in [0, 180]");
        }
        if self.door.open_angle == self.door.close_angle {
            eyre::bail!("door.open_angle must differ from door.close_angle");
        }

        // Motor
        if self.motor.speed_percent == 0 || self.motor.speed_percent > 100 {
            eyre::bail!("motor.speed_percent must be in [1, 100]");
        }
        if !(self.motor.pwm_hz.is_finite() && self.motor.pwm_hz > 0.0) {
            eyre::bail!("motor.pwm_hz must be > 0");
        }
        if self.motor.serial.baud == 0 {
            eyre::bail!("motor.serial.baud must be > 0");
        }
        if !(1..=1000).contains(&self.motor.serial.pwm_frequency_hz) {
            eyre::bail!("motor.serial.pwm_frequency_hz must be in [1, 1000]");
        }

        // Load cell
        if !(self.load_cell.overload_threshold_kg.is_finite()
            && self.load_cell.overload_threshold_kg > 0.0)
        {
            eyre::bail!("load_cell.overload_threshold_kg must be > 0");
        }
        if !self.load_cell.scale.is_finite() || self.load_cell.scale == 0.0 {
            eyre::bail!("load_cell.scale must be finite and non-zero");
        }
        if self.load_cell.window == 0 {
            eyre::bail!("load_cell.window must be >= 1");
        }
        if self.load_cell.ready_timeout_ms == 0 {
            eyre::bail!("load_cell.ready_timeout_ms must be >= 1");
        }
        if !(25..=27).contains(&self.load_cell.gain_pulses) {
            eyre::bail!("load_cell.gain_pulses must be 25, 26 or 27");
        }
        if self.load_cell.tare_samples == 0 {
            eyre::bail!("load_cell.tare_samples must be >= 1");
        }

        // Monitor
        if self.monitor.stable_delta_kg.is_sign_negative() {
            eyre::bail!("monitor.stable_delta_kg must be >= 0");
        }

        // Sim
        if self.sim.travel_ms_per_floor == 0 {
            eyre::bail!("sim.travel_ms_per_floor must be >= 1");
        }
        if let Some(start) = self.sim.start_floor
            && start >= floors
        {
            eyre::bail!("sim.start_floor must be < elevator.floors");
        }

        // Pins: per-floor lists are either unset (simulation) or complete
        for (name, list) in [
            ("pins.floor_sensors", &self.pins.floor_sensors),
            ("pins.call_buttons", &self.pins.call_buttons),
            ("pins.indicators", &self.pins.indicators),
        ] {
            if !list.is_empty() && list.len() != floors {
                eyre::bail!("{name} must list exactly {floors} pins, got {}", list.len());
            }
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
