#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core elevator control logic (hardware-agnostic).
//!
//! All hardware interactions go through the `lift_traits` device traits,
//! wrapped by two gateways the state machine talks to.
//!
//! ## Architecture
//!
//! - **Sensor gateway**: floor switches, debounced call buttons, safety lines,
//!   indicators and the averaged load cell (`sensors` module)
//! - **Actuator gateway**: hoist motor and door with settle delay
//!   (`actuators`, `door` modules)
//! - **State machine**: dispatch, door timing, overload, emergency stop and
//!   fault handling (`elevator` module)
//! - **Control loop**: fixed-period ticks, button polling, indicator refresh,
//!   telemetry (`controller` module)
//! - **Monitor**: override commands and JSON telemetry over a channel
//!   (`monitor` module)

pub mod actuators;
pub mod builder;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod dispatch;
pub mod door;
pub mod elevator;
pub mod error;
pub mod hw_error;
pub mod monitor;
pub mod sensors;
pub mod state;
pub mod util;

pub use actuators::{ActuatorGateway, Actuators};
pub use builder::ElevatorBuilder;
pub use calibration::Calibration;
pub use config::{ButtonCfg, DoorCfg, LoadCfg, LoopCfg, MonitorCfg, ShaftCfg};
pub use controller::{Controller, RunSummary, apply_override};
pub use door::Door;
pub use elevator::Elevator;
pub use error::{BuildError, FaultReason, LiftError, Result};
pub use monitor::{
    ElevatorSnapshot, MonitorHandle, MonitorPort, OverrideCommand, Telemetry, WeightStatus,
    WeightTelemetry, WeightTracker,
};
pub use sensors::{FloorReading, SensorGateway, Sensors, WeightReading};
pub use state::{DoorState, ElevatorState, MotorState};

/// Elevator over the boxed-line gateways used by the CLI and the simulator.
pub type StandardElevator = Elevator<Sensors, Actuators>;
