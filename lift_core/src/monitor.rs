//! Remote monitor and override port.
//!
//! A network layer (or any other thread) holds a cloneable `MonitorHandle`.
//! Commands travel over a channel to the `MonitorPort` owned by the control
//! loop and take effect at the start of the next tick. Each tick publishes
//! a `Telemetry` snapshot the handle can read or serialize.

use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::actuators::ActuatorGateway;
use crate::elevator::Elevator;
use crate::error::LiftError;
use crate::sensors::{SensorGateway, WeightReading};
use crate::state::{DoorState, ElevatorState, MotorState};

/// Samples kept per stable-weight averaging window.
const MAX_WINDOW_SAMPLES: usize = 50;

/// Commands accepted from the monitor surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum OverrideCommand {
    /// Run the hoist upward, bypassing the state machine.
    MotorForward,
    /// Run the hoist downward, bypassing the state machine.
    MotorBackward,
    MotorStop,
    SetAutoMode { enabled: bool },
    ToggleAutoMode,
    SetOverloadThreshold { kg: f32 },
    Tare,
    ResetFault,
    RequestFloor { floor: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightStatus {
    Stable,
    Calculating,
}

/// Weight payload: `{ weight, raw, status, sensor_ready }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTelemetry {
    pub weight: f32,
    pub raw: i32,
    pub status: WeightStatus,
    pub sensor_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevatorSnapshot {
    pub state: ElevatorState,
    pub current_floor: usize,
    pub target_floor: Option<usize>,
    pub pending_calls: Vec<usize>,
    pub emergency_active: bool,
    pub overloaded: bool,
    pub door_obstructed: bool,
    pub auto_mode: bool,
    pub overload_threshold_kg: f32,
    pub stable_weight_kg: Option<f32>,
    pub motor: MotorState,
    pub door: DoorState,
    pub fault: Option<String>,
}

/// Published once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub tick: u64,
    #[serde(flatten)]
    pub weight: WeightTelemetry,
    pub elevator: ElevatorSnapshot,
}

impl<S: SensorGateway, A: ActuatorGateway> Elevator<S, A> {
    pub fn snapshot(&self) -> ElevatorSnapshot {
        ElevatorSnapshot {
            state: self.state,
            current_floor: self.current_floor,
            target_floor: self.target_floor,
            pending_calls: self.pending.iter().copied().collect(),
            emergency_active: self.emergency_active,
            overloaded: self.overloaded,
            door_obstructed: self.door_obstructed,
            auto_mode: self.auto_mode,
            overload_threshold_kg: self.sensors.overload_threshold(),
            stable_weight_kg: None,
            motor: self.actuators.motor_state(),
            door: self.actuators.door_state(),
            fault: self.fault.as_ref().map(ToString::to_string),
        }
    }
}

// ── Stable-weight tracker ────────────────────────────────────────────────────

/// Debounces the displayed weight: a change larger than `delta_kg` from the
/// last stable value starts a window, and the mean over that window becomes
/// the new stable weight.
#[derive(Debug, Clone)]
pub struct WeightTracker {
    delta_kg: f32,
    window_ms: u64,
    stable: Option<f32>,
    calculating_since: Option<u64>,
    samples: Vec<f32>,
}

impl WeightTracker {
    pub fn new(delta_kg: f32, window_ms: u64) -> Self {
        Self {
            delta_kg,
            window_ms,
            stable: None,
            calculating_since: None,
            samples: Vec::with_capacity(MAX_WINDOW_SAMPLES),
        }
    }

    pub fn stable_weight(&self) -> Option<f32> {
        self.stable
    }

    pub fn update(&mut self, weight_kg: f32, now_ms: u64) -> WeightStatus {
        let Some(stable) = self.stable else {
            self.stable = Some(weight_kg);
            return WeightStatus::Stable;
        };

        if self.calculating_since.is_none() && (weight_kg - stable).abs() > self.delta_kg {
            info!(from = stable, to = weight_kg, "weight change detected, averaging");
            self.calculating_since = Some(now_ms);
            self.samples.clear();
        }

        let Some(since) = self.calculating_since else {
            return WeightStatus::Stable;
        };
        if self.samples.len() < MAX_WINDOW_SAMPLES {
            self.samples.push(weight_kg);
        }
        if now_ms.saturating_sub(since) < self.window_ms {
            return WeightStatus::Calculating;
        }

        let mean = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
        info!(weight_kg = mean, samples = self.samples.len(), "stable weight");
        self.stable = Some(mean);
        self.calculating_since = None;
        self.samples.clear();
        WeightStatus::Stable
    }

    pub fn telemetry(&mut self, reading: WeightReading, now_ms: u64) -> WeightTelemetry {
        let status = self.update(reading.kg, now_ms);
        WeightTelemetry {
            weight: reading.kg,
            raw: reading.raw,
            status,
            sensor_ready: reading.sensor_ready,
        }
    }
}

// ── Channel ──────────────────────────────────────────────────────────────────

type Shared = Arc<Mutex<Option<Telemetry>>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Option<Telemetry>> {
    match shared.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Client side: send overrides, read the latest telemetry.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    tx: Sender<OverrideCommand>,
    latest: Shared,
}

impl MonitorHandle {
    pub fn send(&self, cmd: OverrideCommand) -> Result<(), LiftError> {
        self.tx.send(cmd).map_err(|_| LiftError::Disconnected)
    }

    pub fn telemetry(&self) -> Option<Telemetry> {
        lock(&self.latest).clone()
    }

    /// Full telemetry as a JSON object.
    pub fn telemetry_json(&self) -> Option<String> {
        self.telemetry()
            .and_then(|t| serde_json::to_string(&t).ok())
    }

    /// Weight payload only, the way the dashboard polls it.
    pub fn weight_json(&self) -> Option<String> {
        self.telemetry()
            .and_then(|t| serde_json::to_string(&t.weight).ok())
    }
}

/// Control-loop side.
#[derive(Debug)]
pub struct MonitorPort {
    rx: Receiver<OverrideCommand>,
    latest: Shared,
}

impl MonitorPort {
    /// Every command queued since the last call, in arrival order.
    pub fn drain(&self) -> Vec<OverrideCommand> {
        self.rx.try_iter().collect()
    }

    pub fn publish(&self, telemetry: Telemetry) {
        *lock(&self.latest) = Some(telemetry);
    }
}

pub fn channel() -> (MonitorHandle, MonitorPort) {
    let (tx, rx) = unbounded();
    let latest: Shared = Arc::new(Mutex::new(None));
    (
        MonitorHandle {
            tx,
            latest: latest.clone(),
        },
        MonitorPort { rx, latest },
    )
}
