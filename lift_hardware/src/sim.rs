//! Simulated devices for host-side runs and tests.
//!
//! The shaft model moves the car at a fixed rate while the motor is commanded
//! and reports floor switches from the car position, so the whole control
//! loop can run without hardware. All handles are cheap clones sharing state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lift_traits::{Clock, DoorActuator, Direction, InputLine, LoadCell, Motor, OutputLine};
use tracing::trace;

use crate::error::HwError;

/// Half the length of a floor switch actuator, in floors.
pub const SENSOR_HALF_WIDTH: f32 = 0.15;

#[derive(Debug)]
struct ShaftState {
    position: f32,
    direction: Option<Direction>,
    last_update: Instant,
}

/// Car-in-shaft model shared by the simulated motor and floor switches.
#[derive(Clone)]
pub struct SimulatedShaft {
    state: Arc<Mutex<ShaftState>>,
    clock: Arc<dyn Clock + Send + Sync>,
    floors: usize,
    travel_ms_per_floor: u64,
}

impl SimulatedShaft {
    pub fn new(
        floors: usize,
        start_floor: usize,
        travel_ms_per_floor: u64,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let floors = floors.max(1);
        let start = start_floor.min(floors - 1) as f32;
        Self {
            state: Arc::new(Mutex::new(ShaftState {
                position: start,
                direction: None,
                last_update: clock.now(),
            })),
            clock,
            floors,
            travel_ms_per_floor: travel_ms_per_floor.max(1),
        }
    }

    /// Current car position in floors (fractional between landings).
    pub fn position(&self) -> f32 {
        self.with_state(|s| s.position)
    }

    /// Teleport the car (test setup); motion continues from here.
    pub fn set_position(&self, position: f32) {
        let top = (self.floors - 1) as f32;
        self.with_state(|s| s.position = position.clamp(0.0, top));
    }

    pub fn direction(&self) -> Option<Direction> {
        self.with_state(|s| s.direction)
    }

    pub fn motor(&self) -> ShaftMotor {
        ShaftMotor {
            shaft: self.clone(),
        }
    }

    pub fn floor_switch(&self, floor: usize) -> FloorSwitch {
        FloorSwitch {
            shaft: self.clone(),
            floor,
        }
    }

    /// Floor switch for every landing, lowest first.
    pub fn floor_switches(&self) -> Vec<FloorSwitch> {
        (0..self.floors).map(|f| self.floor_switch(f)).collect()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ShaftState) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.integrate(&mut guard);
        f(&mut guard)
    }

    fn integrate(&self, s: &mut ShaftState) {
        let now = self.clock.now();
        let dt = now.saturating_duration_since(s.last_update);
        s.last_update = now;
        let Some(dir) = s.direction else {
            return;
        };
        let delta = dt.as_secs_f32() * 1000.0 / self.travel_ms_per_floor as f32;
        let top = (self.floors - 1) as f32;
        s.position = match dir {
            Direction::Up => (s.position + delta).min(top),
            Direction::Down => (s.position - delta).max(0.0),
        };
    }
}

/// Hoist motor that drives the simulated shaft.
pub struct ShaftMotor {
    shaft: SimulatedShaft,
}

impl Motor for ShaftMotor {
    fn run(
        &mut self,
        direction: Direction,
        speed_percent: u8,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let dir = (speed_percent > 0).then_some(direction);
        self.shaft.with_state(|s| s.direction = dir);
        trace!(?direction, speed_percent, "sim motor run");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.shaft.with_state(|s| s.direction = None);
        trace!("sim motor stop");
        Ok(())
    }
}

/// Landing switch: active while the car sits within the actuator length.
pub struct FloorSwitch {
    shaft: SimulatedShaft,
    floor: usize,
}

impl InputLine for FloorSwitch {
    fn is_active(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let pos = self.shaft.position();
        Ok((pos - self.floor as f32).abs() <= SENSOR_HALF_WIDTH)
    }
}

/// Boolean line shared between the controller and whoever drives it
/// (tests, the simulator). Works as an input or an output.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLine {
    level: Arc<AtomicBool>,
}

impl SimulatedLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, active: bool) {
        self.level.store(active, Ordering::Relaxed);
    }

    pub fn get(&self) -> bool {
        self.level.load(Ordering::Relaxed)
    }
}

impl InputLine for SimulatedLine {
    fn is_active(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.get())
    }
}

impl OutputLine for SimulatedLine {
    fn set_active(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.set(on);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct LoadState {
    raw: i32,
    failing: bool,
}

/// Load-cell amplifier returning a settable raw value.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLoadCell {
    state: Arc<Mutex<LoadState>>,
}

impl SimulatedLoadCell {
    pub fn new(raw: i32) -> Self {
        let cell = Self::default();
        cell.set_raw(raw);
        cell
    }

    pub fn set_raw(&self, raw: i32) {
        if let Ok(mut s) = self.state.lock() {
            s.raw = raw;
        }
    }

    /// Make subsequent reads time out (amplifier not ready).
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.failing = failing;
        }
    }
}

impl LoadCell for SimulatedLoadCell {
    fn read(&mut self, _timeout: Duration) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let s = self
            .state
            .lock()
            .map_err(|_| HwError::Gpio("load cell state poisoned".into()))?;
        if s.failing {
            return Err(Box::new(HwError::DataReadyTimeout));
        }
        trace!(raw = s.raw, "sim load cell read");
        Ok(s.raw)
    }
}

/// Door servo that records every commanded angle.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDoor {
    angles: Arc<Mutex<Vec<u8>>>,
}

impl SimulatedDoor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_angle(&self) -> Option<u8> {
        self.angles.lock().ok().and_then(|a| a.last().copied())
    }

    pub fn history(&self) -> Vec<u8> {
        self.angles.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl DoorActuator for SimulatedDoor {
    fn set_angle(&mut self, degrees: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut a) = self.angles.lock() {
            a.push(degrees);
        }
        trace!(degrees, "sim door angle");
        Ok(())
    }
}
