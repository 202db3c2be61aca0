//! Builder for `Elevator`.
//!
//! Gateways are required; shaft, door and clock fall back to defaults.
//! `build()` validates the configuration against the gateways and seeds the
//! starting floor from the sensors.

use std::collections::BTreeSet;
use std::sync::Arc;

use lift_traits::{Clock, MonotonicClock};

use crate::actuators::ActuatorGateway;
use crate::config::{DoorCfg, ShaftCfg};
use crate::elevator::Elevator;
use crate::error::{BuildError, Result};
use crate::sensors::SensorGateway;
use crate::state::ElevatorState;

impl<S: SensorGateway, A: ActuatorGateway> Elevator<S, A> {
    /// Start building an Elevator.
    pub fn builder() -> ElevatorBuilder<S, A> {
        ElevatorBuilder::default()
    }
}

pub struct ElevatorBuilder<S, A> {
    sensors: Option<S>,
    actuators: Option<A>,
    shaft: Option<ShaftCfg>,
    door: Option<DoorCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    auto_mode: bool,
}

impl<S, A> Default for ElevatorBuilder<S, A> {
    fn default() -> Self {
        Self {
            sensors: None,
            actuators: None,
            shaft: None,
            door: None,
            clock: None,
            auto_mode: true,
        }
    }
}

impl<S: SensorGateway, A: ActuatorGateway> ElevatorBuilder<S, A> {
    pub fn with_sensors(mut self, sensors: S) -> Self {
        self.sensors = Some(sensors);
        self
    }

    pub fn with_actuators(mut self, actuators: A) -> Self {
        self.actuators = Some(actuators);
        self
    }

    pub fn with_shaft(mut self, shaft: ShaftCfg) -> Self {
        self.shaft = Some(shaft);
        self
    }

    pub fn with_door(mut self, door: DoorCfg) -> Self {
        self.door = Some(door);
        self
    }

    /// Clock for door timing; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_auto_mode(mut self, enabled: bool) -> Self {
        self.auto_mode = enabled;
        self
    }

    pub fn build(self) -> Result<Elevator<S, A>> {
        let sensors = self
            .sensors
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensors))?;
        let actuators = self
            .actuators
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuators))?;
        let shaft = self.shaft.unwrap_or_default();
        let door = self.door.unwrap_or_default();

        // ── Validation ───────────────────────────────────────────────────────
        if shaft.floors == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "floors must be >= 1",
            )));
        }
        if sensors.floor_count() != shaft.floors {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "one floor sensor per floor required",
            )));
        }
        if shaft.ground_floor >= shaft.floors {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "ground floor out of range",
            )));
        }
        if shaft.speed_percent == 0 || shaft.speed_percent > 100 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "speed_percent must be in 1..=100",
            )));
        }
        if door.max_open_ms < door.hold_ms {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "max_open_ms must be >= hold_ms",
            )));
        }

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let epoch = clock.now();
        let mut elevator = Elevator {
            sensors,
            actuators,
            current_floor: shaft.ground_floor,
            shaft,
            door,
            clock,
            epoch,
            state: ElevatorState::Idle,
            target_floor: None,
            pending: BTreeSet::new(),
            emergency_active: false,
            door_obstructed: false,
            overloaded: false,
            door_opened_at: None,
            door_open_since: None,
            auto_mode: self.auto_mode,
            fault: None,
            homing: false,
            between: None,
        };
        elevator.initialize();
        Ok(elevator)
    }
}
