//! Elevator state machine.
//!
//! One `process()` call per control tick. Safety signals are read first,
//! then overload and obstruction are refreshed, external motor overrides are
//! reconciled, and finally the current state is dispatched.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use lift_traits::{Clock, Direction};
use tracing::{debug, error, info, warn};

use crate::actuators::ActuatorGateway;
use crate::config::{DoorCfg, ShaftCfg};
use crate::dispatch;
use crate::error::{FaultReason, LiftError};
use crate::sensors::{FloorReading, SensorGateway};
use crate::state::{ElevatorState, MotorState};

pub struct Elevator<S: SensorGateway, A: ActuatorGateway> {
    pub(crate) sensors: S,
    pub(crate) actuators: A,
    pub(crate) shaft: ShaftCfg,
    pub(crate) door: DoorCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,

    pub(crate) state: ElevatorState,
    pub(crate) current_floor: usize,
    pub(crate) target_floor: Option<usize>,
    pub(crate) pending: BTreeSet<usize>,
    pub(crate) emergency_active: bool,
    pub(crate) door_obstructed: bool,
    pub(crate) overloaded: bool,
    /// Hold timer start; re-armed while overloaded.
    pub(crate) door_opened_at: Option<u64>,
    /// When the door last finished opening; never re-armed.
    pub(crate) door_open_since: Option<u64>,
    pub(crate) auto_mode: bool,
    pub(crate) fault: Option<FaultReason>,
    /// Startup position was assumed, not confirmed by a sensor.
    pub(crate) homing: bool,
    /// Side of `current_floor` the car sits on after leaving its sensor.
    pub(crate) between: Option<Direction>,
}

impl<S: SensorGateway, A: ActuatorGateway> core::fmt::Debug for Elevator<S, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Elevator")
            .field("state", &self.state)
            .field("current_floor", &self.current_floor)
            .field("target_floor", &self.target_floor)
            .field("pending", &self.pending)
            .field("emergency_active", &self.emergency_active)
            .finish_non_exhaustive()
    }
}

impl<S: SensorGateway, A: ActuatorGateway> Elevator<S, A> {
    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn state(&self) -> ElevatorState {
        self.state
    }

    pub fn current_floor(&self) -> usize {
        self.current_floor
    }

    pub fn target_floor(&self) -> Option<usize> {
        self.target_floor
    }

    pub fn pending_calls(&self) -> &BTreeSet<usize> {
        &self.pending
    }

    pub fn is_pending(&self, floor: usize) -> bool {
        self.pending.contains(&floor)
    }

    pub fn floors(&self) -> usize {
        self.shaft.floors
    }

    pub fn emergency_active(&self) -> bool {
        self.emergency_active
    }

    pub fn overloaded(&self) -> bool {
        self.overloaded
    }

    pub fn door_obstructed(&self) -> bool {
        self.door_obstructed
    }

    /// Milliseconds (controller time) at which the hold timer was last armed.
    pub fn door_opened_at(&self) -> Option<u64> {
        self.door_opened_at
    }

    pub fn fault(&self) -> Option<&FaultReason> {
        self.fault.as_ref()
    }

    pub fn speed_percent(&self) -> u8 {
        self.shaft.speed_percent
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    pub fn actuators_mut(&mut self) -> &mut A {
        &mut self.actuators
    }

    /// Milliseconds since the elevator was built, on its clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    // ── Auto mode ────────────────────────────────────────────────────────────

    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    /// Enable or disable automatic dispatch from Idle. Queued calls are kept.
    pub fn set_auto_mode(&mut self, enabled: bool) {
        if self.auto_mode != enabled {
            info!(enabled, "auto mode changed");
        }
        self.auto_mode = enabled;
    }

    pub fn toggle_auto_mode(&mut self) -> bool {
        self.set_auto_mode(!self.auto_mode);
        self.auto_mode
    }

    /// Manual motor commands are refused while this holds.
    pub fn motion_inhibited(&self) -> bool {
        self.emergency_active
            || matches!(self.state, ElevatorState::EmergencyStop | ElevatorState::Error)
    }

    // ── Operations ───────────────────────────────────────────────────────────

    /// Queue a call for `floor` and light its indicator.
    ///
    /// Out-of-range floors are ignored. Repeating a pending call has no effect.
    pub fn request_floor(&mut self, floor: usize) {
        if floor >= self.shaft.floors {
            debug!(floor, floors = self.shaft.floors, "ignoring out-of-range floor request");
            return;
        }
        if self.pending.insert(floor) {
            self.sensors.set_indicator(floor, true);
            info!(floor, "floor requested");
        }
    }

    /// Stop immediately and hold in EmergencyStop. Pending calls are kept.
    ///
    /// A faulted elevator records the emergency but stays in Error.
    pub fn emergency_stop(&mut self) {
        self.emergency_active = true;
        self.target_floor = None;
        self.stop_motor();
        if self.state == ElevatorState::Error {
            warn!("emergency stop while faulted");
            return;
        }
        self.state = ElevatorState::EmergencyStop;
        warn!("EMERGENCY STOP ACTIVATED");
    }

    /// Clear the emergency flag and return to Idle.
    ///
    /// `process()` calls this on its own once the emergency signal reads clear.
    pub fn reset_emergency(&mut self) {
        self.emergency_active = false;
        if self.state == ElevatorState::EmergencyStop {
            self.state = ElevatorState::Idle;
        }
        info!("emergency stop reset");
    }

    /// Leave the Error state once the floor sensors agree on a single landing.
    ///
    /// Returns the re-seeded current floor.
    pub fn reset_fault(&mut self) -> Result<usize, LiftError> {
        if self.state != ElevatorState::Error {
            return Err(LiftError::State(format!(
                "reset_fault requires the error state, elevator is {}",
                self.state
            )));
        }
        match self.sensors.detect_floor() {
            FloorReading::At(floor) => {
                self.stop_motor();
                self.current_floor = floor;
                self.target_floor = None;
                self.homing = false;
                self.between = None;
                self.fault = None;
                self.state = if self.emergency_active {
                    ElevatorState::EmergencyStop
                } else {
                    ElevatorState::Idle
                };
                info!(floor, state = %self.state, "fault reset");
                Ok(floor)
            }
            FloorReading::Between => Err(LiftError::State(
                "no floor sensor active; cannot confirm position".into(),
            )),
            FloorReading::Conflict(floors) => Err(LiftError::State(format!(
                "floor sensors {floors:?} still active together"
            ))),
        }
    }

    /// Closest pending call; ties go to the lowest floor.
    pub fn next_floor(&self) -> Option<usize> {
        dispatch::next_floor(&self.pending, self.current_floor)
    }

    /// Register every debounced button press as a call.
    pub fn poll_buttons(&mut self) {
        for floor in 0..self.shaft.floors {
            if self.sensors.read_button(floor) {
                self.request_floor(floor);
            }
        }
    }

    /// Drive every indicator to match the pending calls.
    pub fn refresh_indicators(&mut self) {
        for floor in 0..self.shaft.floors {
            let on = self.pending.contains(&floor);
            self.sensors.set_indicator(floor, on);
        }
    }

    /// Seed `current_floor` from the floor sensors.
    pub(crate) fn initialize(&mut self) {
        match self.sensors.detect_floor() {
            FloorReading::At(floor) => {
                self.current_floor = floor;
                info!(floor, "elevator initialized");
            }
            FloorReading::Between => {
                let ground = self.shaft.ground_floor;
                self.current_floor = ground;
                self.homing = true;
                info!(ground, "floor position unknown, returning to ground floor");
                self.request_floor(ground);
            }
            FloorReading::Conflict(floors) => {
                self.current_floor = self.shaft.ground_floor;
                self.enter_fault(FaultReason::MultipleFloorsActive(floors));
            }
        }
    }

    // ── Tick ─────────────────────────────────────────────────────────────────

    /// One control tick. Never fails; hardware errors are logged and retried
    /// on the next tick.
    pub fn process(&mut self) {
        let emergency = self.sensors.read_emergency();
        if emergency && self.state != ElevatorState::EmergencyStop {
            self.emergency_stop();
            return;
        }

        self.overloaded = self.sensors.check_overload();
        self.door_obstructed = self.sensors.read_obstruction();

        let reading = self.sensors.detect_floor();
        if self.state != ElevatorState::Error {
            if self.state != ElevatorState::EmergencyStop
                && let FloorReading::Conflict(floors) = &reading
            {
                self.enter_fault(FaultReason::MultipleFloorsActive(floors.clone()));
                return;
            }
            self.track_position(&reading);
            if self.beyond_shaft_end() {
                warn!(floor = self.current_floor, "car past the end floor; stopping");
                self.stop_motor();
                if self.state.is_moving() {
                    self.target_floor = None;
                    self.state = ElevatorState::Idle;
                }
            }
        }

        self.reconcile();

        match self.state {
            ElevatorState::Idle => self.on_idle(),
            ElevatorState::MovingUp | ElevatorState::MovingDown => self.on_moving(&reading),
            ElevatorState::DoorOpening => self.on_door_opening(),
            ElevatorState::DoorOpen => self.on_door_open(),
            ElevatorState::DoorClosing => self.on_door_closing(),
            ElevatorState::EmergencyStop => {
                if self.actuators.motor_state().is_running() {
                    warn!("motor still running in emergency stop; stopping again");
                    self.stop_motor();
                }
                if !emergency && !self.actuators.motor_state().is_running() {
                    self.reset_emergency();
                }
            }
            ElevatorState::Error => {
                self.emergency_active = emergency;
                self.stop_motor();
            }
        }
    }

    /// Follow the car through the shaft using the floor sensors.
    ///
    /// Any single active sensor pins the car to that floor. Leaving a sensor
    /// records which side of it the car went, so a stop between floors still
    /// plans the next trip in the right direction.
    fn track_position(&mut self, reading: &FloorReading) {
        match *reading {
            FloorReading::At(floor) => {
                if floor != self.current_floor {
                    debug!(from = self.current_floor, floor, "floor position updated");
                }
                self.current_floor = floor;
                self.between = None;
                self.homing = false;
            }
            FloorReading::Between if !self.homing && self.between.is_none() => {
                self.between = match self.actuators.motor_state() {
                    MotorState::Up => Some(Direction::Up),
                    MotorState::Down => Some(Direction::Down),
                    MotorState::Stopped => None,
                };
            }
            _ => {}
        }
    }

    /// Motor still driving the car past the top or bottom landing.
    fn beyond_shaft_end(&self) -> bool {
        let top = self.shaft.floors.saturating_sub(1);
        match (self.between, self.actuators.motor_state()) {
            (Some(Direction::Up), MotorState::Up) => self.current_floor >= top,
            (Some(Direction::Down), MotorState::Down) => self.current_floor == 0,
            _ => false,
        }
    }

    /// Re-read the motor after external overrides and restore consistency.
    fn reconcile(&mut self) {
        let motor = self.actuators.motor_state();
        let expected = match self.state {
            ElevatorState::MovingUp => Some(MotorState::Up),
            ElevatorState::MovingDown => Some(MotorState::Down),
            _ => None,
        };
        if let Some(expected) = expected
            && motor != expected
        {
            warn!(
                target = ?self.target_floor,
                ?motor,
                "trip interrupted by motor override; call stays pending"
            );
            self.target_floor = None;
            self.state = ElevatorState::Idle;
            return;
        }
        if self.state.is_door_state() && motor.is_running() {
            warn!(?motor, state = %self.state, "motor running with door in use; stopping");
            self.stop_motor();
        }
    }

    fn on_idle(&mut self) {
        if !self.auto_mode {
            return;
        }
        let Some(next) = self.next_floor() else {
            return;
        };
        let current = self.current_floor;
        let up = match self.between {
            // Car sits above `current`: only higher floors are still up
            Some(Direction::Up) => next > current,
            Some(Direction::Down) => next >= current,
            None if next != current => next > current,
            None if self.homing && !self.sensors.read_floor(current) => false,
            None => {
                self.clear_call(current);
                self.state = ElevatorState::DoorOpening;
                info!(floor = current, "call at current floor");
                return;
            }
        };
        let speed = self.shaft.speed_percent;
        if up {
            if self.actuators.move_up(speed).is_ok() {
                self.target_floor = Some(next);
                self.state = ElevatorState::MovingUp;
                info!(from = current, to = next, "moving up");
            }
        } else if self.actuators.move_down(speed).is_ok() {
            self.target_floor = Some(next);
            self.state = ElevatorState::MovingDown;
            if self.homing {
                info!(to = next, "homing down to ground floor");
            } else {
                info!(from = current, to = next, "moving down");
            }
        }
    }

    fn on_moving(&mut self, reading: &FloorReading) {
        let Some(target) = self.target_floor else {
            self.stop_motor();
            match *reading {
                FloorReading::At(floor) => {
                    self.enter_fault(FaultReason::ArrivalWithoutTarget(floor));
                }
                _ => {
                    warn!("moving without a target; stopping");
                    self.state = ElevatorState::Idle;
                }
            }
            return;
        };
        let FloorReading::At(floor) = *reading else {
            return;
        };
        if floor == target {
            self.stop_motor();
            self.current_floor = target;
            self.target_floor = None;
            self.homing = false;
            self.clear_call(target);
            self.state = ElevatorState::DoorOpening;
            info!(floor = target, "arrived");
            return;
        }
        let overshot = match self.state {
            ElevatorState::MovingUp => floor > target,
            _ => floor < target,
        };
        if overshot {
            self.stop_motor();
            self.target_floor = None;
            self.state = ElevatorState::Idle;
            warn!(floor, target, "passed the target floor; re-planning");
        }
    }

    fn on_door_opening(&mut self) {
        if self.actuators.door_open().is_ok() {
            let now = self.now_ms();
            self.door_opened_at = Some(now);
            self.door_open_since = Some(now);
            self.state = ElevatorState::DoorOpen;
            info!(floor = self.current_floor, "door open");
        }
    }

    fn on_door_open(&mut self) {
        let now = self.now_ms();
        let opened_at = *self.door_opened_at.get_or_insert(now);
        let open_since = *self.door_open_since.get_or_insert(now);

        if now.saturating_sub(open_since) >= self.door.max_open_ms {
            warn!(open_ms = now - open_since, "door open timeout, forcing close");
            self.state = ElevatorState::DoorClosing;
            return;
        }
        if now.saturating_sub(opened_at) >= self.door.hold_ms {
            if self.overloaded {
                debug!("overloaded, holding door open");
                self.door_opened_at = Some(now);
            } else if !self.door_obstructed {
                info!("door closing");
                self.state = ElevatorState::DoorClosing;
            }
        }
    }

    fn on_door_closing(&mut self) {
        if self.door_obstructed {
            warn!("door obstruction detected, reopening");
            self.state = ElevatorState::DoorOpening;
            return;
        }
        if self.actuators.door_close().is_ok() && self.actuators.door_state().is_closed() {
            self.door_opened_at = None;
            self.door_open_since = None;
            self.state = ElevatorState::Idle;
            info!("door closed, elevator idle");
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn clear_call(&mut self, floor: usize) {
        if self.pending.remove(&floor) {
            self.sensors.set_indicator(floor, false);
        }
    }

    /// Best-effort stop. States that must not move re-check the motor each
    /// tick and stop again.
    fn stop_motor(&mut self) {
        if let Err(e) = self.actuators.stop() {
            warn!(error = %e, state = %self.state, "stop command failed");
        }
    }

    fn enter_fault(&mut self, reason: FaultReason) {
        error!(%reason, "elevator fault");
        self.stop_motor();
        self.target_floor = None;
        self.fault = Some(reason);
        self.state = ElevatorState::Error;
    }
}
