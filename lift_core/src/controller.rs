//! Fixed-period control loop around the state machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use lift_traits::Clock;
use tracing::{info, warn};

use crate::actuators::ActuatorGateway;
use crate::config::{LoopCfg, MonitorCfg};
use crate::elevator::Elevator;
use crate::monitor::{MonitorPort, OverrideCommand, Telemetry, WeightTracker};
use crate::sensors::SensorGateway;
use crate::state::ElevatorState;
use crate::util::{duration_ms, remaining};

/// Outcome of `Controller::run`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub state: ElevatorState,
    pub current_floor: usize,
    pub pending_calls: Vec<usize>,
}

pub struct Controller<S: SensorGateway, A: ActuatorGateway> {
    elevator: Elevator<S, A>,
    port: Option<MonitorPort>,
    tracker: WeightTracker,
    period: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
    ticks: u64,
    last: Option<Telemetry>,
}

impl<S: SensorGateway, A: ActuatorGateway> Controller<S, A> {
    pub fn new(
        elevator: Elevator<S, A>,
        loop_cfg: &LoopCfg,
        monitor_cfg: &MonitorCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            elevator,
            port: None,
            tracker: WeightTracker::new(monitor_cfg.stable_delta_kg, monitor_cfg.stable_window_ms),
            period: loop_cfg.period(),
            clock,
            ticks: 0,
            last: None,
        }
    }

    pub fn with_monitor(mut self, port: MonitorPort) -> Self {
        self.port = Some(port);
        self
    }

    pub fn elevator(&self) -> &Elevator<S, A> {
        &self.elevator
    }

    pub fn elevator_mut(&mut self) -> &mut Elevator<S, A> {
        &mut self.elevator
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Telemetry published by the most recent tick.
    pub fn last_telemetry(&self) -> Option<&Telemetry> {
        self.last.as_ref()
    }

    /// One control iteration without the trailing sleep.
    pub fn tick(&mut self) -> &Telemetry {
        if let Some(port) = self.port.as_ref() {
            for cmd in port.drain() {
                apply_override(&mut self.elevator, &cmd);
            }
        }
        self.elevator.poll_buttons();
        self.elevator.refresh_indicators();
        self.elevator.process();

        self.ticks += 1;
        let now = self.elevator.now_ms();
        let weight = self
            .tracker
            .telemetry(self.elevator.sensors().last_weight(), now);
        let mut snapshot = self.elevator.snapshot();
        snapshot.stable_weight_kg = self.tracker.stable_weight();
        let telemetry = Telemetry {
            tick: self.ticks,
            weight,
            elevator: snapshot,
        };
        if let Some(port) = self.port.as_ref() {
            port.publish(telemetry.clone());
        }
        self.last.insert(telemetry)
    }

    /// Tick at the fixed period until `shutdown` is set or `max_ticks` is reached.
    ///
    /// The motor is stopped on the way out.
    pub fn run(&mut self, shutdown: &AtomicBool, max_ticks: Option<u64>) -> RunSummary {
        info!(period_ms = duration_ms(self.period), "control loop started");
        let mut ran = 0u64;
        while !shutdown.load(Ordering::Relaxed) && max_ticks.is_none_or(|max| ran < max) {
            let start = self.clock.now();
            self.tick();
            ran += 1;
            let spent = self.clock.now().saturating_duration_since(start);
            if spent > self.period {
                warn!(spent_ms = duration_ms(spent), "tick overran its period");
            }
            self.clock.sleep(remaining(self.period, spent));
        }
        if let Err(e) = self.elevator.actuators_mut().stop() {
            warn!(error = %e, "motor stop on shutdown failed");
        }
        let summary = self.summary();
        info!(
            ticks = summary.ticks,
            state = %summary.state,
            floor = summary.current_floor,
            "control loop stopped"
        );
        summary
    }

    /// Tick (with sleeps) until `done` holds or `max_ticks` elapse.
    /// Returns whether `done` was reached.
    pub fn run_until(
        &mut self,
        mut done: impl FnMut(&Elevator<S, A>) -> bool,
        max_ticks: u64,
    ) -> bool {
        for _ in 0..max_ticks {
            if done(&self.elevator) {
                return true;
            }
            let start = self.clock.now();
            self.tick();
            let spent = self.clock.now().saturating_duration_since(start);
            self.clock.sleep(remaining(self.period, spent));
        }
        done(&self.elevator)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.ticks,
            state: self.elevator.state(),
            current_floor: self.elevator.current_floor(),
            pending_calls: self.elevator.pending_calls().iter().copied().collect(),
        }
    }
}

/// Apply a monitor command. Motor overrides go straight to the actuators;
/// the state machine reconciles on its next `process()`.
pub fn apply_override<S: SensorGateway, A: ActuatorGateway>(
    elevator: &mut Elevator<S, A>,
    cmd: &OverrideCommand,
) {
    info!(?cmd, "monitor command");
    let speed = elevator.speed_percent();
    match cmd {
        OverrideCommand::MotorForward | OverrideCommand::MotorBackward
            if elevator.motion_inhibited() =>
        {
            warn!(?cmd, state = %elevator.state(), "manual motion refused");
        }
        OverrideCommand::MotorForward => {
            let _ = elevator.actuators_mut().move_up(speed);
        }
        OverrideCommand::MotorBackward => {
            let _ = elevator.actuators_mut().move_down(speed);
        }
        OverrideCommand::MotorStop => {
            let _ = elevator.actuators_mut().stop();
        }
        OverrideCommand::SetAutoMode { enabled } => elevator.set_auto_mode(*enabled),
        OverrideCommand::ToggleAutoMode => {
            elevator.toggle_auto_mode();
        }
        OverrideCommand::SetOverloadThreshold { kg } => {
            elevator.sensors_mut().set_overload_threshold(*kg);
        }
        OverrideCommand::Tare => elevator.sensors_mut().tare(),
        OverrideCommand::ResetFault => match elevator.reset_fault() {
            Ok(floor) => info!(floor, "fault cleared from monitor"),
            Err(e) => warn!(error = %e, "fault reset refused"),
        },
        OverrideCommand::RequestFloor { floor } => elevator.request_floor(*floor),
    }
}
