#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use lift_core::{
    Actuators, Calibration, Controller, Door, DoorCfg, LoadCfg, LoopCfg, MonitorCfg, Sensors,
    ShaftCfg, StandardElevator,
};
use lift_hardware::{SimulatedDoor, SimulatedLine, SimulatedLoadCell, SimulatedShaft};
use lift_traits::{Clock, InputLine, ManualClock, Motor, OutputLine};

pub const TRAVEL_MS_PER_FLOOR: u64 = 1000;
pub const TICK: Duration = Duration::from_millis(100);

/// Simulated installation: shaft, lines, load cell and door, all on one
/// manual clock.
pub struct Rig {
    pub floors: usize,
    pub clock: ManualClock,
    pub shaft: SimulatedShaft,
    /// Replaces the shaft switches when set (see `with_manual_floors`).
    pub floor_lines: Option<Vec<SimulatedLine>>,
    pub buttons: Vec<SimulatedLine>,
    pub indicators: Vec<SimulatedLine>,
    pub emergency: SimulatedLine,
    pub obstruction: SimulatedLine,
    pub load: SimulatedLoadCell,
    pub door: SimulatedDoor,
    pub door_cfg: DoorCfg,
    pub auto_mode: bool,
}

impl Rig {
    pub fn new(floors: usize, start_position: f32) -> Self {
        let clock = ManualClock::new();
        let shaft = SimulatedShaft::new(floors, 0, TRAVEL_MS_PER_FLOOR, Arc::new(clock.clone()));
        shaft.set_position(start_position);
        Self {
            floors,
            clock,
            shaft,
            floor_lines: None,
            buttons: (0..floors).map(|_| SimulatedLine::new()).collect(),
            indicators: (0..floors).map(|_| SimulatedLine::new()).collect(),
            emergency: SimulatedLine::new(),
            obstruction: SimulatedLine::new(),
            load: SimulatedLoadCell::new(0),
            door: SimulatedDoor::new(),
            door_cfg: DoorCfg::default(),
            auto_mode: true,
        }
    }

    /// Floor switches become plain lines driven by the test.
    pub fn with_manual_floors(mut self) -> Self {
        self.floor_lines = Some((0..self.floors).map(|_| SimulatedLine::new()).collect());
        self
    }

    pub fn clock_arc(&self) -> Arc<dyn Clock + Send + Sync> {
        Arc::new(self.clock.clone())
    }

    pub fn sensors(&self) -> Sensors {
        let floors: Vec<Box<dyn InputLine + Send>> = match &self.floor_lines {
            Some(lines) => lines
                .iter()
                .map(|l| Box::new(l.clone()) as Box<dyn InputLine + Send>)
                .collect(),
            None => self
                .shaft
                .floor_switches()
                .into_iter()
                .map(|s| Box::new(s) as Box<dyn InputLine + Send>)
                .collect(),
        };
        let buttons = self
            .buttons
            .iter()
            .map(|l| Box::new(l.clone()) as Box<dyn InputLine + Send>)
            .collect();
        let indicators = self
            .indicators
            .iter()
            .map(|l| Box::new(l.clone()) as Box<dyn OutputLine + Send>)
            .collect();
        Sensors::new(floors)
            .with_buttons(buttons)
            .with_indicators(indicators)
            .with_emergency(Box::new(self.emergency.clone()))
            .with_obstruction(Box::new(self.obstruction.clone()))
            .with_load_cell(Box::new(self.load.clone()), Calibration::new(1.0, 0))
            .with_load_cfg(LoadCfg {
                window: 1,
                ..LoadCfg::default()
            })
            .with_clock(self.clock_arc())
    }

    pub fn actuators(&self) -> Actuators {
        self.actuators_with_motor(Box::new(self.shaft.motor()))
    }

    pub fn actuators_with_motor(&self, motor: Box<dyn Motor + Send>) -> Actuators {
        let door = Door::new(
            Box::new(self.door.clone()),
            self.door_cfg.clone(),
            self.clock_arc(),
        );
        Actuators::new(motor, door)
    }

    pub fn elevator(&self) -> StandardElevator {
        self.elevator_with_motor(Box::new(self.shaft.motor()))
    }

    /// Elevator driving the shaft through `motor` instead of the plain
    /// simulated hoist.
    pub fn elevator_with_motor(&self, motor: Box<dyn Motor + Send>) -> StandardElevator {
        StandardElevator::builder()
            .with_sensors(self.sensors())
            .with_actuators(self.actuators_with_motor(motor))
            .with_shaft(ShaftCfg {
                floors: self.floors,
                ..ShaftCfg::default()
            })
            .with_door(self.door_cfg.clone())
            .with_clock(self.clock_arc())
            .with_auto_mode(self.auto_mode)
            .build()
            .expect("elevator build")
    }

    pub fn controller(&self) -> Controller<Sensors, lift_core::Actuators> {
        Controller::new(
            self.elevator(),
            &LoopCfg::default(),
            &MonitorCfg::default(),
            self.clock_arc(),
        )
    }

    /// Advance time by one tick period and process once.
    pub fn step(&self, elevator: &mut StandardElevator) {
        self.clock.advance(TICK);
        elevator.process();
    }

    /// Step until `done` holds; panics after `max` ticks.
    pub fn step_until(
        &self,
        elevator: &mut StandardElevator,
        max: usize,
        mut done: impl FnMut(&StandardElevator) -> bool,
    ) {
        for _ in 0..max {
            if done(elevator) {
                return;
            }
            self.step(elevator);
        }
        assert!(done(elevator), "condition not reached in {max} ticks: {elevator:?}");
    }
}
