//! Device assembly: simulated shaft or Raspberry Pi hardware, mapped from config.

use std::sync::Arc;

use eyre::{Result, WrapErr};
use lift_core::hw_error::map_hw_error;
use lift_core::{
    Actuators, ButtonCfg, Calibration, Controller, Door, DoorCfg, LoadCfg, LoopCfg, MonitorCfg,
    Sensors, ShaftCfg, StandardElevator,
};
use lift_hardware::{SimulatedDoor, SimulatedLine, SimulatedLoadCell, SimulatedShaft};
use lift_traits::{Clock, DoorActuator, InputLine, LoadCell, MonotonicClock, Motor, OutputLine};

type Line = Box<dyn InputLine + Send>;
type Lamp = Box<dyn OutputLine + Send>;

/// Position used when `[sim].start_floor` is unset: between the two lowest landings.
const UNKNOWN_START_POSITION: f32 = 0.5;

/// Every device the controller needs, before it is wired into gateways.
pub struct Devices {
    pub floors: Vec<Line>,
    pub buttons: Vec<Line>,
    pub indicators: Vec<Lamp>,
    pub emergency: Option<Line>,
    pub obstruction: Option<Line>,
    pub load_cell: Option<Box<dyn LoadCell + Send>>,
    pub motor: Box<dyn Motor + Send>,
    pub door: Box<dyn DoorActuator + Send>,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

/// Result of reading every input once.
#[derive(Debug, Clone)]
pub struct SelfCheckReport {
    pub backend: &'static str,
    pub floors_active: Vec<usize>,
    pub emergency: bool,
    pub obstruction: bool,
    pub load_raw: Option<i32>,
}

fn read_input(line: &mut Line, what: &str) -> Result<bool> {
    line.is_active()
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
        .wrap_err_with(|| format!("read {what}"))
}

impl Devices {
    /// Pick the backend from the config: hardware when floor sensor pins are
    /// configured and the `hardware` feature is built, simulation otherwise.
    pub fn from_config(cfg: &lift_config::Config) -> Result<(Self, &'static str)> {
        #[cfg(feature = "hardware")]
        {
            if !cfg.pins.floor_sensors.is_empty() {
                return Ok((hardware(cfg)?, "hardware"));
            }
        }
        Ok((simulated(cfg), "sim"))
    }

    /// Read every input and one load sample. Any failure is returned.
    pub fn self_check(&mut self, backend: &'static str, timeout_ms: u64) -> Result<SelfCheckReport> {
        let mut floors_active = Vec::new();
        for (floor, line) in self.floors.iter_mut().enumerate() {
            if read_input(line, "floor sensor")? {
                floors_active.push(floor);
            }
        }
        for button in &mut self.buttons {
            read_input(button, "call button")?;
        }
        let emergency = match self.emergency.as_mut() {
            Some(line) => read_input(line, "emergency line")?,
            None => false,
        };
        let obstruction = match self.obstruction.as_mut() {
            Some(line) => read_input(line, "obstruction line")?,
            None => false,
        };
        let load_raw = match self.load_cell.as_mut() {
            Some(cell) => Some(
                cell.read(std::time::Duration::from_millis(timeout_ms))
                    .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                    .wrap_err("read load cell")?,
            ),
            None => None,
        };
        Ok(SelfCheckReport {
            backend,
            floors_active,
            emergency,
            obstruction,
            load_raw,
        })
    }

    /// Wire the devices into gateways and build the control loop.
    pub fn into_controller(
        self,
        cfg: &lift_config::Config,
    ) -> Result<Controller<Sensors, Actuators>> {
        let monitor: MonitorCfg = (&cfg.monitor).into();
        let mut sensors = Sensors::new(self.floors)
            .with_buttons(self.buttons)
            .with_indicators(self.indicators)
            .with_load_cfg(LoadCfg::from(&cfg.load_cell))
            .with_button_cfg(&ButtonCfg::from(&cfg.buttons))
            .with_clock(self.clock.clone());
        if let Some(line) = self.emergency {
            sensors = sensors.with_emergency(line);
        }
        if let Some(line) = self.obstruction {
            sensors = sensors.with_obstruction(line);
        }
        if let Some(cell) = self.load_cell {
            sensors = sensors.with_load_cell(cell, Calibration::from(&cfg.load_cell));
        }

        let door_cfg = DoorCfg::from(&cfg.door);
        let door = Door::new(self.door, door_cfg.clone(), self.clock.clone());
        let elevator = StandardElevator::builder()
            .with_sensors(sensors)
            .with_actuators(Actuators::new(self.motor, door))
            .with_shaft(ShaftCfg::from(cfg))
            .with_door(door_cfg)
            .with_clock(self.clock.clone())
            .with_auto_mode(monitor.auto_mode)
            .build()?;
        Ok(Controller::new(
            elevator,
            &LoopCfg::from(&cfg.elevator),
            &monitor,
            self.clock,
        ))
    }
}

// ── Simulation ───────────────────────────────────────────────────────────────

/// Test hooks: LIFT_TEST_SIM_LOAD (raw load sample), LIFT_TEST_SIM_ESTOP=1
/// (emergency asserted), LIFT_TEST_SIM_LOAD_FAIL=1 (load cell times out).
fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

pub fn simulated(cfg: &lift_config::Config) -> Devices {
    let floors = cfg.elevator.floors;
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
    let shaft = SimulatedShaft::new(floors, 0, cfg.sim.travel_ms_per_floor, clock.clone());
    match cfg.sim.start_floor {
        #[allow(clippy::cast_precision_loss)]
        Some(floor) => shaft.set_position(floor as f32),
        None => shaft.set_position(UNKNOWN_START_POSITION),
    }

    let raw = std::env::var("LIFT_TEST_SIM_LOAD")
        .ok()
        .and_then(|v| v.parse::<i32>().ok())
        .unwrap_or(cfg.load_cell.offset);
    let load = SimulatedLoadCell::new(raw);
    load.set_failing(env_flag("LIFT_TEST_SIM_LOAD_FAIL"));
    let emergency = SimulatedLine::new();
    emergency.set(env_flag("LIFT_TEST_SIM_ESTOP"));

    tracing::info!(
        floors,
        start = ?cfg.sim.start_floor,
        travel_ms_per_floor = cfg.sim.travel_ms_per_floor,
        "simulated shaft"
    );
    Devices {
        floors: shaft
            .floor_switches()
            .into_iter()
            .map(|s| Box::new(s) as Line)
            .collect(),
        buttons: (0..floors)
            .map(|_| Box::new(SimulatedLine::new()) as Line)
            .collect(),
        indicators: (0..floors)
            .map(|_| Box::new(SimulatedLine::new()) as Lamp)
            .collect(),
        emergency: Some(Box::new(emergency)),
        obstruction: Some(Box::new(SimulatedLine::new())),
        load_cell: Some(Box::new(load)),
        motor: Box::new(shaft.motor()),
        door: Box::new(SimulatedDoor::new()),
        clock,
    }
}

// ── Hardware ─────────────────────────────────────────────────────────────────

#[cfg(feature = "hardware")]
pub fn hardware(cfg: &lift_config::Config) -> Result<Devices> {
    use lift_config::MotorDriver;
    use lift_hardware::Gpio;
    use lift_hardware::door::ServoDoor;
    use lift_hardware::gpio::{GpioInput, GpioOutput};
    use lift_hardware::hbridge::HBridgeMotor;
    use lift_hardware::hx711::HardwareLoadCell;
    use lift_hardware::serial_motor::SerialMotor;

    let pins = &cfg.pins;
    let active_low = cfg.lines.active_low;
    let gpio = Gpio::new().wrap_err("open GPIO")?;

    let input = |pin: u8, what: &str| -> Result<Line> {
        let line = GpioInput::open(&gpio, pin, active_low)
            .wrap_err_with(|| format!("open {what} pin {pin}"))?;
        Ok(Box::new(line))
    };
    let floors = pins
        .floor_sensors
        .iter()
        .map(|&p| input(p, "floor sensor"))
        .collect::<Result<Vec<_>>>()?;
    let buttons = pins
        .call_buttons
        .iter()
        .map(|&p| input(p, "call button"))
        .collect::<Result<Vec<_>>>()?;
    let indicators = pins
        .indicators
        .iter()
        .map(|&p| -> Result<Lamp> {
            let lamp = GpioOutput::open(&gpio, p)
                .wrap_err_with(|| format!("open indicator pin {p}"))?;
            Ok(Box::new(lamp))
        })
        .collect::<Result<Vec<_>>>()?;
    let emergency = pins
        .emergency
        .map(|p| input(p, "emergency"))
        .transpose()?;
    let obstruction = pins
        .obstruction
        .map(|p| input(p, "obstruction"))
        .transpose()?;

    let load_cell: Option<Box<dyn LoadCell + Send>> = match (pins.hx711_dt, pins.hx711_sck) {
        (Some(dt), Some(sck)) => Some(Box::new(
            HardwareLoadCell::open(&gpio, dt, sck, cfg.load_cell.gain_pulses)
                .wrap_err("open hx711")?,
        )),
        _ => None,
    };

    let motor: Box<dyn Motor + Send> = match cfg.motor.driver {
        MotorDriver::Hbridge => {
            let (Some(in1), Some(in2), Some(pwm)) = (pins.motor_in1, pins.motor_in2, pins.motor_pwm)
            else {
                eyre::bail!("invalid configuration: pins.motor_in1/motor_in2/motor_pwm missing");
            };
            Box::new(
                HBridgeMotor::open(&gpio, in1, in2, pwm, cfg.motor.pwm_hz)
                    .wrap_err("open motor pins")?,
            )
        }
        MotorDriver::Serial => {
            let serial = &cfg.motor.serial;
            Box::new(
                SerialMotor::open(
                    &gpio,
                    &serial.port,
                    serial.baud,
                    serial.address,
                    serial.pwm_frequency_hz,
                    pins.motor_dir,
                )
                .wrap_err("open serial motor driver")?,
            )
        }
    };

    let Some(servo) = pins.door_servo else {
        eyre::bail!("invalid configuration: pins.door_servo missing");
    };
    let door = ServoDoor::open(&gpio, servo).wrap_err("open door servo")?;

    tracing::info!(
        floors = floors.len(),
        driver = ?cfg.motor.driver,
        load_cell = load_cell.is_some(),
        "hardware assembled"
    );
    Ok(Devices {
        floors,
        buttons,
        indicators,
        emergency,
        obstruction,
        load_cell,
        motor,
        door: Box::new(door),
        clock: Arc::new(MonotonicClock::new()),
    })
}
