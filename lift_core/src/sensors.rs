//! Sensor gateway: floor switches, call buttons, safety lines, indicators
//! and the load cell.
//!
//! Line read failures never escape: floor and button lines read as
//! inactive, the emergency line reads as asserted, and a load-cell timeout
//! keeps the last known good weight.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use lift_traits::{Clock, InputLine, LoadCell, MonotonicClock, OutputLine};
use tracing::{debug, trace, warn};

use crate::calibration::Calibration;
use crate::config::{ButtonCfg, LoadCfg};
use crate::hw_error::map_hw_error;

/// What the floor switches say about the car position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloorReading {
    /// No landing switch active (between floors).
    Between,
    At(usize),
    /// More than one switch active: the sensors contradict each other.
    Conflict(Vec<usize>),
}

/// Last processed load-cell sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightReading {
    pub kg: f32,
    /// Latest raw sample (counts).
    pub raw: i32,
    /// False while the amplifier is timing out (value is last known good).
    pub sensor_ready: bool,
}

/// Inputs and indicator outputs consumed by the state machine.
pub trait SensorGateway {
    fn floor_count(&self) -> usize;
    /// True when the car is physically at `floor`.
    fn read_floor(&mut self, floor: usize) -> bool;
    /// Scan every landing switch.
    fn detect_floor(&mut self) -> FloorReading {
        let active: Vec<usize> = (0..self.floor_count())
            .filter(|&f| self.read_floor(f))
            .collect();
        match active.as_slice() {
            [] => FloorReading::Between,
            [f] => FloorReading::At(*f),
            _ => FloorReading::Conflict(active),
        }
    }
    /// One `true` per debounced press of the call button for `floor`.
    fn read_button(&mut self, floor: usize) -> bool;
    fn read_emergency(&mut self) -> bool;
    fn read_obstruction(&mut self) -> bool;
    /// Sample the load cell and compare against the overload threshold.
    fn check_overload(&mut self) -> bool;
    fn set_indicator(&mut self, floor: usize, on: bool);
    fn set_overload_threshold(&mut self, kg: f32);
    fn overload_threshold(&self) -> f32;
    /// Re-zero the load cell at the current load.
    fn tare(&mut self);
    fn last_weight(&self) -> WeightReading;
}

type Line = Box<dyn InputLine + Send>;
type Lamp = Box<dyn OutputLine + Send>;

struct Button {
    line: Line,
    was_active: bool,
    last_accepted_ms: Option<u64>,
}

/// Sensor gateway over trait-object lines.
pub struct Sensors {
    floors: Vec<Line>,
    buttons: Vec<Button>,
    indicators: Vec<Lamp>,
    emergency: Option<Line>,
    obstruction: Option<Line>,
    load_cell: Option<Box<dyn LoadCell + Send>>,
    calibration: Calibration,
    load: LoadCfg,
    debounce_ms: u64,
    window: VecDeque<i32>,
    last: WeightReading,
    overloaded: bool,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
}

impl core::fmt::Debug for Sensors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sensors")
            .field("floors", &self.floors.len())
            .field("threshold_kg", &self.load.overload_threshold_kg)
            .field("last", &self.last)
            .finish()
    }
}

impl Sensors {
    /// Gateway with one landing switch per floor and nothing else wired.
    pub fn new(floors: Vec<Line>) -> Self {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
        let epoch = clock.now();
        Self {
            floors,
            buttons: Vec::new(),
            indicators: Vec::new(),
            emergency: None,
            obstruction: None,
            load_cell: None,
            calibration: Calibration::default(),
            load: LoadCfg::default(),
            debounce_ms: ButtonCfg::default().debounce_ms,
            window: VecDeque::new(),
            last: WeightReading::default(),
            overloaded: false,
            clock,
            epoch,
        }
    }

    pub fn with_buttons(mut self, lines: Vec<Line>) -> Self {
        self.buttons = lines
            .into_iter()
            .map(|line| Button {
                line,
                was_active: false,
                last_accepted_ms: None,
            })
            .collect();
        self
    }

    pub fn with_indicators(mut self, lamps: Vec<Lamp>) -> Self {
        self.indicators = lamps;
        self
    }

    pub fn with_emergency(mut self, line: Line) -> Self {
        self.emergency = Some(line);
        self
    }

    pub fn with_obstruction(mut self, line: Line) -> Self {
        self.obstruction = Some(line);
        self
    }

    pub fn with_load_cell(mut self, cell: Box<dyn LoadCell + Send>, calibration: Calibration) -> Self {
        self.load_cell = Some(cell);
        self.calibration = calibration;
        self
    }

    pub fn with_load_cfg(mut self, load: LoadCfg) -> Self {
        self.load = load;
        self
    }

    pub fn with_button_cfg(mut self, cfg: &ButtonCfg) -> Self {
        self.debounce_ms = cfg.debounce_ms;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.epoch = clock.now();
        self.clock = clock;
        self
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    fn sample(&mut self) -> Option<i32> {
        let timeout = self.load.read_timeout();
        let cell = self.load_cell.as_mut()?;
        match cell.read(timeout) {
            Ok(raw) => Some(raw),
            Err(e) => {
                let err = map_hw_error(&*e);
                warn!(error = %err, "load cell sample failed; keeping last good weight");
                None
            }
        }
    }

    fn window_average(&self) -> f32 {
        if self.window.is_empty() {
            return self.calibration.offset as f32;
        }
        let sum: i64 = self.window.iter().map(|&r| i64::from(r)).sum();
        sum as f32 / self.window.len() as f32
    }
}

/// Read a line, mapping failures to `fallback`.
fn read_line(line: &mut Line, what: &str, fallback: bool) -> bool {
    match line.is_active() {
        Ok(v) => v,
        Err(e) => {
            let err = map_hw_error(&*e);
            warn!(error = %err, line = what, fallback, "input line read failed");
            fallback
        }
    }
}

impl SensorGateway for Sensors {
    fn floor_count(&self) -> usize {
        self.floors.len()
    }

    fn read_floor(&mut self, floor: usize) -> bool {
        self.floors
            .get_mut(floor)
            .is_some_and(|line| read_line(line, "floor", false))
    }

    fn read_button(&mut self, floor: usize) -> bool {
        let now = self.now_ms();
        let debounce_ms = self.debounce_ms;
        let Some(button) = self.buttons.get_mut(floor) else {
            return false;
        };
        let active = read_line(&mut button.line, "button", false);
        let rising = active && !button.was_active;
        button.was_active = active;
        if !rising {
            return false;
        }
        if let Some(prev) = button.last_accepted_ms
            && now.saturating_sub(prev) < debounce_ms
        {
            trace!(floor, "button bounce ignored");
            return false;
        }
        button.last_accepted_ms = Some(now);
        debug!(floor, "call button pressed");
        true
    }

    fn read_emergency(&mut self) -> bool {
        self.emergency
            .as_mut()
            .is_some_and(|line| read_line(line, "emergency", true))
    }

    fn read_obstruction(&mut self) -> bool {
        self.obstruction
            .as_mut()
            .is_some_and(|line| read_line(line, "obstruction", false))
    }

    fn check_overload(&mut self) -> bool {
        if self.load_cell.is_some() {
            match self.sample() {
                Some(raw) => {
                    self.window.push_back(raw);
                    while self.window.len() > self.load.window.max(1) {
                        self.window.pop_front();
                    }
                    let kg = self.calibration.to_kg(self.window_average());
                    self.last = WeightReading {
                        kg,
                        raw,
                        sensor_ready: true,
                    };
                    trace!(raw, kg, "load sample");
                }
                None => self.last.sensor_ready = false,
            }
        }
        let over = self.last.kg > self.load.overload_threshold_kg;
        if over && !self.overloaded {
            warn!(
                weight_kg = self.last.kg,
                threshold_kg = self.load.overload_threshold_kg,
                "overload detected"
            );
        } else if !over && self.overloaded {
            tracing::info!(weight_kg = self.last.kg, "overload cleared");
        }
        self.overloaded = over;
        over
    }

    fn set_indicator(&mut self, floor: usize, on: bool) {
        if let Some(lamp) = self.indicators.get_mut(floor)
            && let Err(e) = lamp.set_active(on)
        {
            let err = map_hw_error(&*e);
            warn!(error = %err, floor, on, "indicator write failed");
        }
    }

    fn set_overload_threshold(&mut self, kg: f32) {
        if !(kg.is_finite() && kg > 0.0) {
            warn!(kg, "ignoring invalid overload threshold");
            return;
        }
        tracing::info!(
            from = self.load.overload_threshold_kg,
            to = kg,
            "overload threshold changed"
        );
        self.load.overload_threshold_kg = kg;
    }

    fn overload_threshold(&self) -> f32 {
        self.load.overload_threshold_kg
    }

    fn tare(&mut self) {
        if self.load_cell.is_none() {
            debug!("tare requested without a load cell");
            return;
        }
        let samples: Vec<i32> = (0..self.load.tare_samples.max(1))
            .filter_map(|_| self.sample())
            .collect();
        match Calibration::offset_from_samples(&samples) {
            Some(offset) => {
                tracing::info!(offset, samples = samples.len(), "load cell tared");
                self.calibration.offset = offset;
                self.window.clear();
                self.last = WeightReading {
                    kg: 0.0,
                    raw: offset,
                    sensor_ready: true,
                };
            }
            None => warn!("tare failed: no load cell samples"),
        }
    }

    fn last_weight(&self) -> WeightReading {
        self.last
    }
}
