//! Fallback generators producing plausible synthetic readings.
//!
//! Each simulator keeps one persistent value per metric and nudges it by a
//! bounded random delta on every step, clamped to a configured range. The
//! result is a continuous series rather than pure noise, so switching from
//! live to simulated data mid-session does not visually jump.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::reading::{PumpReading, Source, WeatherReading};

const TEMP_RANGE: (f64, f64) = (18.0, 36.0);
const TEMP_DELTA: f64 = 0.4;
const HUMIDITY_RANGE: (f64, f64) = (40.0, 95.0);
const HUMIDITY_DELTA: f64 = 1.5;
const WIND_MS_RANGE: (f64, f64) = (0.0, 12.0);
const WIND_MS_DELTA: f64 = 0.6;
const WIND_DIR_RANGE: (f64, f64) = (0.0, 360.0);
const WIND_DIR_DELTA: f64 = 8.0;
const PRESSURE_RANGE: (f64, f64) = (1004.0, 1022.0);
const PRESSURE_DELTA: f64 = 0.6;
const SOLAR_RANGE: (f64, f64) = (0.0, 1100.0);
const SOLAR_DELTA: f64 = 40.0;
// Precipitation runs in two regimes: a rare burst with a wider band, else a
// narrow drizzle band.
const RAIN_BURST_CHANCE: f64 = 0.12;
const RAIN_BURST_RANGE: (f64, f64) = (0.0, 8.0);
const RAIN_BURST_DELTA: f64 = 1.2;
const RAIN_CALM_RANGE: (f64, f64) = (0.0, 2.0);
const RAIN_CALM_DELTA: f64 = 0.4;

fn drift(rng: &mut StdRng, value: f64, (min, max): (f64, f64), delta: f64) -> f64 {
    let next = value + rng.random_range(-delta..=delta);
    next.clamp(min, max)
}

/// Random-walk generator for weather metrics.
#[derive(Debug)]
pub struct WeatherSimulator {
    temperature_c: f64,
    humidity_percent: f64,
    precipitation_mm: f64,
    pressure_hpa: f64,
    wind_speed_ms: f64,
    wind_direction_deg: f64,
    solar_radiation_wm2: f64,
    rng: StdRng,
}

impl WeatherSimulator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Seeded constructor so fallback sequences are reproducible in tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            temperature_c: 24.0,
            humidity_percent: 60.0,
            precipitation_mm: 0.0,
            pressure_hpa: 1013.0,
            wind_speed_ms: 3.5,
            wind_direction_deg: 180.0,
            solar_radiation_wm2: 700.0,
            rng,
        }
    }

    /// Advances the walk one tick and returns the new reading.
    pub fn step(&mut self) -> WeatherReading {
        self.temperature_c = drift(&mut self.rng, self.temperature_c, TEMP_RANGE, TEMP_DELTA);
        self.humidity_percent = drift(
            &mut self.rng,
            self.humidity_percent,
            HUMIDITY_RANGE,
            HUMIDITY_DELTA,
        );
        self.wind_speed_ms = drift(&mut self.rng, self.wind_speed_ms, WIND_MS_RANGE, WIND_MS_DELTA);
        self.wind_direction_deg = drift(
            &mut self.rng,
            self.wind_direction_deg,
            WIND_DIR_RANGE,
            WIND_DIR_DELTA,
        );
        self.pressure_hpa = drift(&mut self.rng, self.pressure_hpa, PRESSURE_RANGE, PRESSURE_DELTA);
        self.solar_radiation_wm2 = drift(
            &mut self.rng,
            self.solar_radiation_wm2,
            SOLAR_RANGE,
            SOLAR_DELTA,
        );

        self.precipitation_mm = if self.rng.random::<f64>() < RAIN_BURST_CHANCE {
            drift(
                &mut self.rng,
                self.precipitation_mm,
                RAIN_BURST_RANGE,
                RAIN_BURST_DELTA,
            )
        } else {
            drift(
                &mut self.rng,
                self.precipitation_mm,
                RAIN_CALM_RANGE,
                RAIN_CALM_DELTA,
            )
        };

        WeatherReading {
            temperature_c: self.temperature_c,
            humidity_percent: self.humidity_percent,
            precipitation_mm: self.precipitation_mm,
            pressure_hpa: self.pressure_hpa,
            wind_speed_kmh: self.wind_speed_ms * 3.6,
            wind_direction_deg: self.wind_direction_deg,
            solar_radiation_wm2: self.solar_radiation_wm2,
            timestamp: Utc::now(),
            source: Source::Simulated,
        }
    }
}

impl Default for WeatherSimulator {
    fn default() -> Self {
        Self::new()
    }
}

const FLOW_RANGE: (f64, f64) = (2.0, 4.5);
const FLOW_DELTA: f64 = 0.3;
const INLET_RANGE: (f64, f64) = (0.5, 1.3);
const INLET_DELTA: f64 = 0.1;
const OUTLET_RANGE: (f64, f64) = (1.5, 3.0);
const OUTLET_DELTA: f64 = 0.2;
const MOTOR_TEMP_RANGE: (f64, f64) = (60.0, 85.0);
const MOTOR_TEMP_DELTA: f64 = 1.5;
const POWER_RANGE: (f64, f64) = (15.0, 25.0);
const POWER_DELTA: f64 = 1.0;
const IDLE_MOTOR_TEMP_C: f64 = 25.0;
const STATE_FLIP_CHANCE: f64 = 0.05;
// Hour meter advance per tick, matches the nominal refresh period.
const HOURS_PER_TICK: f64 = 10.0 / 3600.0;

/// Random-walk generator for pump status.
#[derive(Debug)]
pub struct PumpSimulator {
    running: bool,
    flow_m3h: f64,
    inlet_pressure_bar: f64,
    outlet_pressure_bar: f64,
    motor_temperature_c: f64,
    power_kw: f64,
    running_hours: f64,
    rng: StdRng,
}

impl PumpSimulator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            running: true,
            flow_m3h: 3.2,
            inlet_pressure_bar: 0.9,
            outlet_pressure_bar: 2.2,
            motor_temperature_c: 72.0,
            power_kw: 20.0,
            running_hours: 1200.0,
            rng,
        }
    }

    pub fn step(&mut self) -> PumpReading {
        if self.rng.random::<f64>() < STATE_FLIP_CHANCE {
            self.running = !self.running;
        }

        if self.running {
            self.flow_m3h = drift(&mut self.rng, self.flow_m3h, FLOW_RANGE, FLOW_DELTA);
            self.inlet_pressure_bar =
                drift(&mut self.rng, self.inlet_pressure_bar, INLET_RANGE, INLET_DELTA);
            self.outlet_pressure_bar = drift(
                &mut self.rng,
                self.outlet_pressure_bar,
                OUTLET_RANGE,
                OUTLET_DELTA,
            );
            self.motor_temperature_c = drift(
                &mut self.rng,
                self.motor_temperature_c,
                MOTOR_TEMP_RANGE,
                MOTOR_TEMP_DELTA,
            );
            self.power_kw = drift(&mut self.rng, self.power_kw, POWER_RANGE, POWER_DELTA);
            self.running_hours += HOURS_PER_TICK;
        } else {
            self.flow_m3h = 0.0;
            self.inlet_pressure_bar = 0.0;
            self.outlet_pressure_bar = 0.0;
            self.power_kw = 0.0;
            // Motor cools toward ambient while stopped.
            self.motor_temperature_c =
                (self.motor_temperature_c - 2.0).max(IDLE_MOTOR_TEMP_C);
        }

        PumpReading {
            running: self.running,
            flow_m3h: self.flow_m3h,
            inlet_pressure_bar: self.inlet_pressure_bar,
            outlet_pressure_bar: self.outlet_pressure_bar,
            motor_temperature_c: self.motor_temperature_c,
            power_kw: self.power_kw,
            running_hours: self.running_hours,
            timestamp: Utc::now(),
            source: Source::Simulated,
        }
    }
}

impl Default for PumpSimulator {
    fn default() -> Self {
        Self::new()
    }
}
