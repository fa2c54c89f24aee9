use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a reading came from. Simulated readings are produced locally when
/// the backend is unreachable or returned unusable data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Live,
    Simulated,
}

/// One timestamped set of weather measurements for a station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub precipitation_mm: f64,
    pub pressure_hpa: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
    pub solar_radiation_wm2: f64,
    pub timestamp: DateTime<Utc>,
    pub source: Source,
}

/// Current operational state of a pump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpReading {
    pub running: bool,
    pub flow_m3h: f64,
    pub inlet_pressure_bar: f64,
    pub outlet_pressure_bar: f64,
    pub motor_temperature_c: f64,
    pub power_kw: f64,
    pub running_hours: f64,
    pub timestamp: DateTime<Utc>,
    pub source: Source,
}
