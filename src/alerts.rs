//! Threshold alerts for the dashboard.
//!
//! All alert triggering goes through [`evaluate_readings`] plus the separate
//! staleness check; there is no second code path. Fetch failures are handled
//! by the simulator fallback and never raise alerts themselves.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reading::{PumpReading, WeatherReading};

pub const HIGH_TEMPERATURE_C: f64 = 28.0;
pub const INTENSE_RAIN_MM: f64 = 5.0;
pub const MODERATE_RAIN_MM: f64 = 2.0;
pub const STRONG_WIND_KMH: f64 = 20.0;
pub const HIGH_MOTOR_TEMPERATURE_C: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HighTemperature,
    IntenseRain,
    ModerateRain,
    StrongWind,
    HighMotorTemperature,
    StaleData,
    Monitoring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub severity: Severity,
    pub kind: AlertKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    fn new(severity: Severity, kind: AlertKind, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            kind,
            message,
            created_at: Utc::now(),
        }
    }
}

/// Transient capped list of recent alerts, newest first.
#[derive(Debug, Clone)]
pub struct AlertLog {
    capacity: usize,
    alerts: VecDeque<Alert>,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            alerts: VecDeque::new(),
        }
    }

    pub fn push(&mut self, alert: Alert) {
        self.alerts.push_front(alert);
        self.alerts.truncate(self.capacity);
    }

    pub fn extend(&mut self, alerts: impl IntoIterator<Item = Alert>) {
        for alert in alerts {
            self.push(alert);
        }
    }

    /// User-initiated reset.
    pub fn clear(&mut self) {
        self.alerts.clear();
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }
}

/// The consolidated threshold pass over the latest readings.
pub fn evaluate_readings(weather: &WeatherReading, pump: &PumpReading) -> Vec<Alert> {
    let mut triggered = Vec::new();

    if weather.temperature_c > HIGH_TEMPERATURE_C {
        triggered.push(Alert::new(
            Severity::High,
            AlertKind::HighTemperature,
            format!(
                "Ambient temperature elevated ({:.1} °C)",
                weather.temperature_c
            ),
        ));
    }

    if weather.precipitation_mm > INTENSE_RAIN_MM {
        triggered.push(Alert::new(
            Severity::Critical,
            AlertKind::IntenseRain,
            format!(
                "Intense precipitation ({:.1} mm/h), overflow risk",
                weather.precipitation_mm
            ),
        ));
    } else if weather.precipitation_mm > MODERATE_RAIN_MM {
        triggered.push(Alert::new(
            Severity::Medium,
            AlertKind::ModerateRain,
            format!(
                "Moderate rain in progress ({:.1} mm/h)",
                weather.precipitation_mm
            ),
        ));
    }

    if weather.wind_speed_kmh > STRONG_WIND_KMH {
        triggered.push(Alert::new(
            Severity::High,
            AlertKind::StrongWind,
            format!("Strong wind ({:.1} km/h)", weather.wind_speed_kmh),
        ));
    }

    if pump.running && pump.motor_temperature_c > HIGH_MOTOR_TEMPERATURE_C {
        triggered.push(Alert::new(
            Severity::High,
            AlertKind::HighMotorTemperature,
            format!(
                "Pump motor temperature high ({:.1} °C)",
                pump.motor_temperature_c
            ),
        ));
    }

    triggered
}

/// The only failure condition that surfaces to the user: no successful live
/// update within the staleness window.
pub fn staleness_alert(age: Duration, window: Duration) -> Option<Alert> {
    if age > window {
        Some(Alert::new(
            Severity::High,
            AlertKind::StaleData,
            format!(
                "No live station data for {} s, showing simulated values",
                age.as_secs()
            ),
        ))
    } else {
        None
    }
}
