//! Rendering seam between the refresher and whatever UI hosts it.

use tracing::info;

use crate::alerts::Alert;
use crate::history::{WeatherHistory, WeatherStats};
use crate::reading::{PumpReading, Source, WeatherReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected { simulated: bool },
}

/// Render target for one dashboard view. Every method must be idempotent
/// for the same inputs; the refresher re-renders everything each tick.
pub trait DashboardRenderer: Send {
    fn render_weather(&mut self, reading: &WeatherReading, stats: &WeatherStats);
    fn render_pump(&mut self, reading: &PumpReading);
    fn render_charts(&mut self, history: &WeatherHistory);
    fn render_alerts(&mut self, alerts: &[Alert]);
    fn render_connection(&mut self, status: ConnectionStatus);
}

pub fn format_temperature(value: f64) -> String {
    format!("{value:.1} °C")
}

pub fn format_humidity(value: f64) -> String {
    format!("Hum: {value:.0}%")
}

pub fn format_precipitation(value: f64) -> String {
    format!("{value:.1} mm")
}

pub fn format_wind(value: f64) -> String {
    format!("{value:.1} km/h")
}

pub fn format_pressure(value: f64) -> String {
    format!("{value:.1} hPa")
}

pub fn format_flow(value: f64) -> String {
    format!("{value:.2} m³/h")
}

/// Compass label for a wind direction in degrees.
pub fn wind_direction_label(degrees: f64) -> &'static str {
    const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = ((degrees / 45.0).round() as usize) % 8;
    DIRECTIONS[index]
}

/// Default renderer writing readouts to the log. Useful headless and as a
/// reference for real UI implementations.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl DashboardRenderer for LogRenderer {
    fn render_weather(&mut self, reading: &WeatherReading, stats: &WeatherStats) {
        info!(
            temperature = %format_temperature(reading.temperature_c),
            humidity = %format_humidity(reading.humidity_percent),
            precipitation = %format_precipitation(reading.precipitation_mm),
            wind = %format_wind(reading.wind_speed_kmh),
            wind_direction = wind_direction_label(reading.wind_direction_deg),
            pressure = %format_pressure(reading.pressure_hpa),
            simulated = reading.source == Source::Simulated,
            precipitation_sum = %format_precipitation(stats.precipitation_sum_mm),
            wind_max = %format_wind(stats.wind_max_kmh),
            temperature_avg = %format_temperature(stats.temperature_avg_c),
            "weather readout"
        );
    }

    fn render_pump(&mut self, reading: &PumpReading) {
        info!(
            running = reading.running,
            flow = %format_flow(reading.flow_m3h),
            inlet_bar = %format!("{:.2}", reading.inlet_pressure_bar),
            outlet_bar = %format!("{:.2}", reading.outlet_pressure_bar),
            motor_temperature = %format_temperature(reading.motor_temperature_c),
            power_kw = %format!("{:.2}", reading.power_kw),
            hours = %format!("{:.1}", reading.running_hours),
            simulated = reading.source == Source::Simulated,
            "pump readout"
        );
    }

    fn render_charts(&mut self, history: &WeatherHistory) {
        info!(samples = history.len(), "chart series updated");
    }

    fn render_alerts(&mut self, alerts: &[Alert]) {
        for alert in alerts {
            info!(severity = %alert.severity, kind = ?alert.kind, message = %alert.message, "active alert");
        }
    }

    fn render_connection(&mut self, status: ConnectionStatus) {
        info!(status = ?status, "connection status");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readout_formats_match_dashboard() {
        assert_eq!(format_temperature(30.2), "30.2 °C");
        assert_eq!(format_humidity(72.4), "Hum: 72%");
        assert_eq!(format_precipitation(1.26), "1.3 mm");
        assert_eq!(format_wind(12.62), "12.6 km/h");
        assert_eq!(format_pressure(1013.0), "1013.0 hPa");
        assert_eq!(format_flow(3.456), "3.46 m³/h");
    }

    #[test]
    fn wind_direction_wraps() {
        assert_eq!(wind_direction_label(0.0), "N");
        assert_eq!(wind_direction_label(90.0), "E");
        assert_eq!(wind_direction_label(180.0), "S");
        assert_eq!(wind_direction_label(359.0), "N");
    }
}
