//! Bounded in-memory history windows backing the charts and statistics.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::reading::WeatherReading;

/// Fixed-capacity FIFO of samples. Once full, pushing evicts the oldest.
#[derive(Debug, Clone)]
pub struct BoundedSeries {
    capacity: usize,
    values: VecDeque<f64>,
}

impl BoundedSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            values: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum() / self.values.len() as f64
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }
}

/// Derived statistics rendered under the charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherStats {
    pub precipitation_sum_mm: f64,
    pub wind_max_kmh: f64,
    pub temperature_avg_c: f64,
    pub pressure_latest_hpa: f64,
}

/// Sliding windows of the charted weather metrics plus their timestamps.
/// All series share one capacity and advance together, so labels and data
/// arrays always line up.
#[derive(Debug, Clone)]
pub struct WeatherHistory {
    pub precipitation: BoundedSeries,
    pub wind: BoundedSeries,
    pub temperature: BoundedSeries,
    pub pressure: BoundedSeries,
    timestamps: VecDeque<DateTime<Utc>>,
    capacity: usize,
}

impl WeatherHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            precipitation: BoundedSeries::new(capacity),
            wind: BoundedSeries::new(capacity),
            temperature: BoundedSeries::new(capacity),
            pressure: BoundedSeries::new(capacity),
            timestamps: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, reading: &WeatherReading) {
        if self.timestamps.len() == self.capacity {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(reading.timestamp);
        self.precipitation.push(reading.precipitation_mm);
        self.wind.push(reading.wind_speed_kmh);
        self.temperature.push(reading.temperature_c);
        self.pressure.push(reading.pressure_hpa);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Chart label strings, oldest first.
    pub fn labels(&self) -> Vec<String> {
        self.timestamps
            .iter()
            .map(|ts| ts.format("%H:%M:%S").to_string())
            .collect()
    }

    pub fn stats(&self) -> WeatherStats {
        WeatherStats {
            precipitation_sum_mm: self.precipitation.sum(),
            wind_max_kmh: self.wind.max(),
            temperature_avg_c: self.temperature.average(),
            pressure_latest_hpa: self.pressure.latest().unwrap_or(0.0),
        }
    }
}
