use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Deserialize, Debug, Clone)]
pub struct MonitorConfig {
    pub api_base_url: String,
    #[serde(default = "default_station_id")]
    pub station_id: u32,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_alert_capacity")]
    pub alert_capacity: usize,
    #[serde(default = "default_staleness")]
    pub staleness_seconds: u64,
    /// Fixed seed for the fallback simulators; omit for entropy seeding.
    #[serde(default)]
    pub simulator_seed: Option<u64>,
}

fn default_station_id() -> u32 {
    1
}

fn default_refresh_interval() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    10
}

fn default_history_capacity() -> usize {
    20
}

fn default_alert_capacity() -> usize {
    10
}

fn default_staleness() -> u64 {
    300
}

pub fn load_config(config_path_str: &str) -> Result<MonitorConfig, ConfigError> {
    let config_path = Path::new(config_path_str);
    let config_str =
        std::fs::read_to_string(config_path).map_err(|e| ConfigError::Read {
            path: config_path_str.to_string(),
            source: e,
        })?;

    let config: MonitorConfig = toml::from_str(&config_str).map_err(|e| ConfigError::Parse {
        path: config_path_str.to_string(),
        source: e,
    })?;

    info!(
        api_base_url = %config.api_base_url,
        station_id = config.station_id,
        refresh_interval_seconds = config.refresh_interval_seconds,
        "Loaded monitor config."
    );
    Ok(config)
}
