//! HTTP access to the station backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected HTTP status: {0}")]
    Status(StatusCode),
    #[error("malformed JSON body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Source of the raw JSON resources the refresher polls. Implemented over
/// HTTP in production and mocked in tests.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_weather(&self, station_id: u32) -> Result<Value, FetchError>;
    async fn fetch_pump_status(&self, pump_id: u32) -> Result<Value, FetchError>;
}

pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDataSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: String) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response.json::<Value>().await.map_err(FetchError::Decode)
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_weather(&self, station_id: u32) -> Result<Value, FetchError> {
        let url = format!(
            "{}/api/meteorology/latest?station_id={station_id}",
            self.base_url
        );
        self.get_json(url).await
    }

    async fn fetch_pump_status(&self, pump_id: u32) -> Result<Value, FetchError> {
        let url = format!("{}/api/pump/status?pump_id={pump_id}", self.base_url);
        self.get_json(url).await
    }
}
