//! The polling refresh loop driving one dashboard view.
//!
//! One [`Refresher`] instance owns all mutable dashboard state (histories,
//! simulators, alert log). Lifecycle: construct, then either drive ticks
//! manually with [`Refresher::refresh_once`] or hand ownership to a timer
//! task via [`Refresher::start`] and tear it down with
//! [`RefreshHandle::stop`]. Nothing here is process-wide.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::alerts::{AlertLog, evaluate_readings, staleness_alert};
use crate::api_client::{DataSource, FetchError};
use crate::config::MonitorConfig;
use crate::history::WeatherHistory;
use crate::normalize::{normalize_pump, normalize_weather};
use crate::reading::{PumpReading, Source, WeatherReading};
use crate::render::{ConnectionStatus, DashboardRenderer};
use crate::simulator::{PumpSimulator, WeatherSimulator};

/// Shared teardown flag. Once disposed, results of in-flight fetches are
/// discarded: no history mutation, no render.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn dispose(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct RefresherSettings {
    pub station_id: u32,
    pub history_capacity: usize,
    pub alert_capacity: usize,
    pub staleness_window: Duration,
    pub simulator_seed: Option<u64>,
}

impl From<&MonitorConfig> for RefresherSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            station_id: config.station_id,
            history_capacity: config.history_capacity,
            alert_capacity: config.alert_capacity,
            staleness_window: Duration::from_secs(config.staleness_seconds),
            simulator_seed: config.simulator_seed,
        }
    }
}

pub struct Refresher<S, R> {
    station_id: u32,
    source: S,
    renderer: R,
    weather_sim: WeatherSimulator,
    pump_sim: PumpSimulator,
    history: WeatherHistory,
    alert_log: AlertLog,
    staleness_window: Duration,
    started_at: Instant,
    last_live_update: Option<Instant>,
    latest_weather: Option<WeatherReading>,
    latest_pump: Option<PumpReading>,
    liveness: Liveness,
}

impl<S, R> Refresher<S, R>
where
    S: DataSource + Send + 'static,
    R: DashboardRenderer + Send + 'static,
{
    pub fn new(settings: RefresherSettings, source: S, renderer: R) -> Self {
        let (weather_sim, pump_sim) = match settings.simulator_seed {
            Some(seed) => (
                WeatherSimulator::with_seed(seed),
                // Offset so the two walks do not mirror each other.
                PumpSimulator::with_seed(seed.wrapping_add(1)),
            ),
            None => (WeatherSimulator::new(), PumpSimulator::new()),
        };

        Self {
            station_id: settings.station_id,
            source,
            renderer,
            weather_sim,
            pump_sim,
            history: WeatherHistory::new(settings.history_capacity),
            alert_log: AlertLog::new(settings.alert_capacity),
            staleness_window: settings.staleness_window,
            started_at: Instant::now(),
            last_live_update: None,
            latest_weather: None,
            latest_pump: None,
            liveness: Liveness::new(),
        }
    }

    /// Handle for marking this view torn down from outside the tick task.
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn history(&self) -> &WeatherHistory {
        &self.history
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alert_log
    }

    pub fn latest_weather(&self) -> Option<&WeatherReading> {
        self.latest_weather.as_ref()
    }

    pub fn latest_pump(&self) -> Option<&PumpReading> {
        self.latest_pump.as_ref()
    }

    /// User action from the dashboard.
    pub fn clear_alerts(&mut self) {
        self.alert_log.clear();
    }

    /// One full fetch-render cycle. Failures of either resource are absorbed
    /// by the fallback simulators; this never returns an error and never
    /// stops the loop. Returns without touching any state when the view has
    /// been disposed.
    pub async fn refresh_once(&mut self) {
        if self.liveness.is_disposed() {
            return;
        }

        self.renderer.render_connection(ConnectionStatus::Connecting);

        let (weather_result, pump_result) = futures::join!(
            self.source.fetch_weather(self.station_id),
            self.source.fetch_pump_status(self.station_id),
        );

        // Results of fetches that were in flight during teardown are
        // discarded.
        if self.liveness.is_disposed() {
            return;
        }

        let weather = self.resolve_weather(weather_result);
        let pump = self.resolve_pump(pump_result);

        if weather.source == Source::Live || pump.source == Source::Live {
            self.last_live_update = Some(Instant::now());
        }

        self.history.push(&weather);
        let stats = self.history.stats();

        self.renderer.render_weather(&weather, &stats);
        self.renderer.render_pump(&pump);
        self.renderer.render_charts(&self.history);

        self.alert_log.extend(evaluate_readings(&weather, &pump));
        let age = self
            .last_live_update
            .map_or_else(|| self.started_at.elapsed(), |t| t.elapsed());
        if let Some(alert) = staleness_alert(age, self.staleness_window) {
            self.alert_log.push(alert);
        }
        let snapshot = self.alert_log.snapshot();
        self.renderer.render_alerts(&snapshot);

        let simulated =
            weather.source == Source::Simulated || pump.source == Source::Simulated;
        self.renderer
            .render_connection(ConnectionStatus::Connected { simulated });

        self.latest_weather = Some(weather);
        self.latest_pump = Some(pump);
    }

    fn resolve_weather(&mut self, result: Result<Value, FetchError>) -> WeatherReading {
        match result {
            Ok(payload) => match normalize_weather(&payload) {
                Some(reading) => {
                    debug!(station_id = self.station_id, "Live weather reading received.");
                    reading
                }
                None => {
                    warn!(
                        station_id = self.station_id,
                        "Weather payload missing expected fields. Using simulated reading."
                    );
                    self.weather_sim.step()
                }
            },
            Err(e) => {
                warn!(
                    station_id = self.station_id,
                    error = %e,
                    "Weather fetch failed. Using simulated reading."
                );
                self.weather_sim.step()
            }
        }
    }

    fn resolve_pump(&mut self, result: Result<Value, FetchError>) -> PumpReading {
        match result {
            Ok(payload) => match normalize_pump(&payload) {
                Some(reading) => {
                    debug!(pump_id = self.station_id, "Live pump reading received.");
                    reading
                }
                None => {
                    warn!(
                        pump_id = self.station_id,
                        "Pump payload missing expected fields. Using simulated reading."
                    );
                    self.pump_sim.step()
                }
            },
            Err(e) => {
                warn!(
                    pump_id = self.station_id,
                    error = %e,
                    "Pump status fetch failed. Using simulated reading."
                );
                self.pump_sim.step()
            }
        }
    }

    /// Spawns the periodic refresh task. The first tick fires immediately,
    /// matching the dashboard's initial load. Ownership of the refresher
    /// moves into the task and comes back from [`RefreshHandle::stop`].
    pub fn start(mut self, period: Duration) -> RefreshHandle<S, R> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let liveness = self.liveness.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.refresh_once().await;
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("Refresh loop received shutdown signal.");
                        break;
                    }
                }
            }
            self
        });

        RefreshHandle {
            shutdown: shutdown_tx,
            task,
            liveness,
        }
    }
}

/// Cancellable handle to a running refresh loop.
pub struct RefreshHandle<S, R> {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Refresher<S, R>>,
    liveness: Liveness,
}

impl<S, R> RefreshHandle<S, R> {
    /// Cancels the pending timer and waits for the task to exit, returning
    /// the refresher so its final state stays inspectable. An in-flight
    /// cycle at the time of the call discards its results.
    pub async fn stop(self) -> Result<Refresher<S, R>, tokio::task::JoinError> {
        self.liveness.dispose();
        let _ = self.shutdown.send(true);
        self.task.await
    }
}
