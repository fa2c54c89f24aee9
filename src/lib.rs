pub mod alerts;
pub mod api_client;
pub mod config;
pub mod history;
pub mod normalize;
pub mod reading;
pub mod refresher;
pub mod render;
pub mod simulator;
pub mod version;

pub use alerts::{Alert, AlertKind, AlertLog, Severity};
pub use api_client::{DataSource, FetchError, HttpDataSource};
pub use config::{MonitorConfig, load_config};
pub use history::{BoundedSeries, WeatherHistory, WeatherStats};
pub use reading::{PumpReading, Source, WeatherReading};
pub use refresher::{RefreshHandle, Refresher, RefresherSettings};
pub use render::{ConnectionStatus, DashboardRenderer, LogRenderer};
pub use simulator::{PumpSimulator, WeatherSimulator};
