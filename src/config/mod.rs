pub mod loader;

use serde::Deserialize;
use std::time::Duration;

pub use loader::AppConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    pub interval_secs: u64,
    pub max_retries: u32,
}

impl SourceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourcesConfig {
    pub spot: SourceConfig,
    pub dealer: SourceConfig,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PersistenceConfig {
    pub data_file: String,
    pub transactions_file: String,
    pub history_limit: usize,
}
