use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::config::{PersistenceConfig, ServerConfig, SourcesConfig};
use crate::error::{Error, Result};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub persistence: PersistenceConfig,
}

impl AppConfig {
    /// Layered load: base file, optional per-environment file, then
    /// GOLDWATCH_-prefixed environment variables on top.
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("GOLDWATCH").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }
}
