use config::{Config, Environment, File};
use serde::Deserialize;

use crate::config::{EngineConfig, KafkaConfig, MetadataConfig, RedisConfig, ServerConfig};
use crate::error::{Error, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub metadata: MetadataConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SPREADINFRA").separator("__"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }
}
