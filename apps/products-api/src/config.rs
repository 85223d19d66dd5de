//! Configuration for Products API

use core_config::{AppInfo, FromEnv, app_info, env_parse_or, server::ServerConfig};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Install the Prometheus recorder and expose `/metrics`
    pub metrics_enabled: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mut mongodb = MongoConfig::from_env()?;
        if mongodb.app_name.is_none() {
            mongodb = mongodb.with_app_name("products-api");
        }
        let server = ServerConfig::from_env()?;
        let metrics_enabled = env_parse_or("METRICS_ENABLED", true)?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            metrics_enabled,
        })
    }
}
