use mongodb::{Client, bson::doc, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry, retry_with_backoff};

/// Run the `ping` admin command against the deployment.
///
/// Used both to verify a fresh connection and by the readiness check.
pub async fn ping(client: &Client) -> DatabaseResult<()> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}

/// Connect using a MongoConfig and verify the connection with a ping
pub async fn connect_from_config(config: &MongoConfig) -> DatabaseResult<Client> {
    info!("Attempting to connect to MongoDB at {}", config.redacted_url());

    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options)?;
    ping(&client).await?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Connect from config, retrying with exponential backoff on failure
///
/// Only used at startup: a database that is still booting should not kill the process.
///
/// # Example
/// ```ignore
/// use database::common::RetryConfig;
///
/// let retry_config = RetryConfig::new().with_max_retries(5);
/// let client = connect_from_config_with_retry(&config, Some(retry_config)).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<Client> {
    match retry_config {
        Some(retry) => retry_with_backoff(|| connect_from_config(config), retry).await,
        None => retry(|| connect_from_config(config)).await,
    }
}
