//! Database connectors and utilities for the products service
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connection, configuration and ping
//! - `config` - Load configuration through `core_config::FromEnv`
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "products");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
