//! MongoDB connector and utilities
//!
//! Provides connection management and the ping used by readiness checks.

mod config;
mod connector;

pub use config::{DEFAULT_DATABASE, MongoConfig};
pub use connector::{connect_from_config, connect_from_config_with_retry, ping};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
