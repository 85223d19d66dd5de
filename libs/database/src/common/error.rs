/// Error type for connecting to and probing the database
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Driver-level MongoDB error (bad connection string, pool setup)
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The deployment did not answer a ping
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
