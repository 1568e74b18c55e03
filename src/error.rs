//! Error taxonomy for the benchmark harness.

use thiserror::Error;

use crate::backend::Phase;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value was present but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("postgres: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("postgres pool: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("failed to build postgres pool: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    /// A key-value hash could not be turned back into a comic.
    #[error("malformed key-value record {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("comic \"{0}\" has no identifier")]
    MissingIdentifier(String),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A fail-fast phase hit an error and the run was aborted.
    #[error("{backend} {phase} phase aborted: {source}")]
    Phase {
        backend: &'static str,
        phase: Phase,
        #[source]
        source: Box<Error>,
    },
}
