use thiserror::Error;

pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to memoize configuration: {0}")]
    Config(#[from] hostprof_config::ConfigError),

    #[error("Function not found in the host function table: {0}")]
    UnknownFunction(String),
}
