use crate::utils::parser::ParseError;
use simio::engine::config::ConfigLoadError;
use simio::engine::error::FioError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Fio(#[from] FioError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("Invalid argument: {0}")]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
