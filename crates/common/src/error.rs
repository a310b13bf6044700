use thiserror::Error;

use crate::EngineState;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine is {actual}, expected {expected}")]
    InvalidState {
        expected: EngineState,
        actual: EngineState,
    },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Data source failed: {0}")]
    FatalSource(String),

    #[error("Execution error: {0}")]
    Execution(String),
}

impl Error {
    /// Errors that stop the system rather than being counted and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::FatalSource(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
