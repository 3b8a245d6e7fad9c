//! Runtime error types.

use thiserror::Error;

use herald_framework::RegistrationError;

use crate::config::ConfigError;

/// Errors raised while assembling a client.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A command was rejected by the registry.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
