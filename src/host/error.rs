//! Host error types

use super::input::InputError;
use crate::engine::PickerError;
use thiserror::Error;

/// Errors that end an interactive picker run
#[derive(Debug, Error)]
pub enum HostError {
    /// Prompt failed
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Engine refused an operation the host cannot recover from
    #[error("Picker error: {0}")]
    Picker(#[from] PickerError),
}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;
