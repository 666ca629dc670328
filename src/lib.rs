//! Treepick - A modal list/tree picker engine
//!
//! This library drives hierarchical pickers over any tree exposed through a
//! [`provider::NodeProvider`]: it keeps the navigation history, the sort
//! policy and the picked set, and tells a host what to render through an
//! [`engine::PickerObserver`]. Two sources ship with it, the filesystem and
//! titled JSON trees, plus a terminal host used by the `treepick` binary.

use thiserror::Error;

pub mod cli;
pub mod config;
pub mod engine;
pub mod host;
pub mod node;
pub mod provider;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum TreepickError {
    /// Engine error
    #[error("Picker error: {0}")]
    PickerError(#[from] engine::PickerError),
    /// Node source error
    #[error("Source error: {0}")]
    ProviderError(#[from] provider::ProviderError),
    /// Interactive host error
    #[error("{0}")]
    HostError(#[from] host::HostError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
