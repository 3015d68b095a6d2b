//! Error types for game-state operations.

use thiserror::Error;

/// Errors raised by game-state transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A player with the same name (case-insensitive) already exists.
    #[error("duplicate player name: {name}")]
    DuplicateName { name: String },
}

impl DomainError {
    /// Create a DuplicateName error.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }
}
