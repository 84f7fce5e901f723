//! Error types for the physics layer

use thiserror::Error;

/// Physics errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
