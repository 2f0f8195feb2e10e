//! Error types for the spatial backend

use crate::query::EntityId;
use thiserror::Error;

/// Spatial backend errors
#[derive(Debug, Error)]
pub enum SpatialError {
    /// Entity is not registered with the backend
    #[error("Entity not found: {0:?}")]
    UnknownEntity(EntityId),

    /// Bounding volume is malformed
    #[error("Invalid bounding volume: {0}")]
    InvalidShape(String),
}

/// Result type for spatial operations
pub type Result<T> = std::result::Result<T, SpatialError>;
