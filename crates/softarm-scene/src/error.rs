//! Error types for overlay construction.

use thiserror::Error;

/// Errors that can occur while building overlays.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Shape name is not one of box, cone, cylinder, sphere.
    #[error("unknown shape kind: {0:?}")]
    UnknownShape(String),

    /// A shape dimension is not a positive finite number.
    #[error("invalid {kind} size: {message}")]
    InvalidSize {
        /// Shape kind being built.
        kind: &'static str,
        /// Which dimension is wrong.
        message: String,
    },
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
