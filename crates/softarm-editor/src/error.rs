//! Error types for the editing session.

use softarm_ir::JointId;
use softarm_kinematics::ChainError;
use softarm_scene::SceneError;
use softarm_xml::XmlError;
use thiserror::Error;

/// Errors that can occur while editing, loading or saving a chain.
#[derive(Error, Debug)]
pub enum EditorError {
    /// Chain operation failed.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Joints file could not be read or written.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// Overlay could not be built.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file is invalid.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// A size edit was outside the accepted range.
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// An edit needs a selected joint and none is selected.
    #[error("no joint selected")]
    NoSelection,

    /// A loaded file has no joints.
    #[error("file has no joints")]
    NoJoints,

    /// Two joints in a loaded file share an id.
    #[error("duplicate joint id {0}")]
    DuplicateId(JointId),

    /// Save was requested before any file path was set.
    #[error("no file path set; use save-as")]
    NoPath,

    /// Macro script line is malformed or names a missing joint.
    #[error("macro line {line}: {reason}")]
    Macro {
        /// Line number (1-indexed).
        line: usize,
        /// What is wrong with the line.
        reason: String,
    },

    /// A macro step could not be applied during playback.
    #[error("macro step {step}: {reason}")]
    MacroStep {
        /// Step number (1-indexed, blank lines not counted).
        step: usize,
        /// Why the step failed.
        reason: String,
    },
}

impl EditorError {
    /// Create a macro error.
    pub fn macro_line(line: usize, reason: impl Into<String>) -> Self {
        Self::Macro {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;
