//! Error types for chain operations.

use softarm_ir::JointId;
use thiserror::Error;

/// Errors reported by chain queries and structural edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The chain has no joints.
    #[error("chain is empty")]
    Empty,

    /// Index does not name a joint in the chain.
    #[error("joint index {index} out of range (chain has {len} joints)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current chain length.
        len: usize,
    },

    /// No joint carries the given id.
    #[error("no joint with id {0}")]
    UnknownJoint(JointId),
}

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;
