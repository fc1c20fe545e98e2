//! Error types for joints-file reading and writing.

use thiserror::Error;

/// Errors that can occur while reading or writing a joints file.
///
/// Every read error carries the 1-indexed line and column of the element
/// (or byte) where the problem was found.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XmlError {
    /// The input is not well-formed XML.
    #[error("XML syntax error at line {line}, column {col}: {message}")]
    Syntax {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Parser message.
        message: String,
    },

    /// The root element is not `<joints>`.
    #[error("line {line}, column {col}: not a joints file (root element is <{found}>)")]
    NotAJointsFile {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Name of the root element actually found, empty if none.
        found: String,
    },

    /// A required element is absent.
    #[error("line {line}, column {col}: missing parameter <{parameter}>")]
    MissingParameter {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Name of the missing element.
        parameter: String,
    },

    /// An element's text is not a number.
    #[error("line {line}, column {col}: <{parameter}> is not a number: {text:?}")]
    InvalidNumber {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Element holding the bad value.
        parameter: String,
        /// The offending text.
        text: String,
    },

    /// The writer failed to emit an event.
    #[error("failed to write joints file: {0}")]
    Write(String),
}

impl XmlError {
    /// Create a missing-parameter error.
    pub fn missing(line: usize, col: usize, parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            line,
            col,
            parameter: parameter.into(),
        }
    }

    /// Create an invalid-number error.
    pub fn invalid_number(
        line: usize,
        col: usize,
        parameter: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::InvalidNumber {
            line,
            col,
            parameter: parameter.into(),
            text: text.into(),
        }
    }

    /// Line and column of a read error.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Syntax { line, col, .. }
            | Self::NotAJointsFile { line, col, .. }
            | Self::MissingParameter { line, col, .. }
            | Self::InvalidNumber { line, col, .. } => Some((*line, *col)),
            Self::Write(_) => None,
        }
    }
}

/// Result type for joints-file operations.
pub type Result<T> = std::result::Result<T, XmlError>;
