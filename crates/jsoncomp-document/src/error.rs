//! Error types for documents and loading
//!
//! - [`DocumentError`]: pointer resolution and mutation failures
//! - [`LoadError`]: reading and parsing external content

use crate::document::NodeId;
use crate::pointer::{Pointer, PointerError};
use std::path::PathBuf;

/// Errors raised by the pointer-addressable document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    /// Pointer does not resolve (missing key, type-incompatible token, scalar parent)
    #[error("failed to find value by \"{pointer}\" pointer in the document")]
    NotFound { pointer: Pointer },

    /// Sequence index negative or out of bounds
    #[error("invalid index \"{index}\" at \"{pointer}\" for sequence of {len} element(s)")]
    IndexRange {
        pointer: Pointer,
        index: String,
        len: usize,
    },

    /// Attempt to set or delete the document root
    #[error("direct root modification is not allowed, a non-empty pointer is required")]
    RootModification,

    /// Node id no longer refers to a live node
    #[error("node {0} is not part of the document")]
    StaleNode(NodeId),

    /// Matcher leaves have no JSON representation
    #[error("matcher {0} cannot be converted to plain JSON")]
    MatcherNotSerializable(String),

    /// Pointer syntax error
    #[error("pointer error: {0}")]
    Pointer(#[from] PointerError),
}

impl DocumentError {
    /// Create not found error for pointer
    pub fn not_found(pointer: &Pointer) -> Self {
        Self::NotFound {
            pointer: pointer.clone(),
        }
    }

    /// Create index range error
    pub fn index_range(pointer: &Pointer, index: impl Into<String>, len: usize) -> Self {
        Self::IndexRange {
            pointer: pointer.clone(),
            index: index.into(),
            len,
        }
    }

    /// Check if error only means "not there (yet)"
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors while reading or parsing content
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error during file read
    #[error("io error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Syntax error in content
    #[error("syntax error in {} at line {line}, column {column}: {message}", .path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Unknown explicit format name
    #[error("unknown content format: '{0}' (expected json, yaml or text)")]
    UnknownFormat(String),
}

impl LoadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create syntax error for path
    pub fn syntax_error(
        path: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            path: path.into(),
            line,
            column,
            message: message.into(),
        }
    }
}
