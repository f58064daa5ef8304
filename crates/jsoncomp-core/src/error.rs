//! Error types for composition
//!
//! [`ComposeError`] is the single error a composition session returns.
//! Document, registry and loading failures convert into it; the composer
//! attaches the pointer of the marker being resolved with
//! [`ComposeError::at`].
//!
//! Deferrals ("target not there yet", unmet `ifPresent` conditions) are
//! never errors. They surface only as [`ComposeError::NonConvergence`] once
//! a whole pass makes no progress.

use crate::marker::MarkerKind;
use jsoncomp_document::{DocumentError, LoadError, Pointer};
use jsoncomp_registry::RegistryError;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Result type for composition
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Composition errors
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Pointer resolution or mutation failed
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Generator or matcher lookup/arguments failed
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// File could not be read or parsed
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Reserved key present but the marker shape is invalid
    #[error("malformed marker at \"{pointer}\": {reason}")]
    MalformedMarker {
        /// Location of the marker
        pointer: Pointer,
        /// What is wrong with it
        reason: String,
    },

    /// A pass resolved nothing while markers remain
    #[error("composition does not converge, unresolved markers:\n{}", format_unresolved(.unresolved))]
    NonConvergence {
        /// Markers left after the stalled pass
        unresolved: Vec<Unresolved>,
    },

    /// Pass limit exceeded
    #[error("composition exceeded {limit} passes")]
    PassLimit {
        /// Configured limit
        limit: usize,
    },

    /// Nested composed includes too deep
    #[error("include of {} exceeds maximum nesting depth {limit}", .path.display())]
    IncludeDepth {
        /// File being included
        path: PathBuf,
        /// Configured limit
        limit: usize,
    },

    /// Invalid composer configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure while resolving the marker at a pointer
    #[error("failed to compose \"{pointer}\": {source}")]
    Marker {
        /// Location of the marker
        pointer: Pointer,
        /// Underlying failure
        #[source]
        source: Box<ComposeError>,
    },
}

impl ComposeError {
    /// Create malformed marker error
    pub fn malformed(pointer: &Pointer, reason: impl Into<String>) -> Self {
        Self::MalformedMarker {
            pointer: pointer.clone(),
            reason: reason.into(),
        }
    }

    /// Attach the pointer of the marker being resolved
    ///
    /// Malformed marker errors already carry their pointer and are returned
    /// unchanged.
    #[must_use]
    pub fn at(self, pointer: &Pointer) -> Self {
        match self {
            Self::MalformedMarker { .. } => self,
            other => Self::Marker {
                pointer: pointer.clone(),
                source: Box::new(other),
            },
        }
    }

    /// Innermost error beneath any marker location layers
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Marker { source, .. } = current {
            current = source;
        }
        current
    }

    /// Check if error only means "not resolvable yet"
    ///
    /// [`HandlerContext::target`](crate::handlers::HandlerContext::target)
    /// reports such errors as a pending target.
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self.root_cause(), Self::Document(e) if e.is_not_found())
    }

    /// Check for an unregistered generator or matcher
    #[inline]
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self.root_cause(), Self::Registry(e) if e.is_unknown())
    }

    /// Check for a stalled composition
    #[inline]
    #[must_use]
    pub fn is_non_convergence(&self) -> bool {
        matches!(self.root_cause(), Self::NonConvergence { .. })
    }

    /// Unresolved markers of a stalled composition
    #[must_use]
    pub fn unresolved(&self) -> &[Unresolved] {
        match self.root_cause() {
            Self::NonConvergence { unresolved } => unresolved,
            _ => &[],
        }
    }
}

/// Marker still pending when composition stalled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// Location of the marker
    pub pointer: Pointer,
    /// Marker kind
    pub kind: MarkerKind,
    /// Why the handler deferred
    pub reason: String,
}

impl Display for Unresolved {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "- \"{}\" ({}): {}", self.pointer, self.kind, self.reason)
    }
}

fn format_unresolved(unresolved: &[Unresolved]) -> String {
    unresolved
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
