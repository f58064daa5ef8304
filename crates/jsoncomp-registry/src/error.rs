//! Error types for registries
//!
//! Covers registration conflicts, lookups of unregistered names and
//! argument binding failures raised while generating values or building
//! matchers.

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Name already taken in the registry
    #[error("{kind} \"{name}\" already registered")]
    AlreadyRegistered {
        /// Registry kind ("generator" or "matcher")
        kind: &'static str,
        /// Conflicting name
        name: String,
    },

    /// No generator under this name
    #[error("failed to find generator with name \"{0}\"")]
    UnknownGenerator(String),

    /// No matcher under this name
    #[error("failed to find matcher with name \"{0}\"")]
    UnknownMatcher(String),

    /// Required argument not supplied
    #[error("{callee}: missing required argument \"{argument}\"")]
    MissingArgument {
        /// Generator or matcher name
        callee: String,
        /// Argument name
        argument: String,
    },

    /// Argument of wrong type or out of range
    #[error("{callee}: invalid argument \"{argument}\": {reason}")]
    InvalidArgument {
        /// Generator or matcher name
        callee: String,
        /// Argument name
        argument: String,
        /// What was wrong
        reason: String,
    },

    /// Argument not accepted by the callee
    #[error("{callee}: unexpected argument \"{argument}\"")]
    UnexpectedArgument {
        /// Generator or matcher name
        callee: String,
        /// Argument name or position
        argument: String,
    },
}

impl RegistryError {
    /// Create already registered error
    pub fn already_registered(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyRegistered {
            kind,
            name: name.into(),
        }
    }

    /// Create missing argument error
    pub fn missing_argument(callee: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::MissingArgument {
            callee: callee.into(),
            argument: argument.into(),
        }
    }

    /// Create invalid argument error
    pub fn invalid_argument(
        callee: impl Into<String>,
        argument: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            callee: callee.into(),
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Create unexpected argument error
    pub fn unexpected_argument(callee: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::UnexpectedArgument {
            callee: callee.into(),
            argument: argument.into(),
        }
    }

    /// Check if error is a failed name lookup
    #[inline]
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::UnknownGenerator(_) | Self::UnknownMatcher(_))
    }

    /// Check if error comes from argument binding
    #[inline]
    #[must_use]
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. }
                | Self::InvalidArgument { .. }
                | Self::UnexpectedArgument { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            RegistryError::already_registered("generator", "FirstName").to_string(),
            "generator \"FirstName\" already registered"
        );
        assert_eq!(
            RegistryError::UnknownMatcher("AnyFoo".into()).to_string(),
            "failed to find matcher with name \"AnyFoo\""
        );
        assert_eq!(
            RegistryError::invalid_argument("Integer", "min", "expected integer").to_string(),
            "Integer: invalid argument \"min\": expected integer"
        );
    }

    #[test]
    fn classification() {
        assert!(RegistryError::UnknownGenerator("x".into()).is_unknown());
        assert!(!RegistryError::UnknownGenerator("x".into()).is_argument_error());
        assert!(RegistryError::missing_argument("x", "y").is_argument_error());
        assert!(RegistryError::unexpected_argument("x", "y").is_argument_error());
    }
}
