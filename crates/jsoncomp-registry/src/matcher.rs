//! Matcher registry
//!
//! Maps names to [`MatcherFactory`]s. Every `build` call constructs a fresh
//! immutable matcher; nothing is cached.

use crate::arguments::Arguments;
use crate::error::RegistryError;
use indexmap::IndexMap;
use jsoncomp_document::MatcherRef;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Constructor of matcher objects
pub trait MatcherFactory: Send + Sync {
    /// Build a matcher from call arguments
    ///
    /// # Errors
    /// Returns [`RegistryError`] when the arguments are invalid
    fn build(&self, args: &Arguments) -> Result<MatcherRef, RegistryError>;
}

impl<F> MatcherFactory for F
where
    F: Fn(&Arguments) -> Result<MatcherRef, RegistryError> + Send + Sync,
{
    fn build(&self, args: &Arguments) -> Result<MatcherRef, RegistryError> {
        self(args)
    }
}

/// Registry of named matcher factories
#[derive(Clone, Default)]
pub struct MatcherRegistry {
    factories: IndexMap<String, Arc<dyn MatcherFactory>>,
}

impl MatcherRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Create registry with built-in matchers
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::matchers::install(&mut registry);
        registry
    }

    /// Register factory under a new name
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] if the name is taken
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl MatcherFactory + 'static,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::already_registered("matcher", name));
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    /// Register factory, replacing any previous one with the same name
    pub fn register_or_replace(
        &mut self,
        name: impl Into<String>,
        factory: impl MatcherFactory + 'static,
    ) {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Remove factory
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.factories.shift_remove(name).is_some()
    }

    /// Check if matcher exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in registration order
    #[inline]
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Number of registered matchers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build a new matcher instance
    ///
    /// # Errors
    /// - [`RegistryError::UnknownMatcher`] if `name` is not registered
    /// - argument errors raised by the factory
    pub fn build(&self, name: &str, args: &Arguments) -> Result<MatcherRef, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownMatcher(name.to_string()))?;
        let matcher = factory.build(args)?;
        tracing::trace!(name, matcher = %matcher, "built matcher");
        Ok(matcher)
    }
}

impl Debug for MatcherRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("matchers", &self.names())
            .finish()
    }
}
