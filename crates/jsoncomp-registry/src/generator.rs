//! Generator registry
//!
//! Maps names to [`Generator`]s and runs them inside a [`GenerationSession`].
//!
//! # Identity tags
//!
//! A call made with a tag is cached under `"{name}.{tag}"` for the lifetime of
//! the session, so every marker sharing the tag receives the same value. The
//! first tagged call draws from a ChaCha20 stream seeded with the BLAKE3 hash
//! of the session salt and the cache key; untagged calls draw from the
//! session's base stream.

use crate::arguments::Arguments;
use crate::error::RegistryError;
use indexmap::IndexMap;
use jsoncomp_document::Value;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Random source handed to generators
pub type GeneratorRng = ChaCha20Rng;

/// Procedural value producer
pub trait Generator: Send + Sync {
    /// Produce a value for the given arguments
    ///
    /// # Errors
    /// Returns [`RegistryError`] when the arguments cannot be bound
    fn generate(&self, args: &Arguments, rng: &mut GeneratorRng) -> Result<Value, RegistryError>;
}

impl<F> Generator for F
where
    F: Fn(&Arguments, &mut GeneratorRng) -> Result<Value, RegistryError> + Send + Sync,
{
    fn generate(&self, args: &Arguments, rng: &mut GeneratorRng) -> Result<Value, RegistryError> {
        self(args, rng)
    }
}

/// Per-composition generation state
///
/// Owns the identity cache and the random streams. One session is used for a
/// whole composition, including nested `!compose` includes. Cloning
/// snapshots the cache and the base stream.
#[derive(Clone)]
pub struct GenerationSession {
    cache: HashMap<String, Value>,
    rng: ChaCha20Rng,
    salt: u64,
    hits: usize,
}

impl GenerationSession {
    /// Create session, seeded from `seed` or from entropy
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let salt = seed.unwrap_or_else(rand::random);
        Self {
            cache: HashMap::new(),
            rng: ChaCha20Rng::seed_from_u64(salt),
            salt,
            hits: 0,
        }
    }

    /// Create deterministic session
    #[inline]
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Cached value for a generator name and tag
    #[must_use]
    pub fn cached(&self, name: &str, tag: &str) -> Option<&Value> {
        self.cache.get(&cache_key(name, tag))
    }

    /// Number of cached identities
    #[inline]
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Number of calls answered from the identity cache
    #[inline]
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.hits
    }

    /// Drop all cached identities
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn tag_rng(&self, key: &str) -> ChaCha20Rng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.salt.to_le_bytes());
        hasher.update(key.as_bytes());
        ChaCha20Rng::from_seed(*hasher.finalize().as_bytes())
    }
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Debug for GenerationSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationSession")
            .field("cached", &self.cache.len())
            .field("hits", &self.hits)
            .finish_non_exhaustive()
    }
}

fn cache_key(name: &str, tag: &str) -> String {
    format!("{name}.{tag}")
}

/// Registry of named generators
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: IndexMap<String, Arc<dyn Generator>>,
}

impl GeneratorRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            generators: IndexMap::new(),
        }
    }

    /// Create registry with built-in generators
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::generators::install(&mut registry);
        registry
    }

    /// Register generator under a new name
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] if the name is taken
    pub fn register(
        &mut self,
        name: impl Into<String>,
        generator: impl Generator + 'static,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.generators.contains_key(&name) {
            return Err(RegistryError::already_registered("generator", name));
        }
        self.generators.insert(name, Arc::new(generator));
        Ok(())
    }

    /// Register generator, replacing any previous one with the same name
    pub fn register_or_replace(
        &mut self,
        name: impl Into<String>,
        generator: impl Generator + 'static,
    ) {
        self.generators.insert(name.into(), Arc::new(generator));
    }

    /// Remove generator
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.generators.shift_remove(name).is_some()
    }

    /// Check if generator exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Registered names in registration order
    #[inline]
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.generators.keys().map(String::as_str).collect()
    }

    /// Number of registered generators
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Generate a value
    ///
    /// With a `tag`, the first result is cached in the session and returned
    /// unchanged by later calls with the same name and tag.
    ///
    /// # Errors
    /// - [`RegistryError::UnknownGenerator`] if `name` is not registered
    /// - argument errors raised by the generator
    pub fn generate(
        &self,
        name: &str,
        args: &Arguments,
        tag: Option<&str>,
        session: &mut GenerationSession,
    ) -> Result<Value, RegistryError> {
        let generator = self
            .generators
            .get(name)
            .ok_or_else(|| RegistryError::UnknownGenerator(name.to_string()))?;

        let Some(tag) = tag else {
            return generator.generate(args, &mut session.rng);
        };

        let key = cache_key(name, tag);
        if let Some(value) = session.cache.get(&key) {
            session.hits += 1;
            tracing::trace!(key = %key, "generator cache hit");
            return Ok(value.clone());
        }

        let mut rng = session.tag_rng(&key);
        let value = generator.generate(args, &mut rng)?;
        tracing::trace!(key = %key, "generated tagged value");
        session.cache.insert(key, value.clone());
        Ok(value)
    }
}

impl Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.names())
            .finish()
    }
}
