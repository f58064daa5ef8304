//! Composer configuration

use crate::error::{ComposeError, ComposeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name of the scratch namespace
pub const DEFAULT_DEFS_KEY: &str = "$defs";

/// Composer configuration
///
/// Every field has a default, so partial JSON/YAML documents are accepted:
///
/// ```rust
/// use jsoncomp_core::ComposerConfig;
///
/// let config = ComposerConfig::from_yaml("seed: 42\nmax_passes: 50\n").unwrap();
/// assert_eq!(config.seed, Some(42));
/// assert_eq!(config.defs_key, "$defs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Directory relative file paths resolve against (current directory when unset)
    pub base_dir: Option<PathBuf>,
    /// Cache parsed file content across markers and sessions
    pub cache_files: bool,
    /// Maximum number of cached files
    pub file_cache_capacity: u64,
    /// Maximum resolution passes per document
    pub max_passes: usize,
    /// Maximum nesting of composed includes
    pub max_include_depth: usize,
    /// Seed for generators; random per session when unset
    pub seed: Option<u64>,
    /// Root key of the scratch namespace
    pub defs_key: String,
}

impl ComposerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from JSON
    ///
    /// # Errors
    /// Returns [`ComposeError::Config`] for invalid JSON or values
    pub fn from_json(content: &str) -> ComposeResult<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ComposeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML
    ///
    /// # Errors
    /// Returns [`ComposeError::Config`] for invalid YAML or values
    pub fn from_yaml(content: &str) -> ComposeResult<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| ComposeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// With base directory
    #[inline]
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// With file caching enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_cache_files(mut self, enabled: bool) -> Self {
        self.cache_files = enabled;
        self
    }

    /// With file cache capacity
    #[inline]
    #[must_use]
    pub fn with_file_cache_capacity(mut self, capacity: u64) -> Self {
        self.file_cache_capacity = capacity;
        self
    }

    /// With pass limit
    #[inline]
    #[must_use]
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// With include nesting limit
    #[inline]
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// With generator seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// With scratch namespace key
    #[inline]
    #[must_use]
    pub fn with_defs_key(mut self, key: impl Into<String>) -> Self {
        self.defs_key = key.into();
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ComposeError::Config`] describing the first invalid field
    pub fn validate(&self) -> ComposeResult<()> {
        if self.max_passes == 0 {
            return Err(ComposeError::Config("max_passes must be at least 1".into()));
        }
        if self.defs_key.is_empty() {
            return Err(ComposeError::Config("defs_key must not be empty".into()));
        }
        if self.cache_files && self.file_cache_capacity == 0 {
            return Err(ComposeError::Config(
                "file_cache_capacity must be at least 1 when caching is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Directory relative paths resolve against
    #[must_use]
    pub fn resolved_base_dir(&self) -> PathBuf {
        self.base_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            cache_files: true,
            file_cache_capacity: 1024,
            max_passes: 1000,
            max_include_depth: 16,
            seed: None,
            defs_key: DEFAULT_DEFS_KEY.to_string(),
        }
    }
}

/// Resolve `raw` against `base` unless it is absolute
#[must_use]
pub fn resolve_path(base: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
