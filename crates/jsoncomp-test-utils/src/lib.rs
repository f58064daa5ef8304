//! Testing utilities for the jsoncomp workspace
//!
//! Shared fixtures: on-disk file trees, values, pointers and deterministic
//! generation.

#![allow(missing_docs)]

use jsoncomp_document::{Pointer, Value};
use jsoncomp_registry::{Arguments, GenerationSession, GeneratorRegistry, GeneratorRng, RegistryError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Seed used by every deterministic helper
pub const TEST_SEED: u64 = 0x5EED;

/// Temporary directory of fixture files, removed on drop
#[derive(Debug)]
pub struct FileTree {
    dir: TempDir,
}

impl FileTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write a file, creating parent directories
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        self.write(relative, content);
        self
    }

    /// Write a JSON file from a `serde_json` value
    pub fn with_json(self, relative: &str, content: &serde_json::Value) -> Self {
        self.write(relative, &serde_json::to_string_pretty(content).unwrap());
        self
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

pub fn value(json: serde_json::Value) -> Value {
    Value::from(json)
}

pub fn ptr(s: &str) -> Pointer {
    Pointer::parse(s).unwrap()
}

pub fn setup_test_session() -> GenerationSession {
    GenerationSession::seeded(TEST_SEED)
}

/// Default generators plus `Counter`, which returns how often any
/// generator of this registry has run
pub fn create_counting_generators() -> (GeneratorRegistry, Arc<AtomicU64>) {
    let calls = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&calls);
    let mut registry = GeneratorRegistry::with_defaults();
    registry.register_or_replace(
        "Counter",
        move |args: &Arguments, _: &mut GeneratorRng| -> Result<Value, RegistryError> {
            args.ensure_known(&[])?;
            Ok(Value::from(counter.fetch_add(1, Ordering::SeqCst) + 1))
        },
    );
    (registry, calls)
}
