//! jsoncomp Core
//!
//! Resolves composition markers in JSON-like documents into plain data.
//!
//! # Markers
//!
//! | key | result |
//! |---|---|
//! | `!ref` | deep copy of the node at a pointer |
//! | `!xref` | deep copy edited with `extend` / `delete`, gated by `ifPresent` / `ifMissing` |
//! | `!file` | parsed file content, markers resolved in the host document |
//! | `!include` | file content; with `!compose: true` composed on its own first |
//! | `!gen` | generated value, identical for markers sharing an `!id` |
//! | `!match` | matcher object leaf |
//!
//! The root `$defs` mapping is a scratch area for shared values and is
//! removed from the result.
//!
//! # Architecture
//!
//! ```text
//! Value → Document ─┬→ Composer pass: scan → handlers → replace ─┐
//!                   │        ↑                                   │
//!                   │        └──────── markers left ─────────────┘
//!                   └→ no markers → remove $defs → Value
//! ```
//!
//! # Example
//!
//! ```rust
//! use jsoncomp_core::compose;
//! use jsoncomp_document::Value;
//! use serde_json::json;
//!
//! let resolved = compose(Value::from(json!({
//!     "$defs": {"x": 5},
//!     "a": {"!ref": "/$defs/x"},
//!     "id": {"!gen": "Uuid", "!id": "user"},
//!     "same_id": {"!gen": "Uuid", "!id": "user"}
//! })))
//! .unwrap();
//!
//! assert_eq!(resolved.get("a"), Some(&Value::from(5)));
//! assert_eq!(resolved.get("id"), resolved.get("same_id"));
//! assert!(resolved.get("$defs").is_none());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod composer;
pub mod config;
pub mod error;
pub mod handlers;
pub mod marker;

pub use cache::{CacheStats, FileCache};
pub use composer::{ComposeReport, Composer};
pub use config::ComposerConfig;
pub use error::{ComposeError, ComposeResult, Unresolved};
pub use marker::{Marker, MarkerKind};

use jsoncomp_document::Value;
use std::path::Path;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compose a value with the default configuration
///
/// # Errors
/// Any [`ComposeError`]
pub fn compose(value: Value) -> ComposeResult<Value> {
    Composer::default().compose(value)
}

/// Load and compose a file with the default configuration
///
/// # Errors
/// Any [`ComposeError`]
pub fn compose_file(path: impl AsRef<Path>) -> ComposeResult<Value> {
    Composer::default().compose_file(path)
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for composing documents
    pub use crate::composer::{ComposeReport, Composer};
    pub use crate::config::ComposerConfig;
    pub use crate::error::{ComposeError, ComposeResult};
    pub use crate::marker::MarkerKind;
    pub use crate::{compose, compose_file};
    pub use jsoncomp_document::{Document, Pointer, Value};
    pub use jsoncomp_registry::{GenerationSession, GeneratorRegistry, MatcherRegistry};
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use jsoncomp_registry::{Arguments, GeneratorRegistry, GeneratorRng, RegistryError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn every_marker_kind_in_one_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.json"), r#"{"role": "user"}"#).unwrap();
        std::fs::write(dir.path().join("greeting.txt"), "hello").unwrap();

        let composer = Composer::new(ComposerConfig::new().with_base_dir(dir.path()).with_seed(9));
        let (out, report) = composer
            .compose_with_report(Value::from(json!({
                "$defs": {"base": {"!file": "base.json"}},
                "admin": {"!xref": "/$defs/base", "extend": {"/role": "admin"}},
                "user": {"!ref": "/$defs/base"},
                "greeting": {"!include": "greeting.txt"},
                "age": {"!gen": "Integer", "min": 30, "max": 30},
                "id": {"!match": "AnyNumber"}
            })))
            .unwrap();

        assert!(out.matches(&Value::from(json!({
            "admin": {"role": "admin"},
            "user": {"role": "user"},
            "greeting": "hello",
            "age": 30,
            "id": 12
        }))));
        for kind in MarkerKind::ALL {
            assert_eq!(report.resolved(kind), 1, "{kind}");
        }
    }

    #[test]
    fn custom_generator_registry() {
        fn constant(args: &Arguments, _: &mut GeneratorRng) -> Result<Value, RegistryError> {
            args.ensure_known(&[])?;
            Ok(Value::from("fixed"))
        }

        let mut generators = GeneratorRegistry::with_defaults();
        generators.register("Constant", constant).unwrap();
        let composer = Composer::default().with_generators(generators);

        let out = composer
            .compose(Value::from(json!({"a": {"!gen": "Constant"}})))
            .unwrap();
        assert_eq!(out, Value::from(json!({"a": "fixed"})));
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
