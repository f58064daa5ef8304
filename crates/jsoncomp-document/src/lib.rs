//! jsoncomp Document Layer
//!
//! Owned JSON-like trees addressed by RFC 6901 pointers.
//!
//! # Core Types
//!
//! - [`Value`]: JSON values plus immutable [`Matcher`] leaves
//! - [`Pointer`]: path of key/index tokens from the root to a node
//! - [`Document`]: arena of nodes with stable [`NodeId`]s and pointer-based
//!   get/set/delete/flatten
//! - [`loader`]: comment-tolerant JSON, YAML and text loading
//!
//! # Architecture
//!
//! ```text
//! file / str → loader → Value → Document (arena) ⇄ Pointer
//!                                  │
//!                                  └→ flatten / to_value → Value
//! ```
//!
//! # Example
//!
//! ```rust
//! use jsoncomp_document::{Document, Pointer, Value};
//! use serde_json::json;
//!
//! let mut doc = Document::from(json!({"list": [1, 2, 3]}));
//! let ptr = Pointer::parse("/list/1").unwrap();
//! doc.set(&ptr, Value::from("two")).unwrap();
//! assert_eq!(doc.get(&ptr).unwrap(), Value::from("two"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod loader;
pub mod pointer;
pub mod value;

pub use document::{Document, Node, NodeId};
pub use error::{DocumentError, LoadError};
pub use loader::Format;
pub use pointer::{Pointer, PointerError, SequenceToken, Token};
pub use value::{Map, Matcher, MatcherRef, Value, ValueKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with documents
    pub use crate::document::{Document, NodeId};
    pub use crate::error::{DocumentError, LoadError};
    pub use crate::loader::{parse_str, read_file, Format};
    pub use crate::pointer::{Pointer, Token};
    pub use crate::value::{Map, Matcher, MatcherRef, Value};
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loaded_content_is_addressable() {
        let value = loader::parse_str(
            r#"{
                // shared values
                "$defs": {"ids": [10, 20]},
                "users": [{"name": "Kate"}]
            }"#,
            Format::Json,
        )
        .unwrap();
        let doc = Document::from(value);

        assert_eq!(
            doc.get(&"/$defs/ids/1".parse().unwrap()).unwrap(),
            Value::from(20)
        );
        assert_eq!(
            doc.get(&"/users/0/name".parse().unwrap()).unwrap(),
            Value::from("Kate")
        );
    }

    #[test]
    fn document_round_trips_to_json() {
        let source = json!({"a": [1, {"b": null}], "c": "x"});
        let doc = Document::from(source.clone());
        assert_eq!(doc.into_value().into_json().unwrap(), source);
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
