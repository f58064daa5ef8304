//! Composition markers
//!
//! A marker is a mapping carrying exactly one definition key:
//!
//! | key | kind | parameters |
//! |---|---|---|
//! | `!ref` | [`MarkerKind::Ref`] | |
//! | `!xref` | [`MarkerKind::XRef`] | `extend`, `delete`, `ifPresent`, `ifMissing` |
//! | `!file` | [`MarkerKind::File`] | |
//! | `!include` | [`MarkerKind::Include`] | `!compose`, `!format` |
//! | `!gen` | [`MarkerKind::Gen`] | `!args`, `!id`, keyword fields |
//! | `!match` | [`MarkerKind::Match`] | `!args`, keyword fields |
//!
//! Other fields of reference, file and include markers are ignored.

use crate::error::{ComposeError, ComposeResult};
use jsoncomp_document::{Document, Map, Node, NodeId, Pointer, Value};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Positional arguments field of generator and matcher markers
pub const ARGS_KEY: &str = "!args";
/// Identity tag field of generator markers
pub const ID_KEY: &str = "!id";
/// Nested composition flag of include markers
pub const COMPOSE_KEY: &str = "!compose";
/// Explicit format field of include markers
pub const FORMAT_KEY: &str = "!format";

static NULL: Value = Value::Null;

/// Kind of marker, one per definition key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Deep copy of another node
    Ref,
    /// Deep copy with edits and conditions
    XRef,
    /// Parsed file content, markers left live
    File,
    /// File content, optionally composed on its own
    Include,
    /// Generated value
    Gen,
    /// Matcher object
    Match,
}

impl MarkerKind {
    /// All kinds in dispatch order
    pub const ALL: [Self; 6] = [
        Self::Ref,
        Self::XRef,
        Self::File,
        Self::Include,
        Self::Gen,
        Self::Match,
    ];

    /// Definition key
    #[inline]
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Ref => "!ref",
            Self::XRef => "!xref",
            Self::File => "!file",
            Self::Include => "!include",
            Self::Gen => "!gen",
            Self::Match => "!match",
        }
    }

    /// Kind for a definition key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Fields read by the handler, definition key first
    ///
    /// Generator and matcher markers also read every other field as a
    /// keyword argument.
    #[must_use]
    pub fn params(self) -> &'static [&'static str] {
        match self {
            Self::Ref => &["!ref"],
            Self::XRef => &["!xref", "extend", "delete", "ifPresent", "ifMissing"],
            Self::File => &["!file"],
            Self::Include => &["!include", COMPOSE_KEY, FORMAT_KEY],
            Self::Gen => &["!gen", ARGS_KEY, ID_KEY],
            Self::Match => &["!match", ARGS_KEY],
        }
    }

    /// Check whether non-reserved fields are keyword arguments
    #[inline]
    #[must_use]
    pub fn takes_keywords(self) -> bool {
        matches!(self, Self::Gen | Self::Match)
    }

    /// Detect the marker kind from mapping keys
    ///
    /// # Errors
    /// Returns the offending keys when more than one definition key is present
    pub fn detect<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<Option<Self>, String> {
        let found: Vec<(&str, Self)> = keys
            .into_iter()
            .filter_map(|key| Self::from_key(key).map(|kind| (key, kind)))
            .collect();
        match found.as_slice() {
            [] => Ok(None),
            [(_, kind)] => Ok(Some(*kind)),
            many => Err(format!(
                "only one definition key is allowed, found {}",
                many.iter()
                    .map(|(key, _)| format!("\"{key}\""))
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

impl Display for MarkerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Marker kind of a document node, if it is a marker
///
/// Mappings with several definition keys are reported as not being markers;
/// the composer's scan rejects them before handlers run.
#[must_use]
pub fn node_kind(document: &Document, id: NodeId) -> Option<MarkerKind> {
    match document.node(id) {
        Some(Node::Mapping(map)) => MarkerKind::detect(map.keys().map(String::as_str))
            .ok()
            .flatten(),
        _ => None,
    }
}

/// Check whether the subtree at `id` contains a marker (including `id` itself)
#[must_use]
pub fn subtree_has_marker(document: &Document, id: NodeId) -> bool {
    document
        .walk_from(id, &Pointer::root())
        .into_iter()
        .any(|(_, node)| node_kind(document, node).is_some())
}

/// Check whether a value contains a marker anywhere
#[must_use]
pub fn value_has_marker(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.keys().any(|key| MarkerKind::from_key(key).is_some())
                || map.values().any(value_has_marker)
        }
        Value::Array(items) => items.iter().any(value_has_marker),
        _ => false,
    }
}

/// Marker snapshot handed to a handler
#[derive(Debug, Clone)]
pub struct Marker {
    kind: MarkerKind,
    pointer: Pointer,
    fields: Map,
}

impl Marker {
    /// Create marker from the materialized node value
    ///
    /// # Errors
    /// Returns [`ComposeError::MalformedMarker`] if the value is not a mapping
    /// holding the definition key of `kind`
    pub fn new(kind: MarkerKind, pointer: Pointer, value: Value) -> ComposeResult<Self> {
        match value {
            Value::Object(fields) if fields.contains_key(kind.key()) => Ok(Self {
                kind,
                pointer,
                fields,
            }),
            _ => Err(ComposeError::malformed(
                &pointer,
                format!("expected mapping with \"{}\" key", kind.key()),
            )),
        }
    }

    /// Marker kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    /// Location of the marker
    #[inline]
    #[must_use]
    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    /// All fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &Map {
        &self.fields
    }

    /// Value of the definition key
    #[must_use]
    pub fn definition(&self) -> &Value {
        self.fields.get(self.kind.key()).unwrap_or(&NULL)
    }

    /// Definition value as a string
    ///
    /// # Errors
    /// Returns [`ComposeError::MalformedMarker`] if it is not a string
    pub fn definition_str(&self) -> ComposeResult<&str> {
        self.definition()
            .as_str()
            .ok_or_else(|| self.malformed(format!("\"{}\" must be a string", self.kind.key())))
    }

    /// Parameter value; `null` counts as absent
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// Fields passed to generators and matchers as keyword arguments
    #[must_use]
    pub fn keyword_args(&self) -> Map {
        if !self.kind.takes_keywords() {
            return Map::new();
        }
        let reserved = self.kind.params();
        self.fields
            .iter()
            .filter(|(key, _)| !reserved.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Check whether any field the handler reads still contains a marker
    #[must_use]
    pub fn has_pending_params(&self) -> bool {
        let reserved = self.kind.params();
        self.fields
            .iter()
            .filter(|(key, _)| self.kind.takes_keywords() || reserved.contains(&key.as_str()))
            .any(|(_, value)| value_has_marker(value))
    }

    /// Malformed marker error at this marker's location
    #[must_use]
    pub fn malformed(&self, reason: impl Into<String>) -> ComposeError {
        ComposeError::malformed(&self.pointer, reason)
    }
}
