//! Document values
//!
//! [`Value`] is the owned tree a [`Document`](crate::Document) is built from and
//! materialized into. It is JSON with one extra leaf kind: [`Matcher`] objects,
//! which a composed document carries as placeholders for approximate comparison.

use crate::error::DocumentError;
use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Ordered mapping of keys to values
pub type Map = IndexMap<String, Value>;

/// Shared handle to an immutable matcher
pub type MatcherRef = Arc<dyn Matcher>;

/// Comparison predicate substituted for a literal value
///
/// Matchers are built once and never mutated. `Display` must render a short,
/// stable description (e.g. `<Any Text>`), which is also what two matchers are
/// compared by when checking structural equality of documents.
pub trait Matcher: Debug + Display + Send + Sync {
    /// Registered name of the matcher kind
    fn name(&self) -> &str;

    /// Check whether an actual value satisfies this matcher
    fn matches(&self, actual: &Value) -> bool;

    /// Explain why `actual` does not match
    ///
    /// Returns an empty list when the value matches.
    fn explain(&self, actual: &Value) -> Vec<String> {
        if self.matches(actual) {
            Vec::new()
        } else {
            vec![format!("{} != {}", actual.short_repr(), self)]
        }
    }
}

/// Document value: JSON plus matcher leaves
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// JSON `null`
    #[default]
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number
    Number(serde_json::Number),
    /// JSON string
    String(String),
    /// JSON array
    Array(Vec<Value>),
    /// JSON object (insertion ordered)
    Object(Map),
    /// Placeholder predicate
    Matcher(MatcherRef),
}

impl Value {
    /// Empty object
    #[inline]
    #[must_use]
    pub fn object() -> Self {
        Self::Object(Map::new())
    }

    /// Kind of this value
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        ValueKind::of(self)
    }

    /// Check for `null`
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check whether value is an object or array
    #[inline]
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as bool
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as f64 (any number)
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Get as i64 (integers only)
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Get as u64 (non-negative integers only)
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Borrow as array
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as object
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Mutably borrow as object
    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow matcher leaf
    #[inline]
    #[must_use]
    pub fn as_matcher(&self) -> Option<&MatcherRef> {
        match self {
            Self::Matcher(m) => Some(m),
            _ => None,
        }
    }

    /// Object member lookup
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Check whether any matcher leaf is present in this value
    #[must_use]
    pub fn contains_matcher(&self) -> bool {
        match self {
            Self::Matcher(_) => true,
            Self::Array(items) => items.iter().any(Value::contains_matcher),
            Self::Object(map) => map.values().any(Value::contains_matcher),
            _ => false,
        }
    }

    /// Wildcard comparison
    ///
    /// `self` is the expected value. Matcher leaves on the expected side are
    /// evaluated against the actual value; containers recurse; numbers compare
    /// numerically; everything else compares structurally.
    #[must_use]
    pub fn matches(&self, actual: &Value) -> bool {
        match (self, actual) {
            (Self::Matcher(m), _) => m.matches(actual),
            (Self::Number(a), Self::Number(b)) => numbers_equal(a, b),
            (Self::Array(expected), Self::Array(items)) => {
                expected.len() == items.len()
                    && expected.iter().zip(items).all(|(e, v)| e.matches(v))
            }
            (Self::Object(expected), Self::Object(map)) => {
                expected.len() == map.len()
                    && expected
                        .iter()
                        .all(|(k, e)| map.get(k).is_some_and(|v| e.matches(v)))
            }
            _ => self == actual,
        }
    }

    /// Convert into plain JSON
    ///
    /// # Errors
    /// Returns [`DocumentError::MatcherNotSerializable`] if a matcher leaf is present
    pub fn into_json(self) -> Result<serde_json::Value, DocumentError> {
        Ok(match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(b),
            Self::Number(n) => serde_json::Value::Number(n),
            Self::String(s) => serde_json::Value::String(s),
            Self::Array(items) => serde_json::Value::Array(
                items
                    .into_iter()
                    .map(Value::into_json)
                    .collect::<Result<_, _>>()?,
            ),
            Self::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| v.into_json().map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Matcher(m) => {
                return Err(DocumentError::MatcherNotSerializable(m.to_string()));
            }
        })
    }

    /// Compact representation, shortened for diagnostics
    #[must_use]
    pub fn short_repr(&self) -> String {
        let full = self.to_string();
        let chars: Vec<char> = full.chars().collect();
        if self.is_container() && chars.len() > 55 {
            let head: String = chars[..35].iter().collect();
            let tail: String = chars[chars.len() - 20..].iter().collect();
            format!("{head} ...{tail}")
        } else {
            full
        }
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() <= f64::EPSILON * x.abs().max(y.abs()),
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Matcher(a), Self::Matcher(b)) => {
                a.name() == b.name() && a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Self::Matcher(m) => serializer.serialize_str(&m.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n.into())
    }
}

/// Non-finite floats become `null`, as in JSON
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Object(map)
    }
}

impl From<MatcherRef> for Value {
    fn from(m: MatcherRef) -> Self {
        Self::Matcher(m)
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.into_json()
    }
}

/// Classification of values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `null`
    Null,
    /// boolean
    Bool,
    /// integral number
    Integer,
    /// non-integral number
    Float,
    /// string
    String,
    /// array
    Array,
    /// object
    Object,
    /// matcher leaf
    Matcher,
}

impl ValueKind {
    /// Classify a value
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::Matcher(_) => Self::Matcher,
        }
    }

    /// Lowercase kind name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Matcher => "matcher",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
