//! Call arguments for generators and matchers
//!
//! [`Arguments`] carries positional values (from `!args`) and keyword values
//! (the remaining fields of a marker). Parameters are bound by name first and
//! by position second, so `{"!gen": "Integer", "!args": [1], "max": 5}` binds
//! `min = 1` and `max = 5`.

use crate::error::RegistryError;
use jsoncomp_document::{Map, Value, ValueKind};

/// Positional and keyword arguments of one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    callee: String,
    positional: Vec<Value>,
    keyword: Map,
}

impl Arguments {
    /// Create empty arguments for the named callee
    #[inline]
    #[must_use]
    pub fn new(callee: impl Into<String>) -> Self {
        Self {
            callee: callee.into(),
            positional: Vec::new(),
            keyword: Map::new(),
        }
    }

    /// Set positional arguments
    #[inline]
    #[must_use]
    pub fn with_positional(mut self, positional: Vec<Value>) -> Self {
        self.positional = positional;
        self
    }

    /// Set keyword arguments
    #[inline]
    #[must_use]
    pub fn with_keyword(mut self, keyword: Map) -> Self {
        self.keyword = keyword;
        self
    }

    /// Add one keyword argument
    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Name of the generator or matcher being called
    #[inline]
    #[must_use]
    pub fn callee(&self) -> &str {
        &self.callee
    }

    /// Positional values
    #[inline]
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword values
    #[inline]
    #[must_use]
    pub fn keyword(&self) -> &Map {
        &self.keyword
    }

    /// Total number of supplied arguments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// Check if no arguments were supplied
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Bind a parameter: keyword `name` first, then position `index`
    #[must_use]
    pub fn get(&self, index: usize, name: &str) -> Option<&Value> {
        self.keyword.get(name).or_else(|| self.positional.get(index))
    }

    /// Reject arguments outside the parameter list
    ///
    /// `params` lists parameter names in positional order.
    ///
    /// # Errors
    /// Returns [`RegistryError::UnexpectedArgument`] for unknown keywords or
    /// surplus positional values
    pub fn ensure_known(&self, params: &[&str]) -> Result<(), RegistryError> {
        if let Some(name) = self.keyword.keys().find(|k| !params.contains(&k.as_str())) {
            return Err(RegistryError::unexpected_argument(&self.callee, name));
        }
        if self.positional.len() > params.len() {
            return Err(RegistryError::unexpected_argument(
                &self.callee,
                format!("#{}", params.len()),
            ));
        }
        Ok(())
    }

    /// Required value of any kind
    ///
    /// # Errors
    /// Returns [`RegistryError::MissingArgument`] if not bound
    pub fn value(&self, index: usize, name: &str) -> Result<&Value, RegistryError> {
        self.get(index, name)
            .ok_or_else(|| RegistryError::missing_argument(&self.callee, name))
    }

    /// Optional value, `null` treated as absent
    #[must_use]
    pub fn opt_value(&self, index: usize, name: &str) -> Option<&Value> {
        self.get(index, name).filter(|v| !v.is_null())
    }

    /// Required string
    ///
    /// # Errors
    /// Returns an argument error if missing or not a string
    pub fn str(&self, index: usize, name: &str) -> Result<&str, RegistryError> {
        self.opt_str(index, name)?
            .ok_or_else(|| RegistryError::missing_argument(&self.callee, name))
    }

    /// Optional string
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if present but not a string
    pub fn opt_str(&self, index: usize, name: &str) -> Result<Option<&str>, RegistryError> {
        self.opt_value(index, name)
            .map(|v| v.as_str().ok_or_else(|| self.wrong_kind(name, "string", v)))
            .transpose()
    }

    /// Required number
    ///
    /// # Errors
    /// Returns an argument error if missing or not a number
    pub fn f64(&self, index: usize, name: &str) -> Result<f64, RegistryError> {
        self.opt_f64(index, name)?
            .ok_or_else(|| RegistryError::missing_argument(&self.callee, name))
    }

    /// Optional number
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if present but not a number
    pub fn opt_f64(&self, index: usize, name: &str) -> Result<Option<f64>, RegistryError> {
        self.opt_value(index, name)
            .map(|v| v.as_f64().ok_or_else(|| self.wrong_kind(name, "number", v)))
            .transpose()
    }

    /// Required integer
    ///
    /// # Errors
    /// Returns an argument error if missing or not an integer
    pub fn i64(&self, index: usize, name: &str) -> Result<i64, RegistryError> {
        self.opt_i64(index, name)?
            .ok_or_else(|| RegistryError::missing_argument(&self.callee, name))
    }

    /// Optional integer
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if present but not an integer
    pub fn opt_i64(&self, index: usize, name: &str) -> Result<Option<i64>, RegistryError> {
        self.opt_value(index, name)
            .map(|v| v.as_i64().ok_or_else(|| self.wrong_kind(name, "integer", v)))
            .transpose()
    }

    /// Required non-negative integer
    ///
    /// # Errors
    /// Returns an argument error if missing, negative or not an integer
    pub fn usize(&self, index: usize, name: &str) -> Result<usize, RegistryError> {
        self.opt_usize(index, name)?
            .ok_or_else(|| RegistryError::missing_argument(&self.callee, name))
    }

    /// Optional non-negative integer
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if present but negative or not an integer
    pub fn opt_usize(&self, index: usize, name: &str) -> Result<Option<usize>, RegistryError> {
        self.opt_value(index, name)
            .map(|v| {
                v.as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| self.wrong_kind(name, "non-negative integer", v))
            })
            .transpose()
    }

    /// Required boolean
    ///
    /// # Errors
    /// Returns an argument error if missing or not a boolean
    pub fn bool(&self, index: usize, name: &str) -> Result<bool, RegistryError> {
        self.opt_bool(index, name)?
            .ok_or_else(|| RegistryError::missing_argument(&self.callee, name))
    }

    /// Optional boolean
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if present but not a boolean
    pub fn opt_bool(&self, index: usize, name: &str) -> Result<Option<bool>, RegistryError> {
        self.opt_value(index, name)
            .map(|v| v.as_bool().ok_or_else(|| self.wrong_kind(name, "bool", v)))
            .transpose()
    }

    /// Invalid argument error attributed to this callee
    #[must_use]
    pub fn invalid(&self, name: &str, reason: impl Into<String>) -> RegistryError {
        RegistryError::invalid_argument(&self.callee, name, reason)
    }

    fn wrong_kind(&self, name: &str, expected: &str, actual: &Value) -> RegistryError {
        self.invalid(
            name,
            format!(
                "expected {expected}, got {} {}",
                ValueKind::of(actual),
                actual.short_repr()
            ),
        )
    }
}
