//! Type-only matchers: anything, bools and dicts

use super::{explain_with, type_mismatch};
use crate::arguments::Arguments;
use crate::error::RegistryError;
use crate::matcher::MatcherRegistry;
use jsoncomp_document::{Matcher, MatcherRef, Value};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

pub(super) fn install(registry: &mut MatcherRegistry) {
    registry.register_or_replace("Anything", unit::<Anything>());
    registry.register_or_replace("AnyBool", unit::<AnyBool>());
    registry.register_or_replace("AnyDict", unit::<AnyDict>());
    registry.register_or_replace("AnyNonEmptyDict", unit::<AnyNonEmptyDict>());
}

/// Factory for matchers without parameters
pub(super) fn unit<M>() -> impl Fn(&Arguments) -> Result<MatcherRef, RegistryError> + Send + Sync
where
    M: Matcher + Default + 'static,
{
    |args: &Arguments| -> Result<MatcherRef, RegistryError> {
        args.ensure_known(&[])?;
        let matcher: MatcherRef = Arc::new(M::default());
        Ok(matcher)
    }
}

/// Matches any value except `null`
#[derive(Debug, Clone, Copy, Default)]
pub struct Anything;

impl Display for Anything {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<Any>")
    }
}

impl Matcher for Anything {
    fn name(&self) -> &str {
        "Anything"
    }

    fn matches(&self, actual: &Value) -> bool {
        !actual.is_null()
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Anything", actual, self, || {
            vec!["Value is null, but expected to be anything".to_string()]
        })
    }
}

/// Matches any boolean
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyBool;

impl Display for AnyBool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<Any Bool>")
    }
}

impl Matcher for AnyBool {
    fn name(&self) -> &str {
        "AnyBool"
    }

    fn matches(&self, actual: &Value) -> bool {
        matches!(actual, Value::Bool(_))
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Bool", actual, self, || type_mismatch(actual, "bool"))
    }
}

/// Matches any object
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyDict;

impl Display for AnyDict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<Any Dict>")
    }
}

impl Matcher for AnyDict {
    fn name(&self) -> &str {
        "AnyDict"
    }

    fn matches(&self, actual: &Value) -> bool {
        matches!(actual, Value::Object(_))
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Dict", actual, self, || type_mismatch(actual, "object"))
    }
}

/// Matches any object with at least one member
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyNonEmptyDict;

impl Display for AnyNonEmptyDict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<Any Non-Empty Dict>")
    }
}

impl Matcher for AnyNonEmptyDict {
    fn name(&self) -> &str {
        "AnyNonEmptyDict"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_object().is_some_and(|map| !map.is_empty())
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Non-empty Dict", actual, self, || {
            if actual.as_object().is_some() {
                vec!["Dict is empty!".to_string()]
            } else {
                type_mismatch(actual, "object")
            }
        })
    }
}
