//! Built-in matchers
//!
//! Every matcher renders as a short `<...>` description and can explain a
//! failed comparison line by line:
//!
//! ```text
//! Comparing to Number Greater Than matcher:
//! 3 != <Any Number Greater Than (5)>
//! Number is less than expected:
//! 3 < 5
//! ```

pub mod basic;
pub mod dates;
pub mod lists;
pub mod numbers;
pub mod text;

use crate::matcher::MatcherRegistry;
use jsoncomp_document::{Matcher, Value};

pub(crate) fn install(registry: &mut MatcherRegistry) {
    basic::install(registry);
    text::install(registry);
    numbers::install(registry);
    lists::install(registry);
    dates::install(registry);
}

/// Opening lines of every explanation
fn comparing(title: &str, actual: &Value, matcher: &dyn Matcher) -> Vec<String> {
    vec![
        format!("Comparing to {title} matcher:"),
        format!("{} != {matcher}", actual.short_repr()),
    ]
}

/// Standard type mismatch explanation
fn type_mismatch(actual: &Value, expected: &str) -> Vec<String> {
    vec![
        "Type mismatch:".to_string(),
        format!(
            "Type {} doesn't match to expected {expected} type.",
            actual.kind()
        ),
    ]
}

fn explain_with(
    title: &str,
    actual: &Value,
    matcher: &dyn Matcher,
    details: impl FnOnce() -> Vec<String>,
) -> Vec<String> {
    if matcher.matches(actual) {
        return Vec::new();
    }
    let mut lines = comparing(title, actual, matcher);
    lines.extend(details());
    lines
}
