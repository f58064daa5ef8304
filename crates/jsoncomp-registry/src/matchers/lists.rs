//! List matchers
//!
//! `item_type` parameters take a sample value; every element must have the
//! same [`ValueKind`] as the sample (`1` for integers, `""` for strings, ...).

use super::basic::unit;
use super::{explain_with, type_mismatch};
use crate::arguments::Arguments;
use crate::error::RegistryError;
use crate::matcher::MatcherRegistry;
use jsoncomp_document::{Matcher, MatcherRef, Value, ValueKind};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

pub(super) fn install(registry: &mut MatcherRegistry) {
    registry.register_or_replace("AnyList", unit::<AnyList>());
    registry.register_or_replace("AnyListOf", |args: &Arguments| {
        list_of(args, SizeRule::Exactly)
    });
    registry.register_or_replace("AnyListLongerThan", |args: &Arguments| {
        list_of(args, SizeRule::LongerThan)
    });
    registry.register_or_replace("AnyListShorterThan", |args: &Arguments| {
        list_of(args, SizeRule::ShorterThan)
    });
    registry.register_or_replace("AnyListOfRange", list_of_range);
    registry.register_or_replace("AnyListOfMatchers", |args: &Arguments| {
        list_of_matchers(args, SizeRule::Exactly)
    });
    registry.register_or_replace("AnyListOfMatchersLongerThan", |args: &Arguments| {
        list_of_matchers(args, SizeRule::LongerThan)
    });
    registry.register_or_replace("AnyListOfMatchersShorterThan", |args: &Arguments| {
        list_of_matchers(args, SizeRule::ShorterThan)
    });
}

fn list_of(args: &Arguments, rule: SizeRule) -> Result<MatcherRef, RegistryError> {
    args.ensure_known(&["size", "item_type"])?;
    let size = match rule {
        SizeRule::Exactly => args.opt_usize(0, "size")?,
        SizeRule::LongerThan | SizeRule::ShorterThan => Some(args.usize(0, "size")?),
    };
    let item_kind = args.opt_value(1, "item_type").map(ValueKind::of);
    Ok(Arc::new(AnyListOf {
        size,
        item_kind,
        rule,
    }))
}

fn list_of_range(args: &Arguments) -> Result<MatcherRef, RegistryError> {
    args.ensure_known(&["min_size", "max_size", "item_type"])?;
    let min_size = args.usize(0, "min_size")?;
    let max_size = args.usize(1, "max_size")?;
    let item_kind = args.opt_value(2, "item_type").map(ValueKind::of);
    let matcher = AnyListOfRange::new(min_size, max_size, item_kind).ok_or_else(|| {
        args.invalid(
            "min_size",
            format!("\"min_size\" must not exceed \"max_size\", but {min_size} > {max_size}"),
        )
    })?;
    Ok(Arc::new(matcher))
}

fn list_of_matchers(args: &Arguments, rule: SizeRule) -> Result<MatcherRef, RegistryError> {
    args.ensure_known(&["matcher", "size"])?;
    let matcher = args.value(0, "matcher")?.clone();
    let size = args.opt_usize(1, "size")?;
    Ok(Arc::new(AnyListOfMatchers {
        matcher,
        size,
        rule,
    }))
}

/// Comparison applied to the list length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    /// `len == size`
    Exactly,
    /// `len > size`
    LongerThan,
    /// `len < size`
    ShorterThan,
}

impl SizeRule {
    /// Check a length against a size
    #[must_use]
    pub fn check(self, len: usize, size: usize) -> bool {
        match self {
            Self::Exactly => len == size,
            Self::LongerThan => len > size,
            Self::ShorterThan => len < size,
        }
    }

    fn operator(self) -> &'static str {
        match self {
            Self::Exactly => "==",
            Self::LongerThan => ">",
            Self::ShorterThan => "<",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Exactly => "Of",
            Self::LongerThan => "Longer Than",
            Self::ShorterThan => "Shorter Than",
        }
    }
}

fn size_mismatch(rule: SizeRule, len: usize, size: Option<usize>) -> Vec<String> {
    match size {
        Some(size) if !rule.check(len, size) => vec![
            "Size mismatch:".to_string(),
            format!("{len} {} {size} is not true.", rule.operator()),
        ],
        _ => Vec::new(),
    }
}

fn kind_mismatch(items: &[Value], kind: Option<ValueKind>) -> Vec<String> {
    let Some(kind) = kind else {
        return Vec::new();
    };
    let wrong: Vec<String> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.kind() != kind)
        .map(|(idx, item)| {
            format!(
                "   {idx}) {} (of unexpected type \"{}\")",
                item.short_repr(),
                item.kind()
            )
        })
        .collect();
    if wrong.is_empty() {
        return wrong;
    }
    let mut lines = vec![
        "Element type mismatch:".to_string(),
        format!("Expected type of elements is \"{kind}\":"),
    ];
    lines.extend(wrong);
    lines
}

fn all_of_kind(items: &[Value], kind: Option<ValueKind>) -> bool {
    kind.map_or(true, |kind| items.iter().all(|item| item.kind() == kind))
}

/// Matches any array
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyList;

impl Display for AnyList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<Any List>")
    }
}

impl Matcher for AnyList {
    fn name(&self) -> &str {
        "AnyList"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_array().is_some()
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("List", actual, self, || type_mismatch(actual, "array"))
    }
}

/// Matches arrays by length rule and element kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyListOf {
    /// Size compared with the rule, any length when `None`
    pub size: Option<usize>,
    /// Required element kind
    pub item_kind: Option<ValueKind>,
    /// Length comparison
    pub rule: SizeRule,
}

impl Display for AnyListOf {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<Any List {}", self.rule.title())?;
        if let Some(size) = self.size {
            write!(f, " {size} item(s)")?;
            if self.item_kind.is_some() {
                f.write_str(" of")?;
            }
        }
        if let Some(kind) = self.item_kind {
            write!(f, " type \"{kind}\"")?;
        }
        f.write_str(">")
    }
}

impl Matcher for AnyListOf {
    fn name(&self) -> &str {
        match self.rule {
            SizeRule::Exactly => "AnyListOf",
            SizeRule::LongerThan => "AnyListLongerThan",
            SizeRule::ShorterThan => "AnyListShorterThan",
        }
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_array().is_some_and(|items| {
            self.size.map_or(true, |size| self.rule.check(items.len(), size))
                && all_of_kind(items, self.item_kind)
        })
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("List Of", actual, self, || match actual.as_array() {
            None => type_mismatch(actual, "array"),
            Some(items) => {
                let mut lines = size_mismatch(self.rule, items.len(), self.size);
                lines.extend(kind_mismatch(items, self.item_kind));
                lines
            }
        })
    }
}

/// Matches arrays whose length is within an inclusive range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyListOfRange {
    min_size: usize,
    max_size: usize,
    item_kind: Option<ValueKind>,
}

impl AnyListOfRange {
    /// Create matcher, `None` if `min_size > max_size`
    #[must_use]
    pub fn new(min_size: usize, max_size: usize, item_kind: Option<ValueKind>) -> Option<Self> {
        (min_size <= max_size).then_some(Self {
            min_size,
            max_size,
            item_kind,
        })
    }
}

impl Display for AnyListOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Any List Of Range of {} to {} items",
            self.min_size, self.max_size
        )?;
        if let Some(kind) = self.item_kind {
            write!(f, " of type \"{kind}\"")?;
        }
        f.write_str(">")
    }
}

impl Matcher for AnyListOfRange {
    fn name(&self) -> &str {
        "AnyListOfRange"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_array().is_some_and(|items| {
            (self.min_size..=self.max_size).contains(&items.len())
                && all_of_kind(items, self.item_kind)
        })
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("List Of Range", actual, self, || {
            let Some(items) = actual.as_array() else {
                return type_mismatch(actual, "array");
            };
            let len = items.len();
            let mut lines = Vec::new();
            if len < self.min_size {
                lines.push("Size mismatch:".to_string());
                lines.push(format!(
                    "Given list's size {len} is shorter than expected minimum of {} elements!",
                    self.min_size
                ));
            } else if len > self.max_size {
                lines.push("Size mismatch:".to_string());
                lines.push(format!(
                    "Given list's size {len} is longer than expected maximum of {} elements!",
                    self.max_size
                ));
            }
            lines.extend(kind_mismatch(items, self.item_kind));
            lines
        })
    }
}

/// Matches arrays whose every element matches a value or matcher
#[derive(Debug, Clone, PartialEq)]
pub struct AnyListOfMatchers {
    /// Expected element; may be a matcher leaf or a literal
    pub matcher: Value,
    /// Size compared with the rule, any length when `None`
    pub size: Option<usize>,
    /// Length comparison
    pub rule: SizeRule,
}

impl AnyListOfMatchers {
    fn element_repr(&self) -> String {
        match &self.matcher {
            Value::Matcher(m) => m.to_string(),
            other => other.to_string(),
        }
    }
}

impl Display for AnyListOfMatchers {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let count = self
            .size
            .map_or_else(|| "any number".to_string(), |s| s.to_string());
        let rule = match self.rule {
            SizeRule::Exactly => "",
            SizeRule::LongerThan => " longer than",
            SizeRule::ShorterThan => " shorter than",
        };
        write!(
            f,
            "<Any List Of Matchers ({}) of{rule} {count} item(s)>",
            self.element_repr()
        )
    }
}

impl Matcher for AnyListOfMatchers {
    fn name(&self) -> &str {
        match self.rule {
            SizeRule::Exactly => "AnyListOfMatchers",
            SizeRule::LongerThan => "AnyListOfMatchersLongerThan",
            SizeRule::ShorterThan => "AnyListOfMatchersShorterThan",
        }
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_array().is_some_and(|items| {
            self.size.map_or(true, |size| self.rule.check(items.len(), size))
                && items.iter().all(|item| self.matcher.matches(item))
        })
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("List Of Matchers", actual, self, || {
            let Some(items) = actual.as_array() else {
                return type_mismatch(actual, "array");
            };
            let mut lines = size_mismatch(self.rule, items.len(), self.size);
            let mut elements = vec![format!(
                "Elements that don't match to \"{}\":",
                self.element_repr()
            )];
            for (idx, item) in items.iter().enumerate() {
                if self.matcher.matches(item) {
                    continue;
                }
                elements.push(String::new());
                elements.push(format!("{idx}) {}", item.short_repr()));
                let reasons: Vec<String> = match &self.matcher {
                    Value::Matcher(m) => m.explain(item).into_iter().skip(2).collect(),
                    other => vec![format!("{} != {}", item.short_repr(), other.short_repr())],
                };
                elements.extend(reasons.into_iter().map(|r| format!("   {r}")));
            }
            if elements.len() > 1 {
                lines.extend(elements);
            }
            lines
        })
    }
}
