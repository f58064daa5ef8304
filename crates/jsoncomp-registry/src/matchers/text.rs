//! String matchers

use super::basic::unit;
use super::{explain_with, type_mismatch};
use crate::arguments::Arguments;
use crate::error::RegistryError;
use crate::matcher::MatcherRegistry;
use jsoncomp_document::{Matcher, MatcherRef, Value};
use regex::{Regex, RegexBuilder};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

pub(super) fn install(registry: &mut MatcherRegistry) {
    registry.register_or_replace("AnyText", unit::<AnyText>());
    registry.register_or_replace("AnyTextLike", any_text_like);
    registry.register_or_replace("AnyTextWith", any_text_with);
}

fn any_text_like(args: &Arguments) -> Result<MatcherRef, RegistryError> {
    args.ensure_known(&["pattern", "case_sensitive"])?;
    let pattern = args.str(0, "pattern")?;
    let case_sensitive = args.opt_bool(1, "case_sensitive")?.unwrap_or(false);
    let matcher = AnyTextLike::new(pattern, case_sensitive)
        .map_err(|e| args.invalid("pattern", e.to_string()))?;
    Ok(Arc::new(matcher))
}

fn any_text_with(args: &Arguments) -> Result<MatcherRef, RegistryError> {
    args.ensure_known(&["substring", "case_sensitive"])?;
    let substring = args.str(0, "substring")?;
    let case_sensitive = args.opt_bool(1, "case_sensitive")?.unwrap_or(false);
    Ok(Arc::new(AnyTextWith::new(substring, case_sensitive)))
}

/// Matches any string, including the empty one
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyText;

impl Display for AnyText {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<Any Text>")
    }
}

impl Matcher for AnyText {
    fn name(&self) -> &str {
        "AnyText"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_str().is_some()
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Text", actual, self, || type_mismatch(actual, "string"))
    }
}

/// Matches strings whose beginning matches a regular expression
#[derive(Debug, Clone)]
pub struct AnyTextLike {
    pattern: String,
    case_sensitive: bool,
    regex: Regex,
}

impl AnyTextLike {
    /// Compile matcher; the pattern is anchored at the start of the text
    ///
    /// # Errors
    /// Returns [`regex::Error`] for an invalid pattern
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:{pattern})"))
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            case_sensitive,
            regex,
        })
    }

    fn sensitivity(&self) -> &'static str {
        if self.case_sensitive {
            "sensitive"
        } else {
            "insensitive"
        }
    }
}

impl Display for AnyTextLike {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Any Text Like \"{}\", case {}>",
            self.pattern,
            self.sensitivity()
        )
    }
}

impl Matcher for AnyTextLike {
    fn name(&self) -> &str {
        "AnyTextLike"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_str().is_some_and(|s| self.regex.is_match(s))
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Text Like", actual, self, || match actual.as_str() {
            None => type_mismatch(actual, "string"),
            Some(_) => vec![
                "Pattern mismatch:".to_string(),
                format!(
                    "{} doesn't match case {} pattern \"{}\"",
                    actual.short_repr(),
                    self.sensitivity(),
                    self.pattern
                ),
            ],
        })
    }
}

/// Matches strings containing a substring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyTextWith {
    substring: String,
    case_sensitive: bool,
}

impl AnyTextWith {
    /// Create matcher
    #[must_use]
    pub fn new(substring: &str, case_sensitive: bool) -> Self {
        Self {
            substring: substring.to_string(),
            case_sensitive,
        }
    }
}

impl Display for AnyTextWith {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<Any Text With \"{}\">", self.substring)
    }
}

impl Matcher for AnyTextWith {
    fn name(&self) -> &str {
        "AnyTextWith"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_str().is_some_and(|s| {
            if self.case_sensitive {
                s.contains(&self.substring)
            } else {
                s.to_lowercase().contains(&self.substring.to_lowercase())
            }
        })
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Text Contains", actual, self, || match actual.as_str() {
            None => type_mismatch(actual, "string"),
            Some(_) => vec![
                "Content mismatch:".to_string(),
                format!(
                    "{} doesn't contain case {} substring \"{}\"",
                    actual.short_repr(),
                    if self.case_sensitive {
                        "sensitive"
                    } else {
                        "insensitive"
                    },
                    self.substring
                ),
            ],
        })
    }
}
