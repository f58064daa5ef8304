//! Number matchers
//!
//! Bounds keep the number exactly as given so that `5` renders as `5` and
//! `5.0` as `5.0`; comparisons are done on `f64`.

use super::basic::unit;
use super::{explain_with, type_mismatch};
use crate::arguments::Arguments;
use crate::error::RegistryError;
use crate::matcher::MatcherRegistry;
use jsoncomp_document::{Matcher, MatcherRef, Value};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

const NUMBER_TYPE: &str = "integer or float";

pub(super) fn install(registry: &mut MatcherRegistry) {
    registry.register_or_replace("AnyNumber", unit::<AnyNumber>());
    registry.register_or_replace(
        "AnyNumberGreaterThan",
        |args: &Arguments| -> Result<MatcherRef, RegistryError> {
            args.ensure_known(&["number"])?;
            let matcher: MatcherRef = Arc::new(AnyNumberGreaterThan(bound(args, 0, "number")?));
            Ok(matcher)
        },
    );
    registry.register_or_replace(
        "AnyNumberLessThan",
        |args: &Arguments| -> Result<MatcherRef, RegistryError> {
            args.ensure_known(&["number"])?;
            let matcher: MatcherRef = Arc::new(AnyNumberLessThan(bound(args, 0, "number")?));
            Ok(matcher)
        },
    );
    registry.register_or_replace("AnyNumberInRange", any_number_in_range);
}

fn any_number_in_range(args: &Arguments) -> Result<MatcherRef, RegistryError> {
    args.ensure_known(&["min_number", "max_number"])?;
    let min = bound(args, 0, "min_number")?;
    let max = bound(args, 1, "max_number")?;
    let matcher = AnyNumberInRange::new(min, max).ok_or_else(|| {
        args.invalid(
            "min_number",
            "\"min_number\" must be less than \"max_number\"",
        )
    })?;
    Ok(Arc::new(matcher))
}

fn bound(args: &Arguments, index: usize, name: &str) -> Result<Bound, RegistryError> {
    match args.value(index, name)? {
        Value::Number(n) => n
            .as_f64()
            .map(|value| Bound {
                value,
                text: n.to_string(),
            })
            .ok_or_else(|| args.invalid(name, "number is not representable")),
        other => Err(args.invalid(
            name,
            format!("expected number, got {}", other.kind()),
        )),
    }
}

/// Numeric bound with its original rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    value: f64,
    text: String,
}

impl Bound {
    /// Numeric value
    #[inline]
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl From<i64> for Bound {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self {
            value: n as f64,
            text: n.to_string(),
        }
    }
}

impl From<i32> for Bound {
    fn from(n: i32) -> Self {
        Self {
            value: f64::from(n),
            text: n.to_string(),
        }
    }
}

impl From<f64> for Bound {
    fn from(n: f64) -> Self {
        Self {
            value: n,
            text: serde_json_like(n),
        }
    }
}

/// Render a float the way JSON numbers print (`5.0`, `0.25`)
fn serde_json_like(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{n:.1}")
    } else {
        n.to_string()
    }
}

impl Display for Bound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Matches any number
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyNumber;

impl Display for AnyNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<Any Number>")
    }
}

impl Matcher for AnyNumber {
    fn name(&self) -> &str {
        "AnyNumber"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_f64().is_some()
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Number", actual, self, || type_mismatch(actual, NUMBER_TYPE))
    }
}

/// Matches numbers strictly greater than the bound
#[derive(Debug, Clone, PartialEq)]
pub struct AnyNumberGreaterThan(pub Bound);

impl Display for AnyNumberGreaterThan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<Any Number Greater Than ({})>", self.0)
    }
}

impl Matcher for AnyNumberGreaterThan {
    fn name(&self) -> &str {
        "AnyNumberGreaterThan"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_f64().is_some_and(|n| n > self.0.value)
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Number Greater Than", actual, self, || {
            if actual.as_f64().is_some() {
                vec![
                    "Number is less than expected:".to_string(),
                    format!("{actual} <= {}", self.0),
                ]
            } else {
                type_mismatch(actual, NUMBER_TYPE)
            }
        })
    }
}

/// Matches numbers strictly less than the bound
#[derive(Debug, Clone, PartialEq)]
pub struct AnyNumberLessThan(pub Bound);

impl Display for AnyNumberLessThan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<Any Number Less Than ({})>", self.0)
    }
}

impl Matcher for AnyNumberLessThan {
    fn name(&self) -> &str {
        "AnyNumberLessThan"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual.as_f64().is_some_and(|n| n < self.0.value)
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Number Less Than", actual, self, || {
            if actual.as_f64().is_some() {
                vec![
                    "Number is greater than expected:".to_string(),
                    format!("{actual} >= {}", self.0),
                ]
            } else {
                type_mismatch(actual, NUMBER_TYPE)
            }
        })
    }
}

/// Matches numbers within an inclusive range
#[derive(Debug, Clone, PartialEq)]
pub struct AnyNumberInRange {
    min: Bound,
    max: Bound,
}

impl AnyNumberInRange {
    /// Create matcher, `None` if `min > max`
    #[must_use]
    pub fn new(min: impl Into<Bound>, max: impl Into<Bound>) -> Option<Self> {
        let (min, max) = (min.into(), max.into());
        (min.value <= max.value).then_some(Self { min, max })
    }
}

impl Display for AnyNumberInRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Any Number In Range from {} to {}>",
            self.min, self.max
        )
    }
}

impl Matcher for AnyNumberInRange {
    fn name(&self) -> &str {
        "AnyNumberInRange"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual
            .as_f64()
            .is_some_and(|n| self.min.value <= n && n <= self.max.value)
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Number In Range", actual, self, || match actual.as_f64() {
            None => type_mismatch(actual, NUMBER_TYPE),
            Some(n) if n > self.max.value => vec![
                "Value is out of range:".to_string(),
                format!("{actual} is greater than {} (right limit)", self.max),
            ],
            Some(_) => vec![
                "Value is out of range:".to_string(),
                format!("{actual} is less than {} (left limit)", self.min),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_number() {
        assert!(AnyNumber.matches(&Value::from(1)));
        assert!(AnyNumber.matches(&Value::from(1.5)));
        assert!(!AnyNumber.matches(&Value::from("1")));
        assert!(!AnyNumber.matches(&Value::from(true)));
    }

    #[test]
    fn greater_and_less() {
        let gt = AnyNumberGreaterThan(Bound::from(5));
        assert!(gt.matches(&Value::from(5.5)));
        assert!(!gt.matches(&Value::from(5)));
        assert_eq!(gt.to_string(), "<Any Number Greater Than (5)>");

        let lt = AnyNumberLessThan(Bound::from(0.5));
        assert!(lt.matches(&Value::from(0)));
        assert!(!lt.matches(&Value::from(1)));
        assert_eq!(lt.to_string(), "<Any Number Less Than (0.5)>");
    }

    #[test]
    fn greater_than_explain() {
        let gt = AnyNumberGreaterThan(Bound::from(5));
        let lines = gt.explain(&Value::from(3));
        assert_eq!(
            lines,
            vec![
                "Comparing to Number Greater Than matcher:".to_string(),
                "3 != <Any Number Greater Than (5)>".to_string(),
                "Number is less than expected:".to_string(),
                "3 <= 5".to_string(),
            ]
        );
    }

    #[test]
    fn in_range() {
        let m = AnyNumberInRange::new(1, 3).unwrap();
        assert!(m.matches(&Value::from(1)));
        assert!(m.matches(&Value::from(3)));
        assert!(!m.matches(&Value::from(3.01)));
        assert_eq!(m.to_string(), "<Any Number In Range from 1 to 3>");
        assert!(m.explain(&Value::from(7))[3].contains("right limit"));
        assert!(m.explain(&Value::from(-7))[3].contains("left limit"));
        assert!(AnyNumberInRange::new(3, 1).is_none());
    }

    #[test]
    fn in_range_factory() {
        let args = Arguments::new("AnyNumberInRange")
            .with_positional(vec![Value::from(10), Value::from(2)]);
        assert!(matches!(
            any_number_in_range(&args),
            Err(RegistryError::InvalidArgument { .. })
        ));

        let args = Arguments::new("AnyNumberInRange")
            .with_arg("min_number", 1.5)
            .with_arg("max_number", 2);
        let m = any_number_in_range(&args).unwrap();
        assert_eq!(m.to_string(), "<Any Number In Range from 1.5 to 2>");
    }

    #[test]
    fn float_bound_rendering() {
        assert_eq!(Bound::from(5.0).to_string(), "5.0");
        assert_eq!(Bound::from(0.25).to_string(), "0.25");
    }
}
