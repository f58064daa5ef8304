//! Date matchers
//!
//! Actual values are ISO 8601 / RFC 3339 strings. Values without an offset
//! are taken as UTC. Limits are given as
//!
//! - a date string in the same formats,
//! - `now`,
//! - an offset from now: `+2d`, `-1.5h`, `+30m` (units `y w d h m s ms us`,
//!   a year being 365 days).
//!
//! Relative limits are evaluated at comparison time.

use super::basic::unit;
use super::{explain_with, type_mismatch};
use crate::arguments::Arguments;
use crate::error::RegistryError;
use crate::matcher::MatcherRegistry;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use jsoncomp_document::{Matcher, MatcherRef, Value};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

pub(super) fn install(registry: &mut MatcherRegistry) {
    registry.register_or_replace("AnyDate", unit::<AnyDate>());
    registry.register_or_replace(
        "AnyDateBefore",
        |args: &Arguments| -> Result<MatcherRef, RegistryError> {
            args.ensure_known(&["date"])?;
            let matcher: MatcherRef = Arc::new(AnyDateBefore(limit(args, 0, "date")?));
            Ok(matcher)
        },
    );
    registry.register_or_replace(
        "AnyDateAfter",
        |args: &Arguments| -> Result<MatcherRef, RegistryError> {
            args.ensure_known(&["date"])?;
            let matcher: MatcherRef = Arc::new(AnyDateAfter(limit(args, 0, "date")?));
            Ok(matcher)
        },
    );
    registry.register_or_replace("AnyDateInRange", any_date_in_range);
}

fn limit(args: &Arguments, index: usize, name: &str) -> Result<DateSpec, RegistryError> {
    let text = args.opt_str(index, name)?.unwrap_or("now");
    DateSpec::parse(text).ok_or_else(|| {
        args.invalid(
            name,
            format!("\"{text}\" is neither a date, \"now\" nor an offset like \"+2d\""),
        )
    })
}

fn any_date_in_range(args: &Arguments) -> Result<MatcherRef, RegistryError> {
    args.ensure_known(&["date_from", "date_to"])?;
    args.str(0, "date_from")?;
    args.str(1, "date_to")?;
    let from = limit(args, 0, "date_from")?;
    let to = limit(args, 1, "date_to")?;
    let matcher = AnyDateInRange::new(from, to).ok_or_else(|| {
        args.invalid(
            "date_from",
            "\"date_from\" must not be later than \"date_to\"",
        )
    })?;
    Ok(Arc::new(matcher))
}

/// Parse an ISO 8601 / RFC 3339 date, naive values taken as UTC
#[must_use]
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Parse an offset expression such as `+2d` or `-1.5h`
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn parse_offset(text: &str) -> Option<Duration> {
    let sign = match text.as_bytes().first()? {
        b'+' => 1.0,
        b'-' => -1.0,
        _ => return None,
    };
    let rest = &text[1..];
    let split = rest.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let (amount, unit) = rest.split_at(split);
    if !amount.starts_with(|c: char| c.is_ascii_digit()) || amount.matches('.').count() > 1 {
        return None;
    }
    let amount: f64 = amount.trim_end_matches('.').parse().ok()?;
    let micros_per_unit = match unit {
        "y" => 365.0 * 86_400e6,
        "w" => 7.0 * 86_400e6,
        "d" => 86_400e6,
        "h" => 3_600e6,
        "m" => 60e6,
        "s" => 1e6,
        "ms" => 1e3,
        "us" => 1.0,
        _ => return None,
    };
    let micros = (sign * amount * micros_per_unit).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::microseconds(micros as i64))
}

/// Limit of a date comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSpec {
    /// Current time
    Now,
    /// Current time shifted by an offset
    Offset {
        /// Expression as written
        text: String,
        /// Parsed shift
        delta: Duration,
    },
    /// Fixed point in time
    Fixed(DateTime<Utc>),
}

impl DateSpec {
    /// Parse `now`, an offset expression or a date
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text == "now" {
            return Some(Self::Now);
        }
        if let Some(delta) = parse_offset(text) {
            // offsets beyond the representable range are rejected up front
            Utc::now().checked_add_signed(delta)?;
            return Some(Self::Offset {
                text: text.to_string(),
                delta,
            });
        }
        parse_datetime(text).map(Self::Fixed)
    }

    /// Resolve against the given current time
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Now => Some(now),
            Self::Offset { delta, .. } => now.checked_add_signed(*delta),
            Self::Fixed(dt) => Some(*dt),
        }
    }

    /// Check whether the limit moves with the current time
    #[inline]
    #[must_use]
    pub fn is_relative(&self) -> bool {
        !matches!(self, Self::Fixed(_))
    }
}

impl Display for DateSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => f.write_str("now"),
            Self::Offset { text, .. } => f.write_str(text),
            Self::Fixed(dt) => f.write_str(&dt.to_rfc3339()),
        }
    }
}

fn actual_date(actual: &Value) -> Option<DateTime<Utc>> {
    actual.as_str().and_then(parse_datetime)
}

fn describe_gap(delta: Duration) -> String {
    let total = delta.num_seconds().abs();
    let (days, rem) = (total / 86_400, total % 86_400);
    let (hours, minutes, seconds) = (rem / 3_600, rem % 3_600 / 60, rem % 60);
    if days > 0 {
        format!("{days} day(s), {hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}")
    }
}

fn not_a_date(actual: &Value) -> Vec<String> {
    if actual.as_str().is_some() {
        vec![
            "Format mismatch:".to_string(),
            format!(
                "{} is not an ISO formatted date.",
                actual.short_repr()
            ),
        ]
    } else {
        type_mismatch(actual, "string")
    }
}

/// Matches any parseable date string
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyDate;

impl Display for AnyDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<Any Date>")
    }
}

impl Matcher for AnyDate {
    fn name(&self) -> &str {
        "AnyDate"
    }

    fn matches(&self, actual: &Value) -> bool {
        actual_date(actual).is_some()
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Any Date", actual, self, || not_a_date(actual))
    }
}

/// Matches dates strictly before the limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyDateBefore(pub DateSpec);

impl Display for AnyDateBefore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<Any Date Before {}>", self.0)
    }
}

impl Matcher for AnyDateBefore {
    fn name(&self) -> &str {
        "AnyDateBefore"
    }

    fn matches(&self, actual: &Value) -> bool {
        match (actual_date(actual), self.0.resolve(Utc::now())) {
            (Some(date), Some(limit)) => date < limit,
            _ => false,
        }
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Date Before", actual, self, || {
            match (actual_date(actual), self.0.resolve(Utc::now())) {
                (Some(date), Some(limit)) => vec![
                    "Date mismatch:".to_string(),
                    format!(
                        "{} is <{}> later than {}",
                        date.to_rfc3339(),
                        describe_gap(date - limit),
                        limit.to_rfc3339()
                    ),
                ],
                _ => not_a_date(actual),
            }
        })
    }
}

/// Matches dates strictly after the limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyDateAfter(pub DateSpec);

impl Display for AnyDateAfter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<Any Date After {}>", self.0)
    }
}

impl Matcher for AnyDateAfter {
    fn name(&self) -> &str {
        "AnyDateAfter"
    }

    fn matches(&self, actual: &Value) -> bool {
        match (actual_date(actual), self.0.resolve(Utc::now())) {
            (Some(date), Some(limit)) => date > limit,
            _ => false,
        }
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Date After", actual, self, || {
            match (actual_date(actual), self.0.resolve(Utc::now())) {
                (Some(date), Some(limit)) => vec![
                    "Date mismatch:".to_string(),
                    format!(
                        "{} is <{}> earlier than {}",
                        date.to_rfc3339(),
                        describe_gap(limit - date),
                        limit.to_rfc3339()
                    ),
                ],
                _ => not_a_date(actual),
            }
        })
    }
}

/// Matches dates within an inclusive period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyDateInRange {
    from: DateSpec,
    to: DateSpec,
}

impl AnyDateInRange {
    /// Create matcher, `None` if `from` resolves later than `to`
    #[must_use]
    pub fn new(from: DateSpec, to: DateSpec) -> Option<Self> {
        let now = Utc::now();
        let ordered = from.resolve(now)? <= to.resolve(now)?;
        ordered.then_some(Self { from, to })
    }
}

impl Display for AnyDateInRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Any Date In Range between {} and {}>",
            self.from, self.to
        )
    }
}

impl Matcher for AnyDateInRange {
    fn name(&self) -> &str {
        "AnyDateInRange"
    }

    fn matches(&self, actual: &Value) -> bool {
        let now = Utc::now();
        match (
            actual_date(actual),
            self.from.resolve(now),
            self.to.resolve(now),
        ) {
            (Some(date), Some(from), Some(to)) => from <= date && date <= to,
            _ => false,
        }
    }

    fn explain(&self, actual: &Value) -> Vec<String> {
        explain_with("Date In Range", actual, self, || {
            let now = Utc::now();
            match (
                actual_date(actual),
                self.from.resolve(now),
                self.to.resolve(now),
            ) {
                (Some(date), Some(from), Some(_)) if date < from => vec![
                    "Date mismatch:".to_string(),
                    format!(
                        "{} (UTC) is <{}> earlier than {} (UTC, left limit)",
                        date.to_rfc3339(),
                        describe_gap(from - date),
                        from.to_rfc3339()
                    ),
                ],
                (Some(date), Some(_), Some(to)) => vec![
                    "Date mismatch:".to_string(),
                    format!(
                        "{} (UTC) is <{}> later than {} (UTC, right limit)",
                        date.to_rfc3339(),
                        describe_gap(date - to),
                        to.to_rfc3339()
                    ),
                ],
                _ => not_a_date(actual),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn iso(dt: DateTime<Utc>) -> Value {
        Value::from(dt.to_rfc3339())
    }

    #[test]
    fn parse_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_datetime("2024-03-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T10:30:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01 10:30:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T10:30"), Some(expected));
        assert_eq!(
            parse_datetime("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn parse_offsets() {
        assert_eq!(parse_offset("+2d"), Some(Duration::days(2)));
        assert_eq!(parse_offset("-1.5h"), Some(Duration::minutes(-90)));
        assert_eq!(parse_offset("+10ms"), Some(Duration::milliseconds(10)));
        assert_eq!(parse_offset("+1y"), Some(Duration::days(365)));
        assert_eq!(parse_offset("+1m"), Some(Duration::minutes(1)));
        assert!(parse_offset("2d").is_none());
        assert!(parse_offset("+d").is_none());
        assert!(parse_offset("+2x").is_none());
        assert!(parse_offset("+1.2.3s").is_none());
    }

    #[test]
    fn date_spec_display() {
        assert_eq!(DateSpec::parse("now").unwrap().to_string(), "now");
        assert_eq!(DateSpec::parse("+2d").unwrap().to_string(), "+2d");
        assert_eq!(
            DateSpec::parse("2024-03-01T12:30:00+02:00").unwrap().to_string(),
            "2024-03-01T10:30:00+00:00"
        );
        assert!(DateSpec::parse("+99999999999y").is_none());
    }

    #[test]
    fn any_date() {
        assert!(AnyDate.matches(&Value::from("2024-01-01")));
        assert!(!AnyDate.matches(&Value::from("01/01/2024")));
        assert!(!AnyDate.matches(&Value::from(20_240_101)));
    }

    #[test]
    fn before_and_after_now() {
        let past = iso(Utc::now() - Duration::hours(1));
        let future = iso(Utc::now() + Duration::hours(1));

        let before = AnyDateBefore(DateSpec::Now);
        assert!(before.matches(&past));
        assert!(!before.matches(&future));

        let after = AnyDateAfter(DateSpec::parse("-2h").unwrap());
        assert!(after.matches(&past));
        assert!(after.matches(&future));
        assert!(!after.matches(&iso(Utc::now() - Duration::hours(3))));
    }

    #[test]
    fn before_explain() {
        let before = AnyDateBefore(DateSpec::parse("2024-01-01").unwrap());
        let lines = before.explain(&Value::from("2024-01-02T01:00:00Z"));
        assert_eq!(lines[2], "Date mismatch:");
        assert!(lines[3].contains("<1 day(s), 1:00:00> later than"));
    }

    #[test]
    fn in_range() {
        let m = AnyDateInRange::new(
            DateSpec::parse("2024-01-01").unwrap(),
            DateSpec::parse("2024-12-31").unwrap(),
        )
        .unwrap();
        assert!(m.matches(&Value::from("2024-06-01T00:00:00Z")));
        assert!(m.matches(&Value::from("2024-01-01")));
        assert!(!m.matches(&Value::from("2025-01-01")));
        assert!(m.explain(&Value::from("2023-12-31"))[3].contains("left limit"));

        assert!(AnyDateInRange::new(
            DateSpec::parse("+1d").unwrap(),
            DateSpec::parse("-1d").unwrap()
        )
        .is_none());
    }

    #[test]
    fn factories_validate_limits() {
        let mut registry = MatcherRegistry::new();
        install(&mut registry);

        let ok = registry.build("AnyDateBefore", &Arguments::new("AnyDateBefore"));
        assert_eq!(ok.unwrap().to_string(), "<Any Date Before now>");

        let bad = registry.build(
            "AnyDateAfter",
            &Arguments::new("AnyDateAfter").with_arg("date", "tomorrow"),
        );
        assert!(matches!(bad, Err(RegistryError::InvalidArgument { .. })));

        let missing = registry.build(
            "AnyDateInRange",
            &Arguments::new("AnyDateInRange").with_arg("date_from", "now"),
        );
        assert!(matches!(missing, Err(RegistryError::MissingArgument { .. })));
    }
}
