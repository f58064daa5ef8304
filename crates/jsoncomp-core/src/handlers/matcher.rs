//! `!match` handler: matcher object leaf

use super::{call_arguments, HandlerContext, Resolution};
use crate::error::ComposeResult;
use crate::marker::Marker;
use jsoncomp_document::Value;

/// Resolve a `!match` marker
///
/// Every marker builds its own matcher; nothing is cached.
///
/// # Errors
/// - [`ComposeError::MalformedMarker`](crate::ComposeError::MalformedMarker)
///   for a non-string name or non-array `!args`
/// - [`ComposeError::Registry`](crate::ComposeError::Registry) for unknown
///   matchers and argument errors
pub fn resolve(marker: &Marker, ctx: &mut HandlerContext<'_>) -> ComposeResult<Resolution> {
    let name = marker.definition_str()?;
    let args = call_arguments(marker, name)?;
    let matcher = ctx
        .composer
        .matchers()
        .build(name, &args)?;
    Ok(Resolution::Resolved(Value::Matcher(matcher)))
}

#[cfg(test)]
mod tests {
    use crate::{Composer, ComposerConfig};
    use jsoncomp_document::Value;
    use serde_json::json;

    #[test]
    fn builds_matcher_leaves() {
        let out = Composer::new(ComposerConfig::new())
            .compose(Value::from(json!({
                "id": {"!match": "AnyNumberGreaterThan", "!args": [5]},
                "name": {"!match": "AnyText"},
                "fixed": "x"
            })))
            .unwrap();

        assert!(out.get("id").and_then(Value::as_matcher).is_some());
        assert!(out.matches(&Value::from(json!({"id": 9, "name": "Kate", "fixed": "x"}))));
        assert!(!out.matches(&Value::from(json!({"id": 1, "name": "Kate", "fixed": "x"}))));
    }

    #[test]
    fn keyword_arguments_are_passed() {
        let out = Composer::new(ComposerConfig::new())
            .compose(Value::from(json!({
                "n": {"!match": "AnyNumberInRange", "min_number": 1, "max_number": 3}
            })))
            .unwrap();
        assert!(out.matches(&Value::from(json!({"n": 2}))));
        assert!(!out.matches(&Value::from(json!({"n": 4}))));
    }

    #[test]
    fn unknown_matcher() {
        let err = Composer::new(ComposerConfig::new())
            .compose(Value::from(json!({"m": {"!match": "AnyColour"}})))
            .unwrap_err();
        assert!(err.is_unknown());
    }

    #[test]
    fn argument_errors_surface() {
        let err = Composer::new(ComposerConfig::new())
            .compose(Value::from(json!({"m": {"!match": "AnyText", "extra": 1}})))
            .unwrap_err();
        assert!(!err.is_unknown());
        assert!(!err.is_non_convergence());
    }
}
