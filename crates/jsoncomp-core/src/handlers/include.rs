//! `!include` handler: file content, optionally composed on its own
//!
//! With `!compose: true` the content is resolved as an independent document
//! before it is spliced in. Its references see only its own nodes, its
//! `$defs` are removed, and its relative paths resolve against the included
//! file's directory. Generator identities are shared with the host session.

use super::{HandlerContext, Resolution};
use crate::error::{ComposeError, ComposeResult};
use crate::marker::{Marker, COMPOSE_KEY, FORMAT_KEY};
use jsoncomp_document::{Format, Value};
use std::path::Path;

/// Resolve an `!include` marker
///
/// # Errors
/// - [`ComposeError::MalformedMarker`] for a non-string path, non-boolean
///   `!compose` or non-string `!format`
/// - [`ComposeError::Load`] for unknown formats or unreadable files
/// - [`ComposeError::IncludeDepth`] when composed includes nest too deep
/// - any error of the nested composition
pub fn resolve(marker: &Marker, ctx: &mut HandlerContext<'_>) -> ComposeResult<Resolution> {
    let path = ctx.path(marker.definition_str()?);
    let compose = match marker.param(COMPOSE_KEY) {
        None => false,
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            return Err(marker.malformed(format!(
                "\"{COMPOSE_KEY}\" must be a boolean, got {}",
                other.kind()
            )));
        }
    };
    let format = match marker.param(FORMAT_KEY) {
        None => Format::from_extension(&path),
        Some(Value::String(name)) => Format::from_name(name)?,
        Some(other) => {
            return Err(marker.malformed(format!(
                "\"{FORMAT_KEY}\" must be a string, got {}",
                other.kind()
            )));
        }
    };

    let content = ctx.read(&path, format)?;
    if !compose {
        return Ok(Resolution::Resolved(content));
    }

    let depth = ctx.depth + 1;
    let limit = ctx.composer.config().max_include_depth;
    if depth > limit {
        return Err(ComposeError::IncludeDepth { path, limit });
    }
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    tracing::debug!(path = %path.display(), depth, "composing included file");
    let composed = ctx
        .composer
        .compose_nested(content, base_dir, depth, ctx.session, ctx.report)?;
    Ok(Resolution::Resolved(composed))
}

#[cfg(test)]
mod tests {
    use crate::{ComposeError, Composer, ComposerConfig};
    use jsoncomp_document::Value;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;

    fn composer(dir: &std::path::Path) -> Composer {
        Composer::new(ComposerConfig::new().with_base_dir(dir).with_seed(3))
    }

    #[test]
    fn verbatim_include_keeps_markers_live() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("part.json"), r#"{"v": {"!ref": "/$defs/v"}}"#).unwrap();

        let out = composer(dir.path())
            .compose(Value::from(json!({
                "$defs": {"v": "host"},
                "p": {"!include": "part.json"}
            })))
            .unwrap();
        assert_eq!(out, Value::from(json!({"p": {"v": "host"}})));
    }

    #[test]
    fn composed_include_has_own_scope() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("part.json"),
            r#"{"$defs": {"v": "inner"}, "v": {"!ref": "/$defs/v"}}"#,
        )
        .unwrap();

        let out = composer(dir.path())
            .compose(Value::from(json!({
                "$defs": {"v": "host"},
                "p": {"!include": "part.json", "!compose": true}
            })))
            .unwrap();
        assert_eq!(out, Value::from(json!({"p": {"v": "inner"}})));
    }

    #[test]
    fn composed_include_cannot_reach_host() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("part.json"), r#"{"v": {"!ref": "/host"}}"#).unwrap();

        let err = composer(dir.path())
            .compose(Value::from(json!({
                "host": 1,
                "p": {"!include": "part.json", "!compose": true}
            })))
            .unwrap_err();
        assert!(err.is_non_convergence());
        assert_eq!(err.unresolved()[0].pointer.to_string(), "/v");
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.json"), "[1, 2]").unwrap();
        fs::write(dir.path().join("data.cfg"), "a: 1\n").unwrap();

        let out = composer(dir.path())
            .compose(Value::from(json!({
                "raw": {"!include": "data.json", "!format": "text"},
                "parsed": {"!include": "data.cfg", "!format": "yaml"},
                "plain": {"!include": "data.cfg"}
            })))
            .unwrap();
        assert_eq!(
            out,
            Value::from(json!({"raw": "[1, 2]", "parsed": {"a": 1}, "plain": "a: 1\n"}))
        );
    }

    #[test]
    fn invalid_parameters() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.json"), "1").unwrap();
        let composer = composer(dir.path());

        let err = composer
            .compose(Value::from(json!({"a": {"!include": "x.json", "!compose": "yes"}})))
            .unwrap_err();
        assert!(matches!(err, ComposeError::MalformedMarker { .. }));

        let err = composer
            .compose(Value::from(json!({"a": {"!include": "x.json", "!format": "xml"}})))
            .unwrap_err();
        assert!(matches!(err.root_cause(), ComposeError::Load(_)));
    }

    #[test]
    fn self_include_hits_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("loop.json"),
            r#"{"next": {"!include": "loop.json", "!compose": true}}"#,
        )
        .unwrap();

        let composer = Composer::new(
            ComposerConfig::new()
                .with_base_dir(dir.path())
                .with_max_include_depth(3),
        );
        let err = composer
            .compose(Value::from(json!({"!include": "loop.json", "!compose": true})))
            .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            ComposeError::IncludeDepth { limit: 3, .. }
        ));
    }
}
