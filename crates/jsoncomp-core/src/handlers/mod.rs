//! Composition handlers
//!
//! One handler per [`MarkerKind`], dispatched by [`resolve`]. A handler reads
//! its marker and the current document and either produces the replacement
//! value or defers until a later pass.
//!
//! # Deferral
//!
//! - reference handlers defer while the target is missing, sits inside an
//!   unresolved marker or still contains one;
//! - `!xref` also defers on unmet `ifPresent` / `ifMissing` conditions;
//! - every handler defers while a field it reads contains a marker.

pub mod file;
pub mod generate;
pub mod include;
pub mod matcher;
pub mod reference;
pub mod xref;

use crate::composer::{ComposeReport, Composer};
use crate::config::resolve_path;
use crate::error::{ComposeError, ComposeResult};
use crate::marker::{node_kind, subtree_has_marker, Marker, MarkerKind, ARGS_KEY};
use jsoncomp_document::{Document, Format, Pointer, Value};
use jsoncomp_registry::{Arguments, GenerationSession};
use std::path::{Path, PathBuf};

/// Outcome of one handler attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Replacement value for the marker node
    Resolved(Value),
    /// Not resolvable yet, with the reason
    Deferred(String),
}

impl Resolution {
    /// Create deferral
    #[inline]
    pub fn deferred(reason: impl Into<String>) -> Self {
        Self::Deferred(reason.into())
    }

    /// Check for a resolved value
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Everything a handler may read or use while resolving one marker
pub struct HandlerContext<'a> {
    pub(crate) composer: &'a Composer,
    pub(crate) document: &'a Document,
    pub(crate) base_dir: &'a Path,
    pub(crate) depth: usize,
    pub(crate) session: &'a mut GenerationSession,
    pub(crate) report: &'a mut ComposeReport,
}

impl HandlerContext<'_> {
    /// Document being composed
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        self.document
    }

    /// Directory relative paths resolve against
    #[inline]
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.base_dir
    }

    /// Absolute path for a marker path value
    #[must_use]
    pub fn path(&self, raw: &str) -> PathBuf {
        resolve_path(self.base_dir, raw)
    }

    /// Read a file through the composer's cache when enabled
    ///
    /// # Errors
    /// Returns [`ComposeError::Load`] if the file cannot be read or parsed
    pub fn read(&mut self, path: &Path, format: Format) -> ComposeResult<Value> {
        match self.composer.file_cache() {
            Some(cache) => {
                let (value, hit) = cache.get_or_load(path, format)?;
                if hit {
                    self.report.file_cache_hits += 1;
                }
                Ok(value)
            }
            None => Ok(jsoncomp_document::loader::read_file(path, format)?),
        }
    }

    /// Look up a reference target
    ///
    /// # Errors
    /// Returns terminal document errors (e.g. index out of range); a missing
    /// or unresolved target is reported as [`Target::Pending`]
    pub fn target(&self, pointer: &Pointer) -> ComposeResult<Target> {
        let ids = match self.document.path_ids(pointer).map_err(ComposeError::from) {
            Ok(ids) => ids,
            Err(e) if e.is_transient() => {
                return Ok(Target::Pending(format!("\"{pointer}\" does not exist yet")));
            }
            Err(e) => return Err(e),
        };
        if ids.iter().any(|id| node_kind(self.document, *id).is_some()) {
            return Ok(Target::Pending(format!("\"{pointer}\" is not resolved yet")));
        }
        let Some(&id) = ids.last() else {
            return Ok(Target::Pending(format!("\"{pointer}\" does not exist yet")));
        };
        if subtree_has_marker(self.document, id) {
            return Ok(Target::Pending(format!(
                "\"{pointer}\" contains unresolved markers"
            )));
        }
        match self.document.value_of(id) {
            Some(value) => Ok(Target::Ready(value)),
            None => Ok(Target::Pending(format!("\"{pointer}\" does not exist yet"))),
        }
    }
}

/// Reference target state
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Marker-free deep copy of the target
    Ready(Value),
    /// Target cannot be copied yet
    Pending(String),
}

/// Resolve one marker with the handler for its kind
///
/// # Errors
/// Returns terminal errors raised by the handler
pub fn resolve(marker: &Marker, ctx: &mut HandlerContext<'_>) -> ComposeResult<Resolution> {
    if marker.has_pending_params() {
        return Ok(Resolution::deferred("parameters contain unresolved markers"));
    }
    match marker.kind() {
        MarkerKind::Ref => reference::resolve(marker, ctx),
        MarkerKind::XRef => xref::resolve(marker, ctx),
        MarkerKind::File => file::resolve(marker, ctx),
        MarkerKind::Include => include::resolve(marker, ctx),
        MarkerKind::Gen => generate::resolve(marker, ctx),
        MarkerKind::Match => matcher::resolve(marker, ctx),
    }
}

/// Parse the absolute target pointer of a reference marker
fn target_pointer(marker: &Marker) -> ComposeResult<Pointer> {
    let raw = marker.definition_str()?;
    let pointer = Pointer::parse(raw).map_err(|e| marker.malformed(e.to_string()))?;
    if pointer.is_root() {
        return Err(marker.malformed("referencing the document root is not allowed"));
    }
    Ok(pointer)
}

/// Build call arguments from `!args` and keyword fields
fn call_arguments(marker: &Marker, callee: &str) -> ComposeResult<Arguments> {
    let positional = match marker.param(ARGS_KEY) {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(marker.malformed(format!(
                "\"{ARGS_KEY}\" must be an array, got {}",
                other.kind()
            )));
        }
    };
    Ok(Arguments::new(callee)
        .with_positional(positional)
        .with_keyword(marker.keyword_args()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn target_of(source: serde_json::Value, pointer: &str) -> ComposeResult<Target> {
        let composer = Composer::default();
        let document = Document::from(source);
        let mut session = GenerationSession::seeded(1);
        let mut report = ComposeReport::default();
        let ctx = HandlerContext {
            composer: &composer,
            document: &document,
            base_dir: Path::new("."),
            depth: 0,
            session: &mut session,
            report: &mut report,
        };
        ctx.target(&Pointer::parse(pointer).unwrap())
    }

    #[test]
    fn ready_target_is_copied() {
        let target = target_of(json!({"a": {"b": [1]}}), "/a/b").unwrap();
        assert_eq!(target, Target::Ready(Value::from(json!([1]))));
    }

    #[test]
    fn missing_target_is_pending() {
        let target = target_of(json!({"a": {}}), "/a/b/c").unwrap();
        assert_eq!(
            target,
            Target::Pending("\"/a/b/c\" does not exist yet".into())
        );
    }

    #[test]
    fn marker_on_path_is_pending() {
        let target = target_of(json!({"a": {"!ref": "/x"}, "x": {"b": 1}}), "/a/b").unwrap();
        assert_eq!(target, Target::Pending("\"/a/b\" is not resolved yet".into()));

        let target = target_of(json!({"a": {"b": {"!gen": "Uuid"}}}), "/a").unwrap();
        assert_eq!(
            target,
            Target::Pending("\"/a\" contains unresolved markers".into())
        );
    }

    #[test]
    fn index_out_of_range_is_an_error() {
        let err = target_of(json!({"list": [1]}), "/list/3").unwrap_err();
        assert!(!err.is_transient());
        assert!(matches!(err, ComposeError::Document(_)));
    }
}
