//! `!xref` handler: deep copy with edits and conditions
//!
//! All paths are relative to the target. Conditions are checked against the
//! unmodified copy, then `extend` entries are set in order, then `delete`
//! paths are removed in order.

use super::{target_pointer, HandlerContext, Resolution, Target};
use crate::error::ComposeResult;
use crate::marker::Marker;
use jsoncomp_document::{Document, Pointer, Value};

const EXTEND: &str = "extend";
const DELETE: &str = "delete";
const IF_PRESENT: &str = "ifPresent";
const IF_MISSING: &str = "ifMissing";

/// Resolve an `!xref` marker
///
/// # Errors
/// - [`ComposeError::MalformedMarker`](crate::ComposeError::MalformedMarker)
///   for a bad target or parameter shape
/// - document errors when an `extend` parent or a `delete` path is missing
///   from the copy
pub fn resolve(marker: &Marker, ctx: &mut HandlerContext<'_>) -> ComposeResult<Resolution> {
    let pointer = target_pointer(marker)?;
    let if_present = paths(marker, IF_PRESENT)?;
    let if_missing = paths(marker, IF_MISSING)?;
    let extend = extensions(marker)?;
    let delete = paths(marker, DELETE)?;

    let value = match ctx.target(&pointer)? {
        Target::Ready(value) => value,
        Target::Pending(reason) => return Ok(Resolution::Deferred(reason)),
    };
    let mut copy = Document::new(value);

    if let Some(path) = if_present.iter().find(|path| !copy.contains(path)) {
        return Ok(Resolution::deferred(format!("\"{path}\" is not present in \"{pointer}\"")));
    }
    if let Some(path) = if_missing.iter().find(|path| copy.contains(path)) {
        return Ok(Resolution::deferred(format!("\"{path}\" is present in \"{pointer}\"")));
    }

    for (path, value) in extend {
        copy.set(&path, value)?;
    }
    for path in &delete {
        copy.delete(path)?;
    }
    Ok(Resolution::Resolved(copy.into_value()))
}

/// Relative paths of a string-or-array parameter
fn paths(marker: &Marker, name: &str) -> ComposeResult<Vec<Pointer>> {
    let raw: Vec<&str> = match marker.param(name) {
        None => Vec::new(),
        Some(Value::String(path)) => vec![path.as_str()],
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| {
                    marker.malformed(format!("\"{name}\" entries must be strings"))
                })
            })
            .collect::<ComposeResult<_>>()?,
        Some(other) => {
            return Err(marker.malformed(format!(
                "\"{name}\" must be a string or an array of strings, got {}",
                other.kind()
            )));
        }
    };
    raw.into_iter()
        .map(|path| relative(marker, name, path))
        .collect()
}

fn extensions(marker: &Marker) -> ComposeResult<Vec<(Pointer, Value)>> {
    match marker.param(EXTEND) {
        None => Ok(Vec::new()),
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(path, value)| {
                let pointer = relative(marker, EXTEND, path)?;
                if pointer.is_root() {
                    return Err(marker.malformed("\"extend\" cannot replace the whole target"));
                }
                Ok((pointer, value.clone()))
            })
            .collect(),
        Some(other) => Err(marker.malformed(format!(
            "\"extend\" must be a mapping of paths to values, got {}",
            other.kind()
        ))),
    }
}

fn relative(marker: &Marker, name: &str, path: &str) -> ComposeResult<Pointer> {
    Pointer::parse(path)
        .map_err(|e| marker.malformed(format!("invalid path in \"{name}\": {e}")))
}
