//! `!gen` handler: value from a named generator

use super::{call_arguments, HandlerContext, Resolution};
use crate::error::ComposeResult;
use crate::marker::{Marker, ID_KEY};
use jsoncomp_document::Value;

/// Resolve a `!gen` marker
///
/// `!id` may be a string or a number; markers sharing a generator name and
/// `!id` receive the same value within one session.
///
/// # Errors
/// - [`ComposeError::MalformedMarker`](crate::ComposeError::MalformedMarker)
///   for a non-string name, non-array `!args` or unusable `!id`
/// - [`ComposeError::Registry`](crate::ComposeError::Registry) for unknown
///   generators and argument errors
pub fn resolve(marker: &Marker, ctx: &mut HandlerContext<'_>) -> ComposeResult<Resolution> {
    let name = marker.definition_str()?;
    let tag = match marker.param(ID_KEY) {
        None => None,
        Some(Value::String(tag)) => Some(tag.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            return Err(marker.malformed(format!(
                "\"{ID_KEY}\" must be a string or a number, got {}",
                other.kind()
            )));
        }
    };
    let args = call_arguments(marker, name)?;

    let value = ctx
        .composer
        .generators()
        .generate(name, &args, tag.as_deref(), ctx.session)?;
    Ok(Resolution::Resolved(value))
}
