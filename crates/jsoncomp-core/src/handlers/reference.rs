//! `!ref` handler: deep copy of another node

use super::{target_pointer, HandlerContext, Resolution, Target};
use crate::error::ComposeResult;
use crate::marker::Marker;

/// Resolve a `!ref` marker
///
/// # Errors
/// - [`ComposeError::MalformedMarker`](crate::ComposeError::MalformedMarker)
///   for a non-string, unparsable or root target
/// - terminal document errors such as an out-of-range index
pub fn resolve(marker: &Marker, ctx: &mut HandlerContext<'_>) -> ComposeResult<Resolution> {
    let pointer = target_pointer(marker)?;
    match ctx.target(&pointer)? {
        Target::Ready(value) => Ok(Resolution::Resolved(value)),
        Target::Pending(reason) => Ok(Resolution::Deferred(reason)),
    }
}
