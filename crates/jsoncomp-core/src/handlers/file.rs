//! `!file` handler: parsed file content with live markers

use super::{HandlerContext, Resolution};
use crate::error::ComposeResult;
use crate::marker::Marker;
use jsoncomp_document::Format;

/// Resolve a `!file` marker
///
/// The format follows the file extension. Markers in the content are
/// resolved in later passes, in the context of the importing document.
///
/// # Errors
/// - [`ComposeError::MalformedMarker`](crate::ComposeError::MalformedMarker)
///   if the path is not a string
/// - [`ComposeError::Load`](crate::ComposeError::Load) if the file cannot be
///   read or parsed
pub fn resolve(marker: &Marker, ctx: &mut HandlerContext<'_>) -> ComposeResult<Resolution> {
    let path = ctx.path(marker.definition_str()?);
    let format = Format::from_extension(&path);
    tracing::trace!(path = %path.display(), %format, "loading file");
    Ok(Resolution::Resolved(ctx.read(&path, format)?))
}
