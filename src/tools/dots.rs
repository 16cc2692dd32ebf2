//! Implementation of the `dots_tool` capability.
//!
//! Renders a caller-supplied pattern: a static set of dots and box
//! outlines, or an ordered list of animation frames.

use serde_json::Value;
use tracing::debug;

use crate::errors::{OverlayError, Result};
use crate::tools::OverlayService;
use crate::types::RenderRequest;

/// Render a dot pattern and return its summary.
///
/// The only rejected input is a structurally empty request - none of
/// `dots`, `boxes`, or `frames` - which signals a caller programming error.
/// Malformed sub-fields degrade through lenient parsing and clamping
/// instead of failing.
pub async fn handle_tool_call(service: &OverlayService, arguments: Value) -> Result<Value> {
    let arguments = if arguments.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        arguments
    };

    let request: RenderRequest = serde_json::from_value(arguments)
        .map_err(|e| OverlayError::InvalidArguments(e.to_string()))?;

    if request.is_empty() {
        return Err(OverlayError::EmptyRenderRequest);
    }

    debug!(
        "dots_tool: {} dots, {} boxes, {} frames",
        request.dots.len(),
        request.boxes.len(),
        request.frames.len()
    );

    let summary = service.overlay().render_pattern(&request).await;
    serde_json::to_value(summary).map_err(|e| OverlayError::Serialization(e.to_string()))
}
