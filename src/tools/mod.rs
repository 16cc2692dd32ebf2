//! Tool boundary: the callable capabilities exposed to the AI agent.
//!
//! Each tool is data (name, description, JSON parameter schema) plus a
//! handler function in a sibling module, dispatched by name from one table.
//! Adding a capability means one table row and one handler - no inheritance.

pub mod dots;
pub mod locate;

use std::sync::Arc;

use lazy_static::lazy_static;
use serde_json::Value;
use tracing::info;

use crate::errors::{OverlayError, Result};
use crate::overlay::Overlay;
use crate::types::{LocateParams, RenderRequest, ScreenFrame};
use crate::vision::ElementLocator;

/// A callable capability as advertised to the agent.
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the tool's parameters
    pub input_schema: Value,
    pub required: &'static [&'static str],
}

lazy_static! {
    static ref TOOL_DEFINITIONS: Vec<ToolDefinition> = vec![
        ToolDefinition {
            name: "dots_tool",
            description: "Lights selected dots on a logical 1920x1080 grid. \
                Use for pixel text, box outlines, or simple animations.",
            input_schema: schema_value(schemars::schema_for!(RenderRequest)),
            required: &[],
        },
        ToolDefinition {
            name: "locate_element",
            description: "Precisely find and highlight a UI element on the user's screen. \
                Captures a frame and uses vision AI to locate the element accurately. \
                Prefer this over guessing coordinates with dots_tool when asked where \
                something is on screen.",
            input_schema: schema_value(schemars::schema_for!(LocateParams)),
            required: &["query"],
        },
    ];
}

fn schema_value(schema: schemars::Schema) -> Value {
    serde_json::to_value(schema).unwrap_or(Value::Null)
}

/// Seam for the embedding layer's media capture. The overlay core never
/// owns the stream; it only consumes the latest frame on demand.
pub trait FrameSource: Send + Sync {
    /// Latest captured frame, or `None` when no stream is active.
    fn capture(&self) -> Option<ScreenFrame>;
}

/// Shared service wiring the overlay engine to its tool handlers.
///
/// Holds the one overlay for the page plus the injected collaborators, and
/// dispatches tool calls by name.
#[derive(Clone)]
pub struct OverlayService {
    overlay: Overlay,
    locator: Arc<dyn ElementLocator>,
    frames: Arc<dyn FrameSource>,
}

impl OverlayService {
    /// Create a new service around an existing overlay.
    pub fn new(
        overlay: Overlay,
        locator: Arc<dyn ElementLocator>,
        frames: Arc<dyn FrameSource>,
    ) -> Self {
        info!(
            "creating overlay service with {} tools",
            TOOL_DEFINITIONS.len()
        );
        Self {
            overlay,
            locator,
            frames,
        }
    }

    /// The capability table advertised to the agent.
    pub fn tool_definitions() -> &'static [ToolDefinition] {
        &TOOL_DEFINITIONS
    }

    /// Dispatch a tool call by name.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        match name {
            "dots_tool" => dots::handle_tool_call(self, arguments).await,
            "locate_element" => locate::handle_tool_call(self, arguments).await,
            other => Err(OverlayError::UnknownTool(other.to_string())),
        }
    }

    /// The engine behind the tools, for the embedding layer (resize events,
    /// inspection).
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub(crate) fn locator(&self) -> &dyn ElementLocator {
        self.locator.as_ref()
    }

    pub(crate) fn frames(&self) -> &dyn FrameSource {
        self.frames.as_ref()
    }
}
