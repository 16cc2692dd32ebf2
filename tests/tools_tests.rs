//! Integration tests for the tool boundary.
//!
//! The vision locator and frame source are scripted stand-ins so these run
//! without a network or a capture stream.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use dotglow::errors::{OverlayError, Result};
use dotglow::tools::{FrameSource, OverlayService};
use dotglow::types::{BoxSpec, ScreenFrame};
use dotglow::vision::ElementLocator;
use dotglow::Overlay;

// ==================== Scripted Collaborators ====================

struct ScriptedLocator {
    boxes: Vec<BoxSpec>,
    fail: bool,
}

impl ScriptedLocator {
    fn returning(boxes: Vec<BoxSpec>) -> Arc<Self> {
        Arc::new(Self { boxes, fail: false })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            boxes: Vec::new(),
            fail: true,
        })
    }
}

#[async_trait]
impl ElementLocator for ScriptedLocator {
    async fn locate(&self, _query: &str, _frame: &ScreenFrame) -> Result<Vec<BoxSpec>> {
        if self.fail {
            return Err(OverlayError::Network("connection refused".to_string()));
        }
        Ok(self.boxes.clone())
    }
}

struct StaticFrame;

impl FrameSource for StaticFrame {
    fn capture(&self) -> Option<ScreenFrame> {
        Some(ScreenFrame {
            mime_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        })
    }
}

struct NoStream;

impl FrameSource for NoStream {
    fn capture(&self) -> Option<ScreenFrame> {
        None
    }
}

fn service_with(locator: Arc<dyn ElementLocator>, frames: Arc<dyn FrameSource>) -> OverlayService {
    init_tracing();
    OverlayService::new(Overlay::new(1920, 1080, 1.0), locator, frames)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn default_service() -> OverlayService {
    service_with(ScriptedLocator::returning(vec![]), Arc::new(StaticFrame))
}

// ==================== Tool Table Tests ====================

#[test]
fn tool_table_advertises_both_capabilities() {
    let definitions = OverlayService::tool_definitions();
    assert_eq!(definitions.len(), 2);

    let names: Vec<&str> = definitions.iter().map(|d| d.name).collect();
    assert!(names.contains(&"dots_tool"));
    assert!(names.contains(&"locate_element"));

    for definition in definitions {
        assert!(!definition.description.is_empty());
        assert!(definition.input_schema.is_object());
    }

    let locate = definitions
        .iter()
        .find(|d| d.name == "locate_element")
        .expect("locate tool");
    assert_eq!(locate.required, &["query"]);
}

#[test]
fn dots_schema_documents_the_request_shape() {
    let definitions = OverlayService::tool_definitions();
    let dots = definitions
        .iter()
        .find(|d| d.name == "dots_tool")
        .expect("dots tool");
    let properties = dots.input_schema["properties"]
        .as_object()
        .expect("object schema");
    for field in ["dots", "boxes", "frames", "coordinateSystem", "persistMs"] {
        assert!(properties.contains_key(field), "missing {field}");
    }
}

// ==================== dots_tool Tests ====================

#[tokio::test]
async fn dots_tool_rejects_a_structurally_empty_request() {
    let service = default_service();
    let result = service.call_tool("dots_tool", json!({})).await;
    assert!(matches!(result, Err(OverlayError::EmptyRenderRequest)));

    let result = service.call_tool("dots_tool", serde_json::Value::Null).await;
    assert!(matches!(result, Err(OverlayError::EmptyRenderRequest)));
}

#[tokio::test]
async fn dots_tool_renders_and_summarizes() {
    let service = default_service();
    let result = service
        .call_tool(
            "dots_tool",
            json!({
                "dots": [{"x": 960, "y": 540, "size": 2, "brightness": 1}],
                "persistMs": 0
            }),
        )
        .await
        .expect("render succeeds");

    assert_eq!(result["logicalResolution"], "1920x1080");
    assert_eq!(result["dotsCount"], 1);
    assert_eq!(result["frameCount"], 0);
    assert!(!service.overlay().is_blank());
}

#[tokio::test]
async fn dots_tool_degrades_malformed_subfields_instead_of_failing() {
    let service = default_service();
    let result = service
        .call_tool(
            "dots_tool",
            json!({
                "dots": [{"x": "960", "y": 540, "size": "huge"}],
                "radius": "wide",
                "glowStrength": 9000,
                "density": -3,
                "persistMs": 0,
                "coordinateSystem": "martian"
            }),
        )
        .await
        .expect("lenient request succeeds");

    assert_eq!(result["dotsCount"], 1);
    assert!(!service.overlay().is_blank());
}

#[tokio::test]
async fn dots_tool_plays_animation_frames() {
    let service = default_service();
    let result = service
        .call_tool(
            "dots_tool",
            json!({
                "frames": [
                    {"dots": [{"x": 100, "y": 100}], "durationMs": 20},
                    {"boxes": [{"x": 800, "y": 400, "width": 200, "height": 200}], "durationMs": 20}
                ],
                "persistMs": 0
            }),
        )
        .await
        .expect("animation succeeds");

    assert_eq!(result["frameCount"], 2);
    assert!(!service.overlay().is_blank());
}

#[tokio::test]
async fn unknown_tools_are_rejected_by_name() {
    let service = default_service();
    let result = service.call_tool("inject_css", json!({})).await;
    assert!(matches!(result, Err(OverlayError::UnknownTool(name)) if name == "inject_css"));
}

// ==================== locate_element Tests ====================

#[tokio::test]
async fn locate_without_a_stream_reports_unavailable() {
    let service = service_with(ScriptedLocator::returning(vec![]), Arc::new(NoStream));
    let result = service
        .call_tool("locate_element", json!({"query": "the Chat text"}))
        .await
        .expect("structured outcome");

    assert_eq!(result["found"], false);
    assert!(result["error"].as_str().is_some());
    assert!(service.overlay().is_blank());
}

#[tokio::test]
async fn locate_miss_reports_not_found() {
    let service = default_service();
    let result = service
        .call_tool("locate_element", json!({"query": "a unicorn"}))
        .await
        .expect("structured outcome");

    assert_eq!(result["found"], false);
    assert_eq!(result["count"], 0);
    assert!(service.overlay().is_blank());
}

#[tokio::test]
async fn locate_failure_degrades_to_unavailable() {
    let service = service_with(ScriptedLocator::failing(), Arc::new(StaticFrame));
    let result = service
        .call_tool("locate_element", json!({"query": "anything"}))
        .await
        .expect("collaborator failure is not an error");

    assert_eq!(result["found"], false);
    assert!(result["error"]
        .as_str()
        .expect("error message")
        .contains("connection refused"));
}

#[tokio::test]
async fn locate_hit_highlights_the_returned_boxes() {
    let locator = ScriptedLocator::returning(vec![BoxSpec::corners(450.0, 450.0, 550.0, 550.0)]);
    let service = service_with(locator, Arc::new(StaticFrame));

    let result = service
        .call_tool(
            "locate_element",
            json!({"query": "the Connect button", "persistMs": 0}),
        )
        .await
        .expect("locate succeeds");

    assert_eq!(result["found"], true);
    assert_eq!(result["count"], 1);
    assert_eq!(result["query"], "the Connect button");
    assert!(!service.overlay().is_blank());
}

#[tokio::test]
async fn locate_requires_a_query() {
    let service = default_service();
    let result = service.call_tool("locate_element", json!({})).await;
    assert!(matches!(result, Err(OverlayError::InvalidArguments(_))));
}
