//! Implementation of the `locate_element` capability.
//!
//! Resolves a natural-language element query against the latest captured
//! frame via the injected vision locator, then highlights the returned
//! boxes with a tight outline.

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{OverlayError, Result};
use crate::overlay::num_or;
use crate::tools::OverlayService;
use crate::types::{CoordinateSystem, LocateOutcome, LocateParams, RenderRequest};

/// Defaults tuned for single-element highlighting: a tighter outline step
/// than the raw dots tool and a longer hold.
const LOCATE_PERSIST_MS: f64 = 3000.0;
const LOCATE_BOX_STEP: f64 = 6.0;
const LOCATE_RADIUS: f64 = 3.0;
const LOCATE_DENSITY: f64 = 2.0;

/// Locate and highlight an element.
///
/// Lookup trouble - no capture stream, collaborator failure, element not
/// visible - comes back as a structured not-found outcome, never as an
/// error: the overlay simply draws nothing in those cases.
pub async fn handle_tool_call(service: &OverlayService, arguments: Value) -> Result<Value> {
    let params: LocateParams = serde_json::from_value(arguments)
        .map_err(|e| OverlayError::InvalidArguments(e.to_string()))?;

    let Some(frame) = service.frames().capture() else {
        warn!("locate_element: no active video or screen stream");
        return outcome_value(LocateOutcome::unavailable(
            "no video or screen stream active",
        ));
    };

    let boxes = match service.locator().locate(&params.query, &frame).await {
        Ok(boxes) => boxes,
        Err(e) => {
            warn!("locate_element: lookup failed: {}", e);
            return outcome_value(LocateOutcome::unavailable(e.to_string()));
        }
    };

    if boxes.is_empty() {
        info!("locate_element: nothing found for {:?}", params.query);
        return outcome_value(LocateOutcome::not_found());
    }

    let count = boxes.len();
    let request = RenderRequest {
        boxes,
        coordinate_system: CoordinateSystem::Normalized1000,
        color: params.color.clone(),
        radius: Some(LOCATE_RADIUS),
        density: Some(LOCATE_DENSITY),
        box_step: Some(LOCATE_BOX_STEP),
        persist_ms: Some(num_or(params.persist_ms, LOCATE_PERSIST_MS)),
        ..RenderRequest::default()
    };

    info!(
        "locate_element: highlighting {} box(es) for {:?}",
        count, params.query
    );
    service.overlay().render_pattern(&request).await;

    outcome_value(LocateOutcome::found(count, params.query))
}

fn outcome_value(outcome: LocateOutcome) -> Result<Value> {
    serde_json::to_value(outcome).map_err(|e| OverlayError::Serialization(e.to_string()))
}
