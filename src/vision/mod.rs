//! Vision-location collaborator.
//!
//! Resolves natural-language element queries ("the Connect button") against
//! a captured screen frame using a Gemini-family vision model, reporting
//! bounding boxes on the normalized 0-1000 scale. The overlay core only
//! depends on the [`ElementLocator`] trait; the HTTP client lives behind it.

pub mod client;
pub mod config;
pub mod models;

pub use client::VisionClient;
pub use config::{VisionConfig, VisionModel};

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{BoxSpec, ScreenFrame};

/// The element-location seam.
///
/// Implementations return corner boxes (`x1,y1,x2,y2`) on the 0-1000
/// normalized scale; an empty list means the element is not visible.
/// Retries, if any, belong to the implementation - callers treat a failure
/// as a structured not-found.
#[async_trait]
pub trait ElementLocator: Send + Sync {
    async fn locate(&self, query: &str, frame: &ScreenFrame) -> Result<Vec<BoxSpec>>;
}
