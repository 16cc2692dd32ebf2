//! Animation sequencing: frame playback, preemption, and timed auto-clear.
//!
//! At most one animation is ever live. Every render bumps a monotonic
//! generation token; older playback loops and scheduled clears compare their
//! captured token against the current one at each boundary and stand down on
//! mismatch. No cancellation handles cross the async frame loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::overlay::color::Color;
use crate::overlay::coords::{num_or, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::overlay::surface::Surface;
use crate::overlay::{renderer, shapes};
use crate::types::{DotSpec, FrameSpec, RenderRequest, RenderSummary};

const DEFAULT_FRAME_DURATION_MS: f64 = 120.0;
/// One display refresh at 60Hz; no frame plays shorter than this.
const MIN_FRAME_DURATION_MS: f64 = 16.0;
const DEFAULT_PERSIST_MS: f64 = 2000.0;

/// The overlay engine: one full-viewport surface plus the bookkeeping that
/// keeps at most one animation live.
///
/// Clones are cheap and share the same surface and generation token, so a
/// clone handed to another task still participates in preemption. Construct
/// exactly one per drawing surface and inject it into the tool handlers.
#[derive(Clone)]
pub struct Overlay {
    surface: Arc<Mutex<Surface>>,
    /// Monotonic token identifying the most recent render request.
    generation: Arc<AtomicU64>,
    /// Pending auto-clear, aborted eagerly by the next render. Stale tasks
    /// that already escaped the abort are neutralized by the token check.
    clear_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Overlay {
    /// Create an overlay for the given viewport.
    pub fn new(viewport_width: u32, viewport_height: u32, device_pixel_ratio: f64) -> Self {
        info!(
            "creating overlay for {}x{} viewport (dpr {})",
            viewport_width, viewport_height, device_pixel_ratio
        );
        Self {
            surface: Arc::new(Mutex::new(Surface::new(
                viewport_width,
                viewport_height,
                device_pixel_ratio,
            ))),
            generation: Arc::new(AtomicU64::new(0)),
            clear_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle a viewport resize. Only the physical dimensions of subsequent
    /// draws change; an in-flight animation keeps playing.
    pub fn resize(&self, viewport_width: u32, viewport_height: u32, device_pixel_ratio: f64) {
        self.lock_surface()
            .resize(viewport_width, viewport_height, device_pixel_ratio);
    }

    /// Wipe the surface immediately.
    pub fn clear(&self) {
        self.lock_surface().clear();
    }

    /// True when nothing is currently drawn.
    pub fn is_blank(&self) -> bool {
        self.lock_surface().is_blank()
    }

    /// Current generation token; each render returns a value one higher.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Physical surface dimensions in device pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        let surface = self.lock_surface();
        (surface.width(), surface.height())
    }

    /// Sample the rendered color under a logical-canvas position, for the
    /// embedding layer and tests.
    pub fn sample_logical(&self, x: u32, y: u32) -> Color {
        let surface = self.lock_surface();
        let px = (f64::from(x) + 0.5) * f64::from(surface.width()) / f64::from(LOGICAL_WIDTH);
        let py = (f64::from(y) + 0.5) * f64::from(surface.height()) / f64::from(LOGICAL_HEIGHT);
        surface
            .get_pixel(
                (px as u32).min(surface.width() - 1),
                (py as u32).min(surface.height() - 1),
            )
            .unwrap_or(Color::TRANSPARENT)
    }

    /// Render a request and schedule its auto-clear.
    ///
    /// Animated requests play frame by frame, yielding between frames; a
    /// newer render issued meanwhile wins at the next frame boundary. The
    /// summary is returned either way - preemption is silent by contract.
    pub async fn render_pattern(&self, request: &RenderRequest) -> RenderSummary {
        if let Some(task) = self.lock_clear_task().take() {
            task.abort();
        }

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let persist_ms = num_or(request.persist_ms, DEFAULT_PERSIST_MS).max(0.0) as u64;

        if request.frames.is_empty() {
            let mut dots = request.dots.clone();
            dots.extend(shapes::boxes_to_dots(&request.boxes, request));
            self.draw(&dots, request);
        } else {
            let played = self.animate_frames(&request.frames, request, token).await;
            debug!(
                "animation ended after {} of {} frames",
                played,
                request.frames.len()
            );
        }

        if persist_ms > 0 {
            self.schedule_clear(token, persist_ms);
        }

        RenderSummary {
            logical_resolution: format!("{LOGICAL_WIDTH}x{LOGICAL_HEIGHT}"),
            dots_count: request.dots.len() + request.boxes.len(),
            frame_count: request.frames.len(),
            persist_ms,
        }
    }

    /// Play frames in order, bailing at the first boundary where a newer
    /// render has bumped the generation token.
    async fn animate_frames(
        &self,
        frames: &[FrameSpec],
        request: &RenderRequest,
        token: u64,
    ) -> usize {
        for frame in frames {
            if self.generation.load(Ordering::SeqCst) != token {
                return 0;
            }

            let mut dots = frame.dots.clone();
            dots.extend(shapes::boxes_to_dots(&frame.boxes, request));
            self.draw(&dots, request);

            let duration_ms =
                num_or(frame.duration_ms, DEFAULT_FRAME_DURATION_MS).max(MIN_FRAME_DURATION_MS);
            tokio::time::sleep(Duration::from_millis(duration_ms as u64)).await;
        }
        frames.len()
    }

    fn draw(&self, dots: &[DotSpec], request: &RenderRequest) -> usize {
        // The lock is held for the whole draw and never across an await:
        // a frame that has started drawing always completes.
        renderer::draw_dots(&mut self.lock_surface(), dots, request)
    }

    fn schedule_clear(&self, token: u64, persist_ms: u64) {
        let surface = Arc::clone(&self.surface);
        let generation = Arc::clone(&self.generation);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(persist_ms)).await;
            // A newer render owns the surface by now; its content stays.
            if generation.load(Ordering::SeqCst) == token {
                surface
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clear();
            }
        });
        *self.lock_clear_task() = Some(handle);
    }

    fn lock_surface(&self) -> MutexGuard<'_, Surface> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_clear_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.clear_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(x: f64, y: f64) -> DotSpec {
        DotSpec {
            x: Some(x),
            y: Some(y),
            ..DotSpec::default()
        }
    }

    #[tokio::test]
    async fn test_static_render_summary() {
        let overlay = Overlay::new(1920, 1080, 1.0);
        let request = RenderRequest {
            dots: vec![dot(10.0, 10.0), dot(20.0, 20.0)],
            boxes: vec![crate::types::BoxSpec::corners(0.0, 0.0, 50.0, 50.0)],
            persist_ms: Some(0.0),
            ..RenderRequest::default()
        };

        let summary = overlay.render_pattern(&request).await;
        assert_eq!(summary.logical_resolution, "1920x1080");
        assert_eq!(summary.dots_count, 3);
        assert_eq!(summary.frame_count, 0);
        assert_eq!(summary.persist_ms, 0);
        assert!(!overlay.is_blank());
    }

    #[tokio::test]
    async fn test_each_render_bumps_the_generation() {
        let overlay = Overlay::new(1920, 1080, 1.0);
        assert_eq!(overlay.generation(), 0);

        let request = RenderRequest {
            dots: vec![dot(10.0, 10.0)],
            persist_ms: Some(0.0),
            ..RenderRequest::default()
        };
        overlay.render_pattern(&request).await;
        assert_eq!(overlay.generation(), 1);
        overlay.render_pattern(&request).await;
        assert_eq!(overlay.generation(), 2);
    }

    #[tokio::test]
    async fn test_persist_zero_disables_auto_clear() {
        let overlay = Overlay::new(1920, 1080, 1.0);
        let request = RenderRequest {
            dots: vec![dot(960.0, 540.0)],
            persist_ms: Some(0.0),
            ..RenderRequest::default()
        };
        overlay.render_pattern(&request).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!overlay.is_blank());
    }

    #[tokio::test]
    async fn test_frames_play_in_order() {
        let overlay = Overlay::new(1920, 1080, 1.0);
        let request = RenderRequest {
            frames: vec![
                FrameSpec {
                    dots: vec![dot(100.0, 100.0)],
                    duration_ms: Some(20.0),
                    ..FrameSpec::default()
                },
                FrameSpec {
                    dots: vec![dot(1800.0, 900.0)],
                    duration_ms: Some(20.0),
                    ..FrameSpec::default()
                },
            ],
            persist_ms: Some(0.0),
            ..RenderRequest::default()
        };

        let summary = overlay.render_pattern(&request).await;
        assert_eq!(summary.frame_count, 2);
        // The last frame is what remains on the surface.
        assert!(overlay.sample_logical(1800, 900).a > 0.0);
        assert!(overlay.sample_logical(100, 100).a == 0.0);
    }

    #[tokio::test]
    async fn test_resize_applies_to_subsequent_draws() {
        let overlay = Overlay::new(1920, 1080, 1.0);
        overlay.resize(960, 540, 2.0);
        assert_eq!(overlay.surface_size(), (1920, 1080));

        let request = RenderRequest {
            dots: vec![dot(960.0, 540.0)],
            persist_ms: Some(0.0),
            ..RenderRequest::default()
        };
        overlay.render_pattern(&request).await;
        assert!(overlay.sample_logical(960, 540).a > 0.0);
    }
}
