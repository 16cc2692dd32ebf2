//! Glow-cluster rasterization of dots onto the surface.

use tracing::debug;

use crate::overlay::color::Color;
use crate::overlay::coords::{self, num_or, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::overlay::surface::Surface;
use crate::types::{DotSpec, RenderRequest};

/// Fallback highlight color, `#0b3d91` (deep blue, readable on both light
/// and dark content).
pub const DEFAULT_COLOR: Color = Color::rgb(11.0 / 255.0, 61.0 / 255.0, 145.0 / 255.0);

const DEFAULT_RADIUS: f64 = 4.0;
const DEFAULT_GLOW_STRENGTH: f64 = 8.0;
const DEFAULT_DENSITY: f64 = 2.0;

/// Sub-marks sit at 90% of the base radius so neighbors melt into one soft
/// cluster. Marks can overlap at high density; the overdraw is intentional.
const CLUSTER_SPACING_FACTOR: f64 = 0.9;
const MICRO_RADIUS_FACTOR: f64 = 0.45;
const MIN_MICRO_RADIUS: f64 = 0.5;

/// Peak halo alpha relative to the core, so the mark reads as a dot with a
/// glow rather than a blob.
const HALO_STRENGTH: f64 = 0.35;

/// Full-repaint draw of `dots` onto `surface`.
///
/// Every call clears the surface first - renders are whole frames, not
/// patches. Returns the number of dots drawn; 0 means the surface was left
/// blank, which callers use to detect "nothing to show".
pub fn draw_dots(surface: &mut Surface, dots: &[DotSpec], request: &RenderRequest) -> usize {
    let normalized = coords::normalize_dots(dots, request.coordinate_system);
    surface.clear();

    if normalized.is_empty() {
        return 0;
    }

    let color = request
        .color
        .as_deref()
        .and_then(Color::parse_css)
        .unwrap_or(DEFAULT_COLOR);
    let glow_strength = num_or(request.glow_strength, DEFAULT_GLOW_STRENGTH).clamp(0.0, 40.0);
    let density = num_or(request.density, DEFAULT_DENSITY).round().clamp(1.0, 5.0) as i64;

    let dpr = surface.device_pixel_ratio();
    let scale_x = f64::from(surface.width()) / f64::from(LOGICAL_WIDTH);
    let scale_y = f64::from(surface.height()) / f64::from(LOGICAL_HEIGHT);
    let base_radius = num_or(request.radius, DEFAULT_RADIUS).clamp(0.25, 8.0) * dpr;
    let cluster_spacing = base_radius * CLUSTER_SPACING_FACTOR;
    let glow_reach = glow_strength * dpr;
    let half = density / 2;

    for dot in &normalized {
        // Dot centers sit mid-cell so a logical position maps to the same
        // on-screen spot at every resolution.
        let px = (f64::from(dot.x) + 0.5) * scale_x;
        let py = (f64::from(dot.y) + 0.5) * scale_y;
        let radius = base_radius * dot.size;
        let micro_radius = (radius * MICRO_RADIUS_FACTOR).max(MIN_MICRO_RADIUS);

        for dx in -half..=half {
            for dy in -half..=half {
                draw_glow_mark(
                    surface,
                    px + dx as f64 * cluster_spacing,
                    py + dy as f64 * cluster_spacing,
                    micro_radius,
                    glow_reach,
                    color,
                    dot.brightness,
                );
            }
        }
    }

    debug!(
        "rendered {} dots onto {}x{} surface",
        normalized.len(),
        surface.width(),
        surface.height()
    );
    normalized.len()
}

/// One anti-aliased filled mark wrapped in a soft halo.
///
/// The core is a solid fill with a half-pixel edge ramp; the halo falls off
/// quadratically out to `glow_reach` device pixels, standing in for a canvas
/// shadow blur without a separate blur pass.
fn draw_glow_mark(
    surface: &mut Surface,
    cx: f64,
    cy: f64,
    radius: f64,
    glow_reach: f64,
    color: Color,
    alpha: f64,
) {
    if alpha <= 0.0 {
        return;
    }

    let extent = radius + glow_reach + 1.0;
    if !(cx.is_finite() && cy.is_finite() && extent.is_finite()) {
        return;
    }

    let max_x = (cx + extent).min(f64::from(surface.width()) - 1.0);
    let max_y = (cy + extent).min(f64::from(surface.height()) - 1.0);
    if max_x < 0.0 || max_y < 0.0 {
        return;
    }
    let min_x = (cx - extent).max(0.0) as u32;
    let min_y = (cy - extent).max(0.0) as u32;
    let max_x = max_x as u32;
    let max_y = max_y as u32;
    if min_x > max_x || min_y > max_y {
        return;
    }

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let dist = ((f64::from(px) - cx).powi(2) + (f64::from(py) - cy).powi(2)).sqrt();

            let core = if dist <= radius - 0.5 {
                1.0
            } else if dist <= radius + 0.5 {
                radius + 0.5 - dist
            } else {
                0.0
            };

            let halo = if glow_reach > 0.0 && dist > radius && dist <= radius + glow_reach {
                let t = (dist - radius) / glow_reach;
                (1.0 - t) * (1.0 - t) * HALO_STRENGTH
            } else {
                0.0
            };

            let intensity = (core + halo).min(1.0) * alpha;
            if intensity > 0.0 {
                let mut mark = color;
                mark.a *= intensity as f32;
                surface.blend_pixel(px, py, mark);
            }
        }
    }
}
