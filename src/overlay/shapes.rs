//! Box-outline decomposition: rectangular regions become dashed outlines
//! expressed as dots.

use crate::overlay::coords::num_or;
use crate::types::{BoxSpec, DotSpec, RenderRequest};

/// Outward expansion of the half-extents before decomposition. An outline
/// traced on the exact edge reads as "hugging" the element and gets lost
/// against similar-colored content; 15% keeps it visibly around the target.
const EXPANSION: f64 = 1.15;

const DEFAULT_STEP: f64 = 10.0;
const MIN_STEP: f64 = 1.0;
const MAX_STEP: f64 = 60.0;

/// Bound on the perimeter walk. Coordinates past this clamp to the canvas
/// edge during normalization anyway, so walking further only piles more
/// coincident dots on the border.
const WALK_LIMIT: f64 = 100_000.0;

/// Resolve either box form to raw corner values; missing fields read as 0.
fn resolve_corners(spec: &BoxSpec) -> (f64, f64, f64, f64) {
    let num = |value: Option<f64>| num_or(value, 0.0);
    if spec.x1.is_some() {
        (num(spec.x1), num(spec.y1), num(spec.x2), num(spec.y2))
    } else {
        let x = num(spec.x);
        let y = num(spec.y);
        (x, y, x + num(spec.width), y + num(spec.height))
    }
}

/// Decompose boxes into dashed outlines of dots, in raw input units.
///
/// Returned dots are unnormalized: the renderer maps them through the
/// request's coordinate system together with any explicit dots, so `boxStep`
/// is measured in the same units as the box itself. Degenerate boxes reduce
/// to a handful of coincident dots; nothing here can fail.
pub fn boxes_to_dots(boxes: &[BoxSpec], request: &RenderRequest) -> Vec<DotSpec> {
    if boxes.is_empty() {
        return Vec::new();
    }

    let step = num_or(request.box_step, DEFAULT_STEP)
        .round()
        .clamp(MIN_STEP, MAX_STEP);
    let brightness = num_or(request.box_brightness, 1.0).clamp(0.0, 1.0);
    let size = num_or(request.box_size, 1.0).clamp(0.25, 8.0);
    let mut dots = Vec::new();

    for spec in boxes {
        let (x1, y1, x2, y2) = resolve_corners(spec);

        // Expanding the absolute half-extents about the center also
        // canonicalizes the corners: left <= right and top <= bottom hold
        // regardless of the input ordering.
        let cx = (x1 + x2) / 2.0;
        let cy = (y1 + y2) / 2.0;
        let half_w = (x2 - x1).abs() / 2.0 * EXPANSION;
        let half_h = (y2 - y1).abs() / 2.0 * EXPANSION;

        let left = (cx - half_w).clamp(-WALK_LIMIT, WALK_LIMIT);
        let right = (cx + half_w).clamp(-WALK_LIMIT, WALK_LIMIT);
        let top = (cy - half_h).clamp(-WALK_LIMIT, WALK_LIMIT);
        let bottom = (cy + half_h).clamp(-WALK_LIMIT, WALK_LIMIT);

        let mut x = left;
        while x <= right {
            dots.push(outline_dot(x, top, brightness, size));
            dots.push(outline_dot(x, bottom, brightness, size));
            x += step;
        }

        let mut y = top;
        while y <= bottom {
            dots.push(outline_dot(left, y, brightness, size));
            dots.push(outline_dot(right, y, brightness, size));
            y += step;
        }
    }

    dots
}

fn outline_dot(x: f64, y: f64, brightness: f64, size: f64) -> DotSpec {
    DotSpec {
        x: Some(x),
        y: Some(y),
        size: Some(size),
        brightness: Some(brightness),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(dots: &[DotSpec]) -> (f64, f64, f64, f64) {
        let mut bounds = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for dot in dots {
            let (x, y) = (dot.x.unwrap_or(0.0), dot.y.unwrap_or(0.0));
            bounds.0 = bounds.0.min(x);
            bounds.1 = bounds.1.min(y);
            bounds.2 = bounds.2.max(x);
            bounds.3 = bounds.3.max(y);
        }
        bounds
    }

    #[test]
    fn test_legacy_form_expands_from_center() {
        let boxes = vec![BoxSpec {
            x: Some(100.0),
            y: Some(100.0),
            width: Some(100.0),
            height: Some(100.0),
            ..BoxSpec::default()
        }];
        let dots = boxes_to_dots(&boxes, &RenderRequest::default());
        assert!(!dots.is_empty());

        // Corners (100,100)-(200,200), half-extents 50 -> 57.5 after the
        // 15% expansion about (150,150).
        let (left, top, right, bottom) = bounds(&dots);
        assert!((left - 92.5).abs() < 1e-9);
        assert!((top - 92.5).abs() < 1e-9);
        assert!((right - 207.5).abs() < 1e-9);
        assert!((bottom - 207.5).abs() < 1e-9);
    }

    #[test]
    fn test_reversed_corners_are_canonicalized() {
        let reversed = vec![BoxSpec::corners(200.0, 200.0, 100.0, 100.0)];
        let dots = boxes_to_dots(&reversed, &RenderRequest::default());
        let (left, top, right, bottom) = bounds(&dots);
        assert!(left < right);
        assert!(top < bottom);
    }

    #[test]
    fn test_outline_dots_inherit_shared_style() {
        let boxes = vec![BoxSpec::corners(0.0, 0.0, 100.0, 100.0)];
        let request = RenderRequest {
            box_brightness: Some(0.5),
            box_size: Some(2.0),
            ..RenderRequest::default()
        };
        let dots = boxes_to_dots(&boxes, &request);
        assert!(dots
            .iter()
            .all(|d| d.brightness == Some(0.5) && d.size == Some(2.0)));
    }

    #[test]
    fn test_step_is_clamped() {
        let boxes = vec![BoxSpec::corners(0.0, 0.0, 1000.0, 0.0)];
        let request = RenderRequest {
            box_step: Some(500.0),
            ..RenderRequest::default()
        };
        let dots = boxes_to_dots(&boxes, &request);

        // Top-edge dots advance by at most the 60-unit cap.
        let mut xs: Vec<f64> = dots.iter().filter_map(|d| d.x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        xs.dedup();
        let max_gap = xs
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(0.0_f64, f64::max);
        assert!(max_gap <= 60.0 + 1e-9);
    }

    #[test]
    fn test_degenerate_box_yields_coincident_dots() {
        let boxes = vec![BoxSpec::default()];
        let dots = boxes_to_dots(&boxes, &RenderRequest::default());
        assert!(!dots.is_empty());
        assert!(dots
            .iter()
            .all(|d| d.x == Some(0.0) && d.y == Some(0.0)));
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(boxes_to_dots(&[], &RenderRequest::default()).is_empty());
    }
}
