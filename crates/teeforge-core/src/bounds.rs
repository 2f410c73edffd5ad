//! Print-area bounds state and clamping geometry.

use kurbo::{Point, Rect};

/// Last known print-area bounds for a view, in container pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundsState {
    /// Not computed yet (template loading or layout not settled).
    #[default]
    Pending,
    /// Bounds are known.
    Available(Rect),
    /// Template or its print-area tag is missing; placement is suspended.
    Unavailable,
}

impl BoundsState {
    /// The bounds, if available.
    pub fn available(&self) -> Option<Rect> {
        match self {
            BoundsState::Available(rect) => Some(*rect),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, BoundsState::Available(_))
    }
}

/// Clamp `value` into `[lo, hi]`, preferring `lo` when the range is empty.
pub(crate) fn clamp_range(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

/// Fit `rect` inside `bounds`: shrink it if it is larger (proportionally when
/// `keep_aspect_ratio`), then translate it to the nearest in-bounds position.
pub fn clamp_rect(rect: Rect, bounds: Rect, keep_aspect_ratio: bool) -> Rect {
    let bounds = bounds.abs();
    let mut width = rect.width().abs();
    let mut height = rect.height().abs();

    if width > bounds.width() || height > bounds.height() {
        if keep_aspect_ratio && width > 0.0 && height > 0.0 {
            let scale = (bounds.width() / width).min(bounds.height() / height);
            width *= scale;
            height *= scale;
        }
        width = width.min(bounds.width());
        height = height.min(bounds.height());
    }

    let x = clamp_range(rect.x0.min(rect.x1), bounds.x0, bounds.x1 - width);
    let y = clamp_range(rect.y0.min(rect.y1), bounds.y0, bounds.y1 - height);
    Rect::new(x, y, x + width, y + height)
}

/// Map `rect` from one bounds rectangle onto another, preserving its relative
/// placement and size along each axis.
pub fn remap_rect(rect: Rect, from: Rect, to: Rect) -> Rect {
    if from.width() <= 0.0 || from.height() <= 0.0 {
        return rect;
    }
    let sx = to.width() / from.width();
    let sy = to.height() / from.height();
    let map = |p: Point| Point::new(to.x0 + (p.x - from.x0) * sx, to.y0 + (p.y - from.y0) * sy);
    Rect::from_points(map(rect.origin()), map(Point::new(rect.x1, rect.y1)))
}

/// Whether `rect` lies within `bounds` (with a small tolerance for rounding).
pub fn is_within(rect: Rect, bounds: Rect) -> bool {
    const EPS: f64 = 1e-6;
    rect.x0 >= bounds.x0 - EPS
        && rect.y0 >= bounds.y0 - EPS
        && rect.x1 <= bounds.x1 + EPS
        && rect.y1 <= bounds.y1 + EPS
}
