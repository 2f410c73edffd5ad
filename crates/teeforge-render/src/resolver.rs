//! Print-area resolver: maps a template's tagged region into container pixels.

use crate::document::VectorDocument;
use kurbo::{Point, Rect, Size};
use teeforge_core::bounds::BoundsState;

/// Where the platform laid out the rendered template, in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedLayout {
    pub origin: Point,
    pub size: Size,
}

impl RenderedLayout {
    pub fn new(origin: impl Into<Point>, size: impl Into<Size>) -> Self {
        Self {
            origin: origin.into(),
            size: size.into(),
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.origin(), rect.size())
    }
}

/// Compute print-area bounds for a rendered template.
///
/// Each axis scales independently from the intrinsic viewport to the
/// rendered size. A missing template, a missing, ambiguous or zero-area print
/// area, or a degenerate viewport or layout gives [`BoundsState::Unavailable`].
pub fn resolve_print_area(
    document: Option<&VectorDocument>,
    layout: RenderedLayout,
) -> BoundsState {
    let Some(document) = document else {
        return BoundsState::Unavailable;
    };
    let Some(area) = document.print_area() else {
        return BoundsState::Unavailable;
    };
    let viewport = document.viewport();

    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(area.width()) || !usable(area.height()) {
        log::debug!("Degenerate print area {:?}", area);
        return BoundsState::Unavailable;
    }
    if !usable(viewport.width())
        || !usable(viewport.height())
        || !usable(layout.size.width)
        || !usable(layout.size.height)
        || !layout.origin.is_finite()
    {
        log::debug!("Degenerate layout {:?} for viewport {:?}", layout, viewport);
        return BoundsState::Unavailable;
    }

    let scale_x = layout.size.width / viewport.width();
    let scale_y = layout.size.height / viewport.height();
    let map = |p: Point| {
        Point::new(
            layout.origin.x + (p.x - viewport.x0) * scale_x,
            layout.origin.y + (p.y - viewport.y0) * scale_y,
        )
    };

    let corner = Point::new(area.x1, area.y1);
    BoundsState::Available(Rect::from_points(map(area.origin()), map(corner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use teeforge_core::template::TemplateStore;

    fn front() -> VectorDocument {
        let resource = TemplateStore::builtin().resolve("tshirt-front").unwrap();
        VectorDocument::parse(resource.inline_markup().unwrap(), "print-area").unwrap()
    }

    #[test]
    fn test_scaled_bounds() {
        let layout = RenderedLayout::new((10.0, 20.0), (200.0, 240.0));
        assert_eq!(
            resolve_print_area(Some(&front()), layout),
            BoundsState::Available(Rect::new(70.0, 75.0, 150.0, 185.0))
        );
    }

    #[test]
    fn test_axes_scale_independently() {
        let layout = RenderedLayout::new((0.0, 0.0), (800.0, 480.0));
        assert_eq!(
            resolve_print_area(Some(&front()), layout),
            BoundsState::Available(Rect::new(240.0, 110.0, 560.0, 330.0))
        );
    }

    #[test]
    fn test_viewbox_origin_offset() {
        let markup = r#"<svg viewBox="100 100 50 50">
            <rect id="print-area" x="110" y="120" width="10" height="10"/>
        </svg>"#;
        let doc = VectorDocument::parse(markup, "print-area").unwrap();
        let layout = RenderedLayout::new((0.0, 0.0), (100.0, 100.0));
        assert_eq!(
            resolve_print_area(Some(&doc), layout),
            BoundsState::Available(Rect::new(20.0, 40.0, 40.0, 60.0))
        );
    }

    #[test]
    fn test_unavailable_cases() {
        let layout = RenderedLayout::new((0.0, 0.0), (100.0, 100.0));
        assert_eq!(resolve_print_area(None, layout), BoundsState::Unavailable);

        let untagged =
            VectorDocument::parse(r#"<svg viewBox="0 0 10 10"/>"#, "print-area").unwrap();
        assert_eq!(resolve_print_area(Some(&untagged), layout), BoundsState::Unavailable);

        let collapsed = RenderedLayout::new((0.0, 0.0), (0.0, 100.0));
        assert_eq!(resolve_print_area(Some(&front()), collapsed), BoundsState::Unavailable);

        let zero_viewport = VectorDocument::parse(
            r#"<svg viewBox="0 0 0 10"><rect id="print-area" width="1" height="1"/></svg>"#,
            "print-area",
        )
        .unwrap();
        assert_eq!(resolve_print_area(Some(&zero_viewport), layout), BoundsState::Unavailable);

        let flat_rect = r#"<svg viewBox="0 0 100 100">
            <rect id="print-area" x="10" y="40" width="80" height="0"/>
        </svg>"#;
        let flat_rect = VectorDocument::parse(flat_rect, "print-area").unwrap();
        assert_eq!(resolve_print_area(Some(&flat_rect), layout), BoundsState::Unavailable);

        let flat_line = r#"<svg viewBox="0 0 100 100">
            <line id="print-area" x1="10" y1="50" x2="90" y2="50"/>
        </svg>"#;
        let flat_line = VectorDocument::parse(flat_line, "print-area").unwrap();
        assert_eq!(resolve_print_area(Some(&flat_line), layout), BoundsState::Unavailable);
    }

    #[test]
    fn test_idempotent() {
        let doc = front();
        let layout = RenderedLayout::new((3.0, 4.0), (333.0, 217.0));
        assert_eq!(
            resolve_print_area(Some(&doc), layout),
            resolve_print_area(Some(&doc), layout)
        );
    }
}
