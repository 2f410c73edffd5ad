//! SVG geometry: transform lists, lengths and element bounding boxes.

use kurbo::{Affine, BezPath, Point, Rect, Shape};
use roxmltree::Node;

/// Parse a plain or `px` length. Percentages and other units are not supported.
pub(crate) fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let value = value.strip_suffix("px").unwrap_or(value);
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a whitespace/comma separated number list.
pub(crate) fn parse_numbers(value: &str) -> Option<Vec<f64>> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

fn length_attr(node: Node<'_, '_>, name: &str) -> Option<f64> {
    node.attribute(name).and_then(parse_length)
}

/// Parse an SVG `transform` attribute.
pub fn parse_transform(value: &str) -> Option<Affine> {
    let mut result = Affine::IDENTITY;
    let mut rest = value.trim();

    while !rest.is_empty() {
        let open = rest.find('(')?;
        let close = open + rest[open..].find(')')?;
        let name = rest[..open].trim();
        let args = parse_numbers(&rest[open + 1..close])?;

        let step = match (name, args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => Affine::new([a, b, c, d, e, f]),
            ("translate", &[tx]) => Affine::translate((tx, 0.0)),
            ("translate", &[tx, ty]) => Affine::translate((tx, ty)),
            ("scale", &[s]) => Affine::scale(s),
            ("scale", &[sx, sy]) => Affine::scale_non_uniform(sx, sy),
            ("rotate", &[angle]) => Affine::rotate(angle.to_radians()),
            ("rotate", &[angle, cx, cy]) => {
                Affine::rotate_about(angle.to_radians(), Point::new(cx, cy))
            }
            ("skewX", &[angle]) => Affine::skew(angle.to_radians().tan(), 0.0),
            ("skewY", &[angle]) => Affine::skew(0.0, angle.to_radians().tan()),
            _ => return None,
        };
        result *= step;
        rest = rest[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    Some(result)
}

/// Transform from an element's local space to the root's user space.
///
/// Composes `transform` attributes of the element and its ancestors below
/// the root `<svg>`. Unparseable transforms are treated as identity.
pub fn node_transform(node: Node<'_, '_>) -> Affine {
    let mut chain: Vec<Node<'_, '_>> = node
        .ancestors()
        .filter(|n| n.is_element() && n.parent_element().is_some())
        .collect();
    chain.reverse();

    chain.into_iter().fold(Affine::IDENTITY, |acc, n| {
        let local = match n.attribute("transform") {
            Some(value) => parse_transform(value).unwrap_or_else(|| {
                log::warn!("Ignoring invalid transform {:?} on <{}>", value, n.tag_name().name());
                Affine::IDENTITY
            }),
            None => Affine::IDENTITY,
        };
        acc * local
    })
}

/// Bounding box of a basic shape in its own coordinate space.
fn local_bbox(node: Node<'_, '_>) -> Option<Rect> {
    let num = |name: &str| length_attr(node, name).unwrap_or(0.0);

    match node.tag_name().name() {
        "rect" => {
            let (w, h) = (length_attr(node, "width")?, length_attr(node, "height")?);
            (w >= 0.0 && h >= 0.0).then(|| Rect::from_origin_size((num("x"), num("y")), (w, h)))
        }
        "circle" => {
            let r = length_attr(node, "r")?;
            Some(Rect::from_center_size((num("cx"), num("cy")), (2.0 * r, 2.0 * r)))
        }
        "ellipse" => {
            let (rx, ry) = (length_attr(node, "rx")?, length_attr(node, "ry")?);
            Some(Rect::from_center_size((num("cx"), num("cy")), (2.0 * rx, 2.0 * ry)))
        }
        "line" => Some(Rect::from_points((num("x1"), num("y1")), (num("x2"), num("y2")))),
        "polygon" | "polyline" => {
            let coords = parse_numbers(node.attribute("points")?)?;
            coords
                .chunks_exact(2)
                .map(|pair| Rect::from_points((pair[0], pair[1]), (pair[0], pair[1])))
                .reduce(|a, b| a.union(b))
        }
        "path" => {
            let path = BezPath::from_svg(node.attribute("d")?).ok()?;
            (!path.elements().is_empty()).then(|| path.bounding_box())
        }
        _ => None,
    }
}

/// Bounding box of an element in the root's user space.
///
/// Containers (`<g>` and friends) use the union of their shape descendants.
pub fn element_bbox(node: Node<'_, '_>) -> Option<Rect> {
    if let Some(local) = local_bbox(node) {
        return Some(node_transform(node).transform_rect_bbox(local));
    }
    node.descendants()
        .skip(1)
        .filter(|n| n.is_element())
        .filter_map(|n| local_bbox(n).map(|local| node_transform(n).transform_rect_bbox(local)))
        .reduce(|a, b| a.union(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox_of(markup: &str, id: &str) -> Option<Rect> {
        let doc = roxmltree::Document::parse(markup).unwrap();
        let node = doc.descendants().find(|n| n.attribute("id") == Some(id)).unwrap();
        element_bbox(node)
    }

    fn approx(a: Rect, b: Rect) -> bool {
        (a.x0 - b.x0).abs() < 1e-9
            && (a.y0 - b.y0).abs() < 1e-9
            && (a.x1 - b.x1).abs() < 1e-9
            && (a.y1 - b.y1).abs() < 1e-9
    }

    #[test]
    fn test_parse_transform_list() {
        let t = parse_transform("translate(10, 20) scale(2)").unwrap();
        assert_eq!(t * Point::new(1.0, 1.0), Point::new(12.0, 22.0));

        let t = parse_transform("matrix(1 0 0 1 5 6)").unwrap();
        assert_eq!(t * Point::ZERO, Point::new(5.0, 6.0));

        assert!(parse_transform("translate(1 2").is_none());
        assert!(parse_transform("wobble(3)").is_none());
        assert_eq!(parse_transform("  "), Some(Affine::IDENTITY));
    }

    #[test]
    fn test_rotate_about_center() {
        let t = parse_transform("rotate(90 10 10)").unwrap();
        let p = t * Point::new(20.0, 10.0);
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!((p.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_bboxes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
            <rect id="r" x="1" y="2" width="3" height="4"/>
            <circle id="c" cx="10" cy="10" r="5"/>
            <ellipse id="e" cx="0" cy="0" rx="4" ry="2"/>
            <line id="l" x1="5" y1="9" x2="1" y2="3"/>
            <polygon id="pg" points="0,0 10,0 5,8"/>
            <path id="p" d="M0 0 L10 0 L10 10 Z"/>
        </svg>"#;
        assert_eq!(bbox_of(svg, "r"), Some(Rect::new(1.0, 2.0, 4.0, 6.0)));
        assert_eq!(bbox_of(svg, "c"), Some(Rect::new(5.0, 5.0, 15.0, 15.0)));
        assert_eq!(bbox_of(svg, "e"), Some(Rect::new(-4.0, -2.0, 4.0, 2.0)));
        assert_eq!(bbox_of(svg, "l"), Some(Rect::new(1.0, 3.0, 5.0, 9.0)));
        assert_eq!(bbox_of(svg, "pg"), Some(Rect::new(0.0, 0.0, 10.0, 8.0)));
        assert_eq!(bbox_of(svg, "p"), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_ancestor_transforms() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
            <g transform="translate(100 50)">
                <g transform="scale(2)">
                    <rect id="r" x="5" y="5" width="10" height="20"/>
                </g>
            </g>
        </svg>"#;
        assert!(approx(bbox_of(svg, "r").unwrap(), Rect::new(110.0, 60.0, 130.0, 100.0)));
    }

    #[test]
    fn test_group_union() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
            <g id="area" transform="translate(10 0)">
                <rect x="0" y="0" width="5" height="5"/>
                <rect x="20" y="10" width="5" height="5"/>
            </g>
        </svg>"#;
        assert!(approx(bbox_of(svg, "area").unwrap(), Rect::new(10.0, 0.0, 35.0, 15.0)));
    }

    #[test]
    fn test_lengths() {
        assert_eq!(parse_length("400"), Some(400.0));
        assert_eq!(parse_length(" 12.5px "), Some(12.5));
        assert_eq!(parse_length("50%"), None);
    }
}
