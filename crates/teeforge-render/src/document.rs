//! Parsed vector templates and recoloring.

use crate::fetch::FetchError;
use crate::geometry::{element_bbox, parse_length, parse_numbers};
use kurbo::Rect;
use roxmltree::Node;
use std::ops::Range;
use teeforge_core::color::HexColor;
use thiserror::Error;

/// Template loading and parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Template parse error: {0}")]
    Parse(String),
    #[error("Template root is <{0}>, expected <svg>")]
    NotSvg(String),
    #[error("Template has no viewBox or width/height")]
    NoViewport,
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// A template parsed once and ready to be recolored any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    markup: String,
    root_tag: Range<usize>,
    viewport: Rect,
    print_area: Option<Rect>,
    inherit_sites: usize,
}

/// Recolored template markup.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    pub markup: String,
    pub color: HexColor,
    /// Intrinsic coordinate system of the template.
    pub viewport: Rect,
}

fn is_current_color(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("currentColor")
}

/// Number of `fill`/`stroke` paints on `node` that inherit the root color.
fn count_inherit_sites(node: Node<'_, '_>) -> usize {
    let attrs = ["fill", "stroke"]
        .iter()
        .filter(|name| node.attribute(**name).is_some_and(is_current_color))
        .count();
    let styles = node.attribute("style").map_or(0, |style| {
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .filter(|(prop, value)| {
                matches!(prop.trim(), "fill" | "stroke") && is_current_color(value)
            })
            .count()
    });
    attrs + styles
}

/// `viewBox`, else numeric `width`/`height` at the origin.
fn intrinsic_viewport(root: Node<'_, '_>) -> Option<Rect> {
    if let Some(view_box) = root.attribute("viewBox") {
        return match parse_numbers(view_box)?.as_slice() {
            &[x, y, w, h] if w >= 0.0 && h >= 0.0 => Some(Rect::from_origin_size((x, y), (w, h))),
            _ => None,
        };
    }
    let width = parse_length(root.attribute("width")?)?;
    let height = parse_length(root.attribute("height")?)?;
    (width >= 0.0 && height >= 0.0).then(|| Rect::new(0.0, 0.0, width, height))
}

/// Byte range of the start tag beginning at `start`.
fn start_tag_span(markup: &str, start: usize) -> Option<Range<usize>> {
    let mut quote = None;
    for (offset, byte) in markup.as_bytes().get(start..)?.iter().copied().enumerate() {
        match (quote, byte) {
            (None, b'"' | b'\'') => quote = Some(byte),
            (Some(q), b) if q == b => quote = None,
            (None, b'>') => return Some(start..start + offset + 1),
            _ => {}
        }
    }
    None
}

/// Span of attribute `name="..."` within a start tag.
fn find_attribute(tag: &str, name: &str) -> Option<Range<usize>> {
    let bytes = tag.as_bytes();
    let len = bytes.len();
    let is_space = |b: u8| b.is_ascii_whitespace();
    let is_end = |b: u8| b == b'>' || b == b'/';

    let mut i = 1;
    while i < len && !is_space(bytes[i]) && !is_end(bytes[i]) {
        i += 1;
    }
    loop {
        while i < len && is_space(bytes[i]) {
            i += 1;
        }
        if i >= len || is_end(bytes[i]) {
            return None;
        }
        let name_start = i;
        while i < len && !is_space(bytes[i]) && bytes[i] != b'=' && !is_end(bytes[i]) {
            i += 1;
        }
        let name_end = i;
        while i < len && is_space(bytes[i]) {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            return None;
        }
        i += 1;
        while i < len && is_space(bytes[i]) {
            i += 1;
        }
        let quote = *bytes.get(i)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        i += 1;
        while i < len && bytes[i] != quote {
            i += 1;
        }
        i += 1;
        if &tag[name_start..name_end] == name {
            return Some(name_start..i.min(len));
        }
    }
}

impl VectorDocument {
    /// Parse template markup.
    ///
    /// The print area is the single element whose `id` equals
    /// `print_area_id` or that carries a `data-print-area` attribute. A
    /// missing or repeated tag leaves the print area unknown.
    pub fn parse(markup: &str, print_area_id: &str) -> RenderResult<Self> {
        let doc =
            roxmltree::Document::parse(markup).map_err(|e| RenderError::Parse(e.to_string()))?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(RenderError::NotSvg(root.tag_name().name().to_string()));
        }
        let viewport = intrinsic_viewport(root).ok_or(RenderError::NoViewport)?;

        let tagged: Vec<Node<'_, '_>> = root
            .descendants()
            .filter(|n| n.is_element())
            .filter(|n| {
                n.attribute("id") == Some(print_area_id) || n.has_attribute("data-print-area")
            })
            .collect();
        let print_area = match tagged.as_slice() {
            [node] => {
                let bbox = element_bbox(*node);
                if bbox.is_none() {
                    log::warn!(
                        "Print area <{}> has no measurable geometry",
                        node.tag_name().name()
                    );
                }
                bbox
            }
            [] => {
                log::warn!("Template has no print area tagged {:?}", print_area_id);
                None
            }
            many => {
                log::warn!("Template tags {} elements as print area, expected one", many.len());
                None
            }
        };

        let inherit_sites: usize = root
            .descendants()
            .filter(|n| n.is_element())
            .map(count_inherit_sites)
            .sum();
        if inherit_sites == 0 {
            log::warn!("Template has no currentColor paints; garment color will not show");
        }

        let root_tag = start_tag_span(markup, root.range().start)
            .ok_or_else(|| RenderError::Parse("unterminated root tag".to_string()))?;

        log::debug!(
            "Parsed template: viewport {:?}, print area {:?}, {} inherit sites",
            viewport,
            print_area,
            inherit_sites
        );

        Ok(Self {
            markup: markup.to_string(),
            root_tag,
            viewport,
            print_area,
            inherit_sites,
        })
    }

    /// Intrinsic coordinate system.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Print-area bounds in intrinsic coordinates, if exactly one was tagged.
    pub fn print_area(&self) -> Option<Rect> {
        self.print_area
    }

    /// How many paints inherit the garment color.
    pub fn inherit_sites(&self) -> usize {
        self.inherit_sites
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Apply `color` as the root element's `color` attribute.
    ///
    /// Shapes painted with `currentColor` pick it up; nothing else in the
    /// markup changes.
    pub fn render(&self, color: HexColor) -> RenderedTemplate {
        let tag = &self.markup[self.root_tag.clone()];
        let attribute = format!("color=\"{}\"", color);

        let new_tag = match find_attribute(tag, "color") {
            Some(span) => format!("{}{}{}", &tag[..span.start], attribute, &tag[span.end..]),
            None => {
                let insert_at = if tag.ends_with("/>") { tag.len() - 2 } else { tag.len() - 1 };
                format!("{} {}{}", tag[..insert_at].trim_end(), attribute, &tag[insert_at..])
            }
        };

        let mut markup = String::with_capacity(self.markup.len() + attribute.len() + 1);
        markup.push_str(&self.markup[..self.root_tag.start]);
        markup.push_str(&new_tag);
        markup.push_str(&self.markup[self.root_tag.end..]);

        RenderedTemplate {
            markup,
            color,
            viewport: self.viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teeforge_core::template::TemplateStore;

    const RED: HexColor = HexColor::new(0xEF, 0x44, 0x44);

    fn builtin(key: &str) -> VectorDocument {
        let resource = TemplateStore::builtin().resolve(key).unwrap();
        VectorDocument::parse(resource.inline_markup().unwrap(), "print-area").unwrap()
    }

    #[test]
    fn test_builtin_templates_parse() {
        let front = builtin("tshirt-front");
        assert_eq!(front.viewport(), Rect::new(0.0, 0.0, 400.0, 480.0));
        assert_eq!(front.print_area(), Some(Rect::new(120.0, 110.0, 280.0, 330.0)));
        assert_eq!(front.inherit_sites(), 1);

        let sleeve = builtin("tshirt-sleeve-left");
        assert_eq!(sleeve.print_area(), Some(Rect::new(70.0, 60.0, 170.0, 130.0)));
    }

    #[test]
    fn test_render_adds_root_color() {
        let doc = VectorDocument::parse(
            r#"<svg viewBox="0 0 10 10"><path d="M0 0 L1 1" fill="currentColor"/></svg>"#,
            "print-area",
        )
        .unwrap();
        let rendered = doc.render(RED);
        assert_eq!(
            rendered.markup,
            concat!(
                r##"<svg viewBox="0 0 10 10" color="#ef4444">"##,
                r#"<path d="M0 0 L1 1" fill="currentColor"/></svg>"#,
            )
        );
    }

    #[test]
    fn test_render_replaces_existing_color() {
        let markup = r#"<svg color='#000' viewBox="0 0 10 10">
            <rect width="1" height="1" style="fill: currentColor"/>
        </svg>"#;
        let doc = VectorDocument::parse(markup, "print-area").unwrap();
        assert_eq!(doc.inherit_sites(), 1);
        let rendered = doc.render(RED);
        assert!(rendered.markup.starts_with(r##"<svg color="#ef4444" viewBox="0 0 10 10">"##));
        assert_eq!(rendered.markup.matches("color=").count(), 1);
    }

    #[test]
    fn test_render_only_touches_root() {
        let front = builtin("tshirt-front");
        let a = front.render(RED);
        let b = front.render(HexColor::new(0x1F, 0x29, 0x37));
        assert_eq!(a.markup.len(), b.markup.len());
        assert!(b.markup.contains(r##"color="#1f2937""##));
        // Per-shape paints are left alone.
        assert_eq!(a.markup.matches(r#"fill="currentColor""#).count(), 1);
    }

    #[test]
    fn test_render_self_closing_root() {
        let doc = VectorDocument::parse(r#"<svg width="10" height="20"/>"#, "print-area").unwrap();
        assert_eq!(doc.viewport(), Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(doc.render(RED).markup, r##"<svg width="10" height="20" color="#ef4444"/>"##);
    }

    #[test]
    fn test_print_area_missing_or_duplicate() {
        let missing = VectorDocument::parse(r#"<svg viewBox="0 0 10 10"/>"#, "print-area").unwrap();
        assert_eq!(missing.print_area(), None);

        let markup = r#"<svg viewBox="0 0 10 10">
            <rect id="print-area" width="1" height="1"/>
            <rect data-print-area="" width="2" height="2"/>
        </svg>"#;
        let duplicate = VectorDocument::parse(markup, "print-area").unwrap();
        assert_eq!(duplicate.print_area(), None);
    }

    #[test]
    fn test_custom_print_area_id() {
        let doc = VectorDocument::parse(
            r#"<svg viewBox="0 0 10 10"><circle id="zone" cx="5" cy="5" r="2"/></svg>"#,
            "zone",
        )
        .unwrap();
        assert_eq!(doc.print_area(), Some(Rect::new(3.0, 3.0, 7.0, 7.0)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            VectorDocument::parse("<svg", "print-area"),
            Err(RenderError::Parse(_))
        ));
        assert!(matches!(
            VectorDocument::parse("<html/>", "print-area"),
            Err(RenderError::NotSvg(_))
        ));
        assert!(matches!(
            VectorDocument::parse("<svg/>", "print-area"),
            Err(RenderError::NoViewport)
        ));
    }

    #[test]
    fn test_find_attribute_skips_quoted_values() {
        let tag = r#"<svg data-x="color='x'" color="red">"#;
        let span = find_attribute(tag, "color").unwrap();
        assert_eq!(&tag[span], r#"color="red""#);
    }
}
