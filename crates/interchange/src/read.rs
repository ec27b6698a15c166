use crate::values::{self, Paint};
use crate::{ParseError, ParseWarning, BACKGROUND_ROLE, SVG_NAMESPACE};
use log::warn;
use node::{
    Color, Document, DocumentId, Element, ElementId, ElementKind, IdGenerator, PathData, Point, Style, Transform,
};
use roxmltree::{Node, ParsingOptions};
use std::collections::HashSet;

/// Font size used when a `text` element does not set one.
const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Reserved as the generator's ceiling; markup ids equal to it are
/// reassigned.
const RESERVED_ID: ElementId = ElementId::from_raw(u64::MAX);

/// A document read from markup, with everything that was skipped or
/// repaired along the way.
#[derive(Clone, Debug)]
pub struct Parsed {
    pub document: Document,
    pub warnings: Vec<ParseWarning>,
}

/// Reads SVG markup.
///
/// Unsupported elements are dropped together with their content and
/// reported as warnings. Invalid values for supported attributes are
/// errors.
pub fn from_markup(text: &str) -> Result<Parsed, ParseError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let xml = roxmltree::Document::parse_with_options(text, options).map_err(|err| {
        let pos = err.pos();
        ParseError::Malformed {
            row: pos.row,
            col: pos.col,
            message: err.to_string(),
        }
    })?;

    let root = xml.root_element();
    if root.tag_name().name() != "svg" {
        return Err(ParseError::NotSvg(root.tag_name().name().to_string()));
    }

    Reader::new(&xml, root).read(root)
}

/// Paint properties that flow from a group to its children.
#[derive(Clone, Copy)]
struct Inherited {
    fill: Option<Color>,
    stroke: Option<Color>,
    stroke_width: f64,
}

impl Default for Inherited {
    fn default() -> Self {
        let style = Style::default();
        Self {
            fill: style.fill,
            stroke: style.stroke,
            stroke_width: style.stroke_width,
        }
    }
}

struct Reader<'a, 'input> {
    xml: &'a roxmltree::Document<'input>,
    ids: IdGenerator,
    taken: HashSet<ElementId>,
    warnings: Vec<ParseWarning>,
}

impl<'a, 'input> Reader<'a, 'input> {
    fn new(xml: &'a roxmltree::Document<'input>, root: Node<'a, 'input>) -> Self {
        let max = root
            .descendants()
            .filter_map(|node| node.attribute("id")?.parse::<ElementId>().ok())
            .filter(|id| *id != RESERVED_ID)
            .max();
        Self {
            xml,
            ids: IdGenerator::after(max),
            taken: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    fn read(mut self, root: Node<'a, 'input>) -> Result<Parsed, ParseError> {
        let view_box = root
            .attribute("viewBox")
            .map(|value| values::view_box(value).map_err(|reason| self.invalid(root, "viewBox", value, reason)))
            .transpose()?;
        let width = self.dimension(root, "width", view_box.map(|b| b[2]), Document::DEFAULT_WIDTH)?;
        let height = self.dimension(root, "height", view_box.map(|b| b[3]), Document::DEFAULT_HEIGHT)?;

        let mut name = None;
        let mut background = None;
        let mut elements = Vec::new();
        for node in root.children().filter(Node::is_element) {
            let tag = node.tag_name().name();
            if tag == "title" && name.is_none() {
                name = Some(node.text().unwrap_or_default().to_string());
            } else if tag == "rect" && background.is_none() && node.attribute("data-role") == Some(BACKGROUND_ROLE) {
                background = Some(self.background(node)?);
            } else if let Some(element) = self.element(node, Inherited::default())? {
                elements.push(element);
            }
        }

        let document = Document {
            id: DocumentId::new(),
            name: name.unwrap_or_else(|| Document::DEFAULT_NAME.to_string()),
            width,
            height,
            background: background.unwrap_or(Document::DEFAULT_BACKGROUND),
            elements,
        };
        Ok(Parsed {
            document,
            warnings: self.warnings,
        })
    }

    /// Reads `width`/`height`, falling back to the viewBox and then the
    /// default. Percentages defer to the fallback.
    fn dimension(
        &self,
        root: Node,
        attribute: &str,
        fallback: Option<f64>,
        default: f64,
    ) -> Result<f64, ParseError> {
        let explicit = match root.attribute(attribute) {
            Some(value) if !value.trim_end().ends_with('%') => Some(
                values::length(value).map_err(|reason| self.invalid(root, attribute, value, reason))?,
            ),
            _ => None,
        };
        let value = explicit.or(fallback).unwrap_or(default);
        if value <= 0.0 {
            let text = root.attribute(attribute).unwrap_or_default();
            return Err(self.invalid(root, attribute, text, "must be positive".into()));
        }
        Ok(value)
    }

    fn background(&mut self, node: Node) -> Result<Color, ParseError> {
        let style = self.style(node, Inherited::default())?;
        Ok(style.fill.unwrap_or(Color::TRANSPARENT))
    }

    fn element(&mut self, node: Node<'a, 'input>, inherited: Inherited) -> Result<Option<Element>, ParseError> {
        let tag = node.tag_name();
        if !matches!(tag.namespace(), None | Some(SVG_NAMESPACE)) {
            self.skip(node);
            return Ok(None);
        }

        let kind = match tag.name() {
            "rect" => ElementKind::Rect {
                x: self.number(node, "x", 0.0)?,
                y: self.number(node, "y", 0.0)?,
                width: self.non_negative(node, "width", 0.0)?,
                height: self.non_negative(node, "height", 0.0)?,
                rx: match node.attribute("rx") {
                    Some(_) => self.non_negative(node, "rx", 0.0)?,
                    None => self.non_negative(node, "ry", 0.0)?,
                },
            },
            "circle" => ElementKind::Circle {
                cx: self.number(node, "cx", 0.0)?,
                cy: self.number(node, "cy", 0.0)?,
                r: self.non_negative(node, "r", 0.0)?,
            },
            "ellipse" => ElementKind::Ellipse {
                cx: self.number(node, "cx", 0.0)?,
                cy: self.number(node, "cy", 0.0)?,
                rx: self.non_negative(node, "rx", 0.0)?,
                ry: self.non_negative(node, "ry", 0.0)?,
            },
            "path" => {
                let d = node.attribute("d").unwrap_or_default();
                let data = d
                    .parse::<PathData>()
                    .map_err(|err| self.invalid(node, "d", d, err.to_string()))?;
                ElementKind::Path { data }
            }
            "line" => {
                let from = Point::new(self.number(node, "x1", 0.0)?, self.number(node, "y1", 0.0)?);
                let to = Point::new(self.number(node, "x2", 0.0)?, self.number(node, "y2", 0.0)?);
                ElementKind::Path {
                    data: PathData::polyline(&[from, to], false),
                }
            }
            "polyline" | "polygon" => {
                let raw = node.attribute("points").unwrap_or_default();
                let points = values::points(raw).map_err(|reason| self.invalid(node, "points", raw, reason))?;
                ElementKind::Path {
                    data: PathData::polyline(&points, tag.name() == "polygon"),
                }
            }
            "text" => {
                let font_size = self.number(node, "font-size", DEFAULT_FONT_SIZE)?;
                if font_size <= 0.0 {
                    let raw = node.attribute("font-size").unwrap_or_default();
                    return Err(self.invalid(node, "font-size", raw, "must be positive".into()));
                }
                ElementKind::Text {
                    x: self.number(node, "x", 0.0)?,
                    y: self.number(node, "y", 0.0)?,
                    content: node
                        .descendants()
                        .filter(Node::is_text)
                        .filter_map(|text| text.text())
                        .collect(),
                    font_size,
                }
            }
            "g" => ElementKind::Group,
            _ => {
                self.skip(node);
                return Ok(None);
            }
        };

        let id = self.resolve_id(node);
        let style = self.style(node, inherited)?;
        let transform = match node.attribute("transform") {
            Some(raw) => raw
                .parse::<Transform>()
                .map_err(|err| self.invalid(node, "transform", raw, err.to_string()))?,
            None => Transform::IDENTITY,
        };

        let mut element = Element::new(id, kind).with_style(style).with_transform(transform);
        if element.is_group() {
            let inherited = Inherited {
                fill: style.fill,
                stroke: style.stroke,
                stroke_width: style.stroke_width,
            };
            for child in node.children().filter(Node::is_element) {
                if let Some(child) = self.element(child, inherited)? {
                    element.children.push(child);
                }
            }
        } else if tag.name() != "text" && node.children().any(|child| child.is_element()) {
            self.warn(node, format!("ignored child elements of <{}>", tag.name()));
        }

        Ok(Some(element))
    }

    /// Presentation attributes first, then `style` declarations, which
    /// take precedence.
    fn style(&mut self, node: Node, inherited: Inherited) -> Result<Style, ParseError> {
        let mut style = Style {
            fill: inherited.fill,
            stroke: inherited.stroke,
            stroke_width: inherited.stroke_width,
            opacity: 1.0,
        };
        let mut fill_opacity = None;
        let mut stroke_opacity = None;

        let attributes = node.attributes().map(|attr| (attr.name(), attr.value()));
        let declarations = node.attribute("style").into_iter().flat_map(values::declarations);
        for (name, value) in attributes.chain(declarations) {
            let result = match name {
                "fill" => values::paint(value).map(|paint| style.fill = self.paint(node, name, paint)),
                "stroke" => values::paint(value).map(|paint| style.stroke = self.paint(node, name, paint)),
                "stroke-width" => values::length(value).and_then(|width| {
                    if width < 0.0 {
                        return Err("must not be negative".into());
                    }
                    style.stroke_width = width;
                    Ok(())
                }),
                "opacity" => values::opacity(value).map(|opacity| style.opacity = opacity),
                "fill-opacity" => values::opacity(value).map(|opacity| fill_opacity = Some(opacity)),
                "stroke-opacity" => values::opacity(value).map(|opacity| stroke_opacity = Some(opacity)),
                _ => Ok(()),
            };
            result.map_err(|reason| self.invalid(node, name, value, reason))?;
        }

        style.fill = style.fill.map(|color| with_opacity(color, fill_opacity));
        style.stroke = style.stroke.map(|color| with_opacity(color, stroke_opacity));
        Ok(style)
    }

    fn paint(&mut self, node: Node, attribute: &str, paint: Paint) -> Option<Color> {
        match paint {
            Paint::None => None,
            Paint::Color(color) => Some(color),
            Paint::Reference => {
                self.warn(node, format!("paint server in `{}` is not supported, using none", attribute));
                None
            }
        }
    }

    fn resolve_id(&mut self, node: Node) -> ElementId {
        let raw = node.attribute("id");
        if let Some(Ok(id)) = raw.map(str::parse::<ElementId>) {
            if id != RESERVED_ID && self.taken.insert(id) {
                return id;
            }
        }

        let id = self.fresh_id();
        self.taken.insert(id);
        let message = match raw {
            None => format!("<{}> has no id, assigned {}", node.tag_name().name(), id),
            Some(raw) => format!("id `{}` is foreign or already used, replaced with {}", raw, id),
        };
        self.warn(node, message);
        id
    }

    /// The next generated id, or the lowest free one once the generator
    /// has reached the top of the range.
    fn fresh_id(&mut self) -> ElementId {
        let id = self.ids.next_id();
        if id != RESERVED_ID && !self.taken.contains(&id) {
            return id;
        }
        let mut raw = 1;
        while self.taken.contains(&ElementId::from_raw(raw)) {
            raw += 1;
        }
        ElementId::from_raw(raw)
    }

    fn number(&self, node: Node, attribute: &str, default: f64) -> Result<f64, ParseError> {
        match node.attribute(attribute) {
            Some(raw) => values::length(raw).map_err(|reason| self.invalid(node, attribute, raw, reason)),
            None => Ok(default),
        }
    }

    fn non_negative(&self, node: Node, attribute: &str, default: f64) -> Result<f64, ParseError> {
        let value = self.number(node, attribute, default)?;
        if value < 0.0 {
            let raw = node.attribute(attribute).unwrap_or_default();
            return Err(self.invalid(node, attribute, raw, "must not be negative".into()));
        }
        Ok(value)
    }

    fn skip(&mut self, node: Node) {
        let message = format!("skipped unsupported element <{}>", node.tag_name().name());
        self.warn(node, message);
    }

    fn warn(&mut self, node: Node, message: String) {
        let pos = self.xml.text_pos_at(node.range().start);
        warn!("{}:{}: {}", pos.row, pos.col, message);
        self.warnings.push(ParseWarning {
            row: pos.row,
            col: pos.col,
            message,
        });
    }

    fn invalid(&self, node: Node, attribute: &str, value: &str, reason: String) -> ParseError {
        let pos = self.xml.text_pos_at(node.range().start);
        ParseError::InvalidAttribute {
            row: pos.row,
            col: pos.col,
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            reason,
        }
    }
}

/// Folds a `*-opacity` value into the color's alpha channel.
fn with_opacity(color: Color, opacity: Option<f64>) -> Color {
    match opacity {
        Some(opacity) => {
            let alpha = (f64::from(color.a) * opacity).round() as u8;
            Color::rgba(color.r, color.g, color.b, alpha)
        }
        None => color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_markup;
    use proptest::prelude::*;

    fn id(n: u64) -> ElementId {
        ElementId::from_raw(n)
    }

    fn parse(markup: &str) -> Parsed {
        from_markup(markup).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_document() {
        let original = Document::new("Poster", 640.0, 480.0, Color::rgb(250, 250, 240))
            .unwrap()
            .with_elements(vec![
                Element::rect(id(1), 10.0, 10.0, 100.0, 50.0)
                    .with_corner_radius(4.0)
                    .with_fill(Some(Color::rgba(255, 0, 0, 200))),
                Element::group(
                    id(2),
                    vec![
                        Element::circle(id(3), 1.0 / 3.0, 2.5, 7.25)
                            .with_stroke(Some(Color::rgb(0, 0, 255)), 1.5)
                            .with_transform(Transform::rotate(30.0)),
                        Element::ellipse(id(4), 0.0, 0.0, 3.0, 4.0).with_opacity(0.3),
                        Element::path(id(5), "M0 0 C 1 2 3 4 5 6 A 5 5 0 0 1 10 10 Z".parse().unwrap())
                            .with_fill(None)
                            .with_stroke(Some(Color::BLACK), 0.0),
                    ],
                )
                .with_transform(Transform::translate(20.0, -4.5)),
                Element::text(id(6), 5.0, 30.0, "Hello <world> & \"friends\"", 18.0),
            ]);

        let markup = to_markup(&original).unwrap();
        let parsed = parse(&markup);

        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        assert!(parsed.document.approx_eq(&original, 1e-6), "{}", markup);
    }

    #[test]
    fn test_top_of_id_range_is_reassigned() {
        let markup = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <rect id="e18446744073709551615" width="1" height="1"/>
  <rect width="1" height="1"/>
</svg>"#;
        let parsed = parse(markup);
        let ids: Vec<_> = parsed.document.elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![id(1), id(2)]);
        assert_eq!(parsed.warnings.len(), 2);
        assert!(parsed.warnings[0].message.contains("e18446744073709551615"));
        assert!(parsed.document.validate().is_ok());
    }

    #[test]
    fn test_ids_stay_unique_below_the_top_of_the_range() {
        let markup = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <rect id="e18446744073709551614" width="1" height="1"/>
  <rect width="1" height="1"/>
  <rect width="1" height="1"/>
</svg>"#;
        let parsed = parse(markup);
        let ids: Vec<_> = parsed.document.elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![id(u64::MAX - 1), id(1), id(2)]);
        assert!(parsed.document.validate().is_ok());
    }

    #[test]
    fn test_non_finite_path_data_is_rejected() {
        let markup = "<svg xmlns=\"http://www.w3.org/2000/svg\">\n  <path id=\"e1\" d=\"M 0 0 L 1e999 0\"/>\n</svg>";
        match from_markup(markup).unwrap_err() {
            ParseError::InvalidAttribute {
                row, element, attribute, ..
            } => {
                assert_eq!(row, 2);
                assert_eq!(element, "path");
                assert_eq!(attribute, "d");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_carriage_returns_survive_round_trip() {
        let original = Document::new("left\r\nright", 100.0, 100.0, Color::WHITE)
            .unwrap()
            .with_elements(vec![
                Element::text(id(1), 0.0, 10.0, "a\r\nb", 12.0),
                Element::text(id(2), 0.0, 30.0, "\r", 12.0),
                Element::text(id(3), 0.0, 50.0, "  padded\t ", 12.0),
            ]);

        let parsed = parse(&to_markup(&original).unwrap()).document;
        assert_eq!(parsed.name, "left\r\nright");
        assert!(matches!(&parsed.elements[0].kind, ElementKind::Text { content, .. } if content == "a\r\nb"));
        assert!(parsed.approx_eq(&original, 1e-9));
    }

    #[test]
    fn test_malformed_markup_reports_position() {
        let err = from_markup("<svg xmlns=\"http://www.w3.org/2000/svg\">\n  <rect></svg>").unwrap_err();
        match err {
            ParseError::Malformed { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_root_must_be_svg() {
        assert_eq!(from_markup("<html/>").unwrap_err(), ParseError::NotSvg("html".into()));
    }

    #[test]
    fn test_invalid_attribute_reports_position() {
        let markup = "<svg xmlns=\"http://www.w3.org/2000/svg\">\n  <circle id=\"e1\" r=\"-2\"/>\n</svg>";
        match from_markup(markup).unwrap_err() {
            ParseError::InvalidAttribute {
                row,
                col,
                element,
                attribute,
                value,
                ..
            } => {
                assert_eq!((row, col), (2, 3));
                assert_eq!(element, "circle");
                assert_eq!(attribute, "r");
                assert_eq!(value, "-2");
            }
            other => panic!("unexpected error {:?}", other),
        }

        let markup = "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect transform=\"spin(3)\"/></svg>";
        assert!(matches!(
            from_markup(markup),
            Err(ParseError::InvalidAttribute { ref attribute, .. }) if attribute == "transform"
        ));
    }

    #[test]
    fn test_unsupported_elements_are_skipped_with_warning() {
        let markup = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <rect id="e1" width="5" height="5"/>
  <image id="e2" href="cat.png"/>
  <g id="e3">
    <foreignObject><div/></foreignObject>
    <circle id="e4" r="1"/>
  </g>
</svg>"#;
        let parsed = parse(markup);
        let ids: Vec<_> = parsed.document.walk().map(|e| e.id).collect();
        assert_eq!(ids, vec![id(1), id(3), id(4)]);
        assert_eq!(parsed.warnings.len(), 2);
        assert_eq!(parsed.warnings[0].row, 3);
        assert!(parsed.warnings[0].message.contains("<image>"));
        assert!(parsed.warnings[1].message.contains("<foreignObject>"));
    }

    #[test]
    fn test_interop_shapes_and_inline_style() {
        let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 200">
  <line x1="0" y1="0" x2="10px" y2="10"/>
  <polygon points="0,0 10,0 10,10" style="fill: #00ff00; stroke:red ; stroke-width: 3"/>
  <g fill="blue"><rect width="1" height="1" fill-opacity="0.5"/></g>
</svg>"#;
        let parsed = parse(markup);
        let doc = &parsed.document;
        assert_eq!((doc.width, doc.height), (300.0, 200.0));
        assert_eq!(doc.name, Document::DEFAULT_NAME);
        assert_eq!(doc.background, Color::WHITE);

        match &doc.elements[0].kind {
            ElementKind::Path { data } => assert_eq!(data.to_string(), "M 0 0 L 10 10"),
            other => panic!("expected path, got {:?}", other),
        }
        let polygon = &doc.elements[1];
        assert_eq!(polygon.style.fill, Some(Color::rgb(0, 255, 0)));
        assert_eq!(polygon.style.stroke, Some(Color::rgb(255, 0, 0)));
        assert_eq!(polygon.style.stroke_width, 3.0);
        assert!(matches!(&polygon.kind, ElementKind::Path { data } if data.to_string().ends_with('Z')));

        let rect = &doc.elements[2].children[0];
        assert_eq!(rect.style.fill, Some(Color::rgba(0, 0, 255, 128)));
    }

    #[test]
    fn test_missing_and_duplicate_ids_are_reassigned() {
        let markup = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <rect id="e7" width="1" height="1"/>
  <rect id="e7" width="1" height="1"/>
  <rect id="logo" width="1" height="1"/>
  <rect width="1" height="1"/>
</svg>"#;
        let parsed = parse(markup);
        let ids: Vec<_> = parsed.document.elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![id(7), id(8), id(9), id(10)]);
        assert_eq!(parsed.warnings.len(), 3);
        assert!(parsed.document.validate().is_ok());
    }

    #[test]
    fn test_background_and_title() {
        let markup = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100px" height="50">
  <title>Badge</title>
  <rect data-role="background" width="100" height="50" fill="#123456"/>
</svg>"##;
        let doc = parse(markup).document;
        assert_eq!(doc.name, "Badge");
        assert_eq!(doc.background, Color::rgb(0x12, 0x34, 0x56));
        assert_eq!((doc.width, doc.height), (100.0, 50.0));
        assert!(doc.elements.is_empty());
    }

    #[test]
    fn test_rejects_non_positive_size() {
        let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" width="0" height="10"/>"#;
        assert!(matches!(
            from_markup(markup),
            Err(ParseError::InvalidAttribute { ref attribute, .. }) if attribute == "width"
        ));
    }

    fn paint() -> impl Strategy<Value = Option<Color>> {
        prop::option::of(any::<[u8; 4]>().prop_map(|[r, g, b, a]| Color::rgba(r, g, b, a)))
    }

    fn style() -> impl Strategy<Value = Style> {
        (paint(), paint(), 0.0..20.0f64, 0.0..=1.0f64).prop_map(|(fill, stroke, stroke_width, opacity)| Style {
            fill,
            stroke,
            stroke_width,
            opacity,
        })
    }

    fn coordinate() -> impl Strategy<Value = f64> {
        -1.0e6..1.0e6f64
    }

    fn size() -> impl Strategy<Value = f64> {
        0.0..1.0e4f64
    }

    fn translation() -> impl Strategy<Value = Transform> {
        (coordinate(), coordinate()).prop_map(|(x, y)| Transform::translate(x, y))
    }

    /// Leaf shapes with placeholder ids; `number_ids` fixes them up.
    fn shape() -> impl Strategy<Value = Element> {
        let placeholder = id(0);
        prop_oneof![
            (coordinate(), coordinate(), size(), size(), size()).prop_map(move |(x, y, w, h, rx)| {
                Element::rect(placeholder, x, y, w, h).with_corner_radius(rx)
            }),
            (coordinate(), coordinate(), size()).prop_map(move |(cx, cy, r)| Element::circle(placeholder, cx, cy, r)),
            (coordinate(), coordinate(), size(), size())
                .prop_map(move |(cx, cy, rx, ry)| Element::ellipse(placeholder, cx, cy, rx, ry)),
            (prop::collection::vec((coordinate(), coordinate()), 1..5), any::<bool>()).prop_map(
                move |(points, closed)| {
                    let points: Vec<_> = points.into_iter().map(|(x, y)| Point::new(x, y)).collect();
                    Element::path(placeholder, PathData::polyline(&points, closed))
                }
            ),
            (coordinate(), coordinate(), "[a-z <>&\"'\r\n\t]{0,12}", 0.5..100.0f64).prop_map(
                move |(x, y, content, font_size)| Element::text(placeholder, x, y, content, font_size)
            ),
        ]
    }

    fn element() -> impl Strategy<Value = Element> {
        let leaf = (shape(), style(), translation())
            .prop_map(|(element, style, transform)| element.with_style(style).with_transform(transform));
        leaf.prop_recursive(3, 24, 4, |inner| {
            (prop::collection::vec(inner, 0..4), style(), translation()).prop_map(|(children, style, transform)| {
                Element::group(id(0), children)
                    .with_style(style)
                    .with_transform(transform)
            })
        })
    }

    fn number_ids(element: &mut Element, next: &mut u64) {
        element.id = id(*next);
        *next += 1;
        for child in &mut element.children {
            number_ids(child, next);
        }
    }

    fn document() -> impl Strategy<Value = Document> {
        (
            "[a-zA-Z0-9 <&\r\n]{0,12}",
            1.0..5000.0f64,
            1.0..5000.0f64,
            any::<[u8; 4]>(),
            prop::collection::vec(element(), 0..5),
        )
            .prop_map(|(name, width, height, [r, g, b, a], mut elements)| {
                let mut next = 1;
                for element in &mut elements {
                    number_ids(element, &mut next);
                }
                Document {
                    id: DocumentId::new(),
                    name,
                    width,
                    height,
                    background: Color::rgba(r, g, b, a),
                    elements,
                }
            })
    }

    proptest! {
        /// Writing any valid document and reading it back gives the same
        /// document without warnings.
        #[test]
        fn prop_markup_round_trip(original in document()) {
            prop_assert!(original.validate().is_ok());
            let markup = to_markup(&original).unwrap();
            let parsed = from_markup(&markup).unwrap();
            prop_assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
            prop_assert!(parsed.document.approx_eq(&original, 1e-9), "{}", markup);
        }
    }
}
