use crate::error::{finite, non_negative, positive};
use crate::{Bounds, Color, ElementId, PathData, Point, Style, Transform, ValidationError};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use svg_core::approx_eq;

/// Average glyph advance as a fraction of the font size, used to estimate
/// text extents without font metrics.
const TEXT_ADVANCE: f64 = 0.6;

/// The markup tag of each element kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ElementTag {
    Rect,
    Circle,
    Ellipse,
    Path,
    Text,
    #[strum(serialize = "g")]
    Group,
}

/// Geometry of an element, one variant per supported shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        rx: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },
    Path {
        data: PathData,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        font_size: f64,
    },
    Group,
}

impl ElementKind {
    pub fn tag(&self) -> ElementTag {
        match self {
            ElementKind::Rect { .. } => ElementTag::Rect,
            ElementKind::Circle { .. } => ElementTag::Circle,
            ElementKind::Ellipse { .. } => ElementTag::Ellipse,
            ElementKind::Path { .. } => ElementTag::Path,
            ElementKind::Text { .. } => ElementTag::Text,
            ElementKind::Group => ElementTag::Group,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ElementKind::Group)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ElementKind::Rect {
                x,
                y,
                width,
                height,
                rx,
            } => {
                finite("x", *x)?;
                finite("y", *y)?;
                non_negative("width", *width)?;
                non_negative("height", *height)?;
                non_negative("corner radius", *rx)
            }
            ElementKind::Circle { cx, cy, r } => {
                finite("cx", *cx)?;
                finite("cy", *cy)?;
                non_negative("radius", *r)
            }
            ElementKind::Ellipse { cx, cy, rx, ry } => {
                finite("cx", *cx)?;
                finite("cy", *cy)?;
                non_negative("rx", *rx)?;
                non_negative("ry", *ry)
            }
            ElementKind::Path { data } => data.validate(),
            ElementKind::Text {
                x, y, font_size, ..
            } => {
                finite("x", *x)?;
                finite("y", *y)?;
                positive("font size", *font_size)
            }
            ElementKind::Group => Ok(()),
        }
    }

    /// Bounds of the bare geometry in the element's own coordinate space.
    ///
    /// Groups have no geometry of their own and return `None`, as does an
    /// empty path.
    pub fn local_bounds(&self) -> Option<Bounds> {
        match self {
            ElementKind::Rect {
                x,
                y,
                width,
                height,
                ..
            } => Some(Bounds::from_origin_size(
                Point::new(*x, *y),
                DVec2::new(*width, *height),
            )),
            ElementKind::Circle { cx, cy, r } => Some(Bounds::from_center_half_size(
                Point::new(*cx, *cy),
                DVec2::splat(*r),
            )),
            ElementKind::Ellipse { cx, cy, rx, ry } => Some(Bounds::from_center_half_size(
                Point::new(*cx, *cy),
                DVec2::new(*rx, *ry),
            )),
            ElementKind::Path { data } => data.bounds(),
            // `y` is the baseline; the box extends one font size above it.
            ElementKind::Text {
                x,
                y,
                content,
                font_size,
            } => {
                let width = content.chars().count() as f64 * font_size * TEXT_ADVANCE;
                Some(Bounds::from_origin_size(
                    Point::new(*x, *y - font_size),
                    DVec2::new(width, *font_size),
                ))
            }
            ElementKind::Group => None,
        }
    }

    fn numbers(&self) -> Vec<f64> {
        match self {
            ElementKind::Rect {
                x,
                y,
                width,
                height,
                rx,
            } => vec![*x, *y, *width, *height, *rx],
            ElementKind::Circle { cx, cy, r } => vec![*cx, *cy, *r],
            ElementKind::Ellipse { cx, cy, rx, ry } => vec![*cx, *cy, *rx, *ry],
            ElementKind::Text { x, y, font_size, .. } => vec![*x, *y, *font_size],
            ElementKind::Path { .. } | ElementKind::Group => Vec::new(),
        }
    }

    pub fn approx_eq(&self, other: &ElementKind, tolerance: f64) -> bool {
        if self.tag() != other.tag() {
            return false;
        }
        let same_extra = match (self, other) {
            (ElementKind::Path { data: a }, ElementKind::Path { data: b }) => {
                a.approx_eq(b, tolerance)
            }
            (ElementKind::Text { content: a, .. }, ElementKind::Text { content: b, .. }) => a == b,
            _ => true,
        };
        same_extra
            && self
                .numbers()
                .iter()
                .zip(other.numbers().iter())
                .all(|(a, b)| approx_eq(*a, *b, tolerance))
    }
}

/// A node of the document tree.
///
/// Only groups may carry children; the order of `children` is z-order,
/// first child at the bottom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Transform::is_identity")]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            style: Style::default(),
            transform: Transform::IDENTITY,
            children: Vec::new(),
        }
    }

    pub fn rect(id: ElementId, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            id,
            ElementKind::Rect {
                x,
                y,
                width,
                height,
                rx: 0.0,
            },
        )
    }

    pub fn circle(id: ElementId, cx: f64, cy: f64, r: f64) -> Self {
        Self::new(id, ElementKind::Circle { cx, cy, r })
    }

    pub fn ellipse(id: ElementId, cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        Self::new(id, ElementKind::Ellipse { cx, cy, rx, ry })
    }

    pub fn path(id: ElementId, data: PathData) -> Self {
        Self::new(id, ElementKind::Path { data })
    }

    pub fn text(id: ElementId, x: f64, y: f64, content: impl Into<String>, font_size: f64) -> Self {
        Self::new(
            id,
            ElementKind::Text {
                x,
                y,
                content: content.into(),
                font_size,
            },
        )
    }

    /// A group without fill, holding `children` in z-order.
    pub fn group(id: ElementId, children: Vec<Element>) -> Self {
        Self {
            style: Style {
                fill: None,
                ..Style::default()
            },
            children,
            ..Self::new(id, ElementKind::Group)
        }
    }

    pub fn with_fill(mut self, fill: Option<Color>) -> Self {
        self.style.fill = fill;
        self
    }

    pub fn with_stroke(mut self, stroke: Option<Color>, width: f64) -> Self {
        self.style.stroke = stroke;
        self.style.stroke_width = width;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.style.opacity = opacity;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Sets the corner radius of a rect. Other kinds are returned unchanged.
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        if let ElementKind::Rect { rx, .. } = &mut self.kind {
            *rx = radius;
        }
        self
    }

    pub fn tag(&self) -> ElementTag {
        self.kind.tag()
    }

    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }

    pub fn local_bounds(&self) -> Option<Bounds> {
        self.kind.local_bounds()
    }

    /// Local bounds grown by half the stroke width.
    pub fn paint_bounds(&self) -> Option<Bounds> {
        let bounds = self.local_bounds()?;
        Some(bounds.inflate(self.style.stroke_extent()))
    }

    /// Validates this element and its whole subtree.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_attributes()?;
        if !self.is_group() && !self.children.is_empty() {
            return Err(ValidationError::ChildrenOnLeaf(self.id));
        }
        self.children.iter().try_for_each(Element::validate)
    }

    /// Validates geometry, style and transform, ignoring children.
    pub fn validate_attributes(&self) -> Result<(), ValidationError> {
        self.kind.validate()?;
        self.style.validate()?;
        if !self.transform.is_finite() {
            return Err(ValidationError::NotFinite { field: "transform" });
        }
        Ok(())
    }

    /// A copy without children.
    pub fn shallow(&self) -> Element {
        Element {
            id: self.id,
            kind: self.kind.clone(),
            style: self.style,
            transform: self.transform,
            children: Vec::new(),
        }
    }

    /// Pre-order walk over this element and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Element> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let element = stack.pop()?;
            stack.extend(element.children.iter().rev());
            Some(element)
        })
    }

    /// Ids of this element and every descendant, in pre-order.
    pub fn ids(&self) -> Vec<ElementId> {
        self.walk().map(|element| element.id).collect()
    }

    /// Structural equality with numeric tolerance, including children.
    pub fn approx_eq(&self, other: &Element, tolerance: f64) -> bool {
        self.id == other.id
            && self.kind.approx_eq(&other.kind, tolerance)
            && self.style.approx_eq(&other.style, tolerance)
            && self.transform.approx_eq(&other.transform, tolerance)
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.approx_eq(b, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn id(n: u64) -> ElementId {
        ElementId::from_raw(n)
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(ElementTag::Group.as_ref(), "g");
        assert_eq!(ElementTag::Rect.to_string(), "rect");
        assert_eq!(ElementTag::from_str("ellipse").unwrap(), ElementTag::Ellipse);
        assert_eq!(ElementTag::from_str("g").unwrap(), ElementTag::Group);
        assert!(ElementTag::from_str("polygon").is_err());
    }

    #[test]
    fn test_local_bounds_per_kind() {
        let rect = Element::rect(id(1), 10.0, 20.0, 30.0, 40.0);
        let bounds = rect.local_bounds().unwrap();
        assert_eq!(bounds.min, Point::new(10.0, 20.0));
        assert_eq!(bounds.max, Point::new(40.0, 60.0));

        let circle = Element::circle(id(2), 0.0, 0.0, 5.0);
        assert_eq!(circle.local_bounds().unwrap().width(), 10.0);

        let text = Element::text(id(3), 0.0, 20.0, "abcd", 10.0);
        let bounds = text.local_bounds().unwrap();
        assert_eq!(bounds.min, Point::new(0.0, 10.0));
        assert!((bounds.width() - 24.0).abs() < 1e-9);

        assert!(Element::group(id(4), vec![]).local_bounds().is_none());
    }

    #[test]
    fn test_paint_bounds_include_stroke() {
        let rect = Element::rect(id(1), 0.0, 0.0, 10.0, 10.0).with_stroke(Some(Color::BLACK), 4.0);
        let bounds = rect.paint_bounds().unwrap();
        assert_eq!(bounds.min, Point::new(-2.0, -2.0));
        assert_eq!(bounds.max, Point::new(12.0, 12.0));
    }

    #[test]
    fn test_validate_rejects_negative_size() {
        let rect = Element::rect(id(1), 0.0, 0.0, -1.0, 10.0);
        assert!(matches!(rect.validate(), Err(ValidationError::Negative { field: "width", .. })));

        let circle = Element::circle(id(2), f64::NAN, 0.0, 1.0);
        assert!(matches!(circle.validate(), Err(ValidationError::NotFinite { .. })));
    }

    #[test]
    fn test_validate_rejects_children_on_leaf() {
        let mut rect = Element::rect(id(1), 0.0, 0.0, 1.0, 1.0);
        rect.children.push(Element::circle(id(2), 0.0, 0.0, 1.0));
        assert_eq!(rect.validate(), Err(ValidationError::ChildrenOnLeaf(id(1))));
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = Element::group(
            id(1),
            vec![
                Element::group(id(2), vec![Element::rect(id(3), 0.0, 0.0, 1.0, 1.0)]),
                Element::circle(id(4), 0.0, 0.0, 1.0),
            ],
        );
        assert_eq!(tree.ids(), vec![id(1), id(2), id(3), id(4)]);
        assert!(tree.shallow().children.is_empty());
    }

    #[test]
    fn test_serde_json_shape() {
        let rect = Element::rect(id(7), 1.0, 2.0, 3.0, 4.0).with_fill(Some(Color::rgb(255, 0, 0)));
        let json = serde_json::to_value(&rect).unwrap();
        assert_eq!(json["id"], "e7");
        assert_eq!(json["type"], "rect");
        assert_eq!(json["style"]["fill"], "#ff0000");
        assert!(json.get("transform").is_none());

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, rect);
    }
}
