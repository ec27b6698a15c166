use crate::Tool;
use glam::DVec2;
use node::{Bounds, ElementId, ElementKind, Point};

/// Transient pointer interaction. Nothing in the scene changes until the
/// gesture finishes.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    /// Pointer is down with the select tool but has not travelled past the
    /// drag threshold yet.
    Press {
        origin: Point,
        hit: Option<ElementId>,
        additive: bool,
    },
    /// Dragging the selection.
    Move {
        origin: Point,
        current: Point,
        ids: Vec<ElementId>,
        /// Selection to restore if the gesture is cancelled.
        selection_before: Vec<ElementId>,
    },
    /// Dragging a selection rectangle over empty canvas.
    Marquee {
        origin: Point,
        current: Point,
        additive: bool,
    },
    /// Dragging out a new shape.
    Draw { tool: Tool, origin: Point, current: Point },
}

/// What the render layer should overlay while a gesture is in progress.
#[derive(Clone, Debug, PartialEq)]
pub enum Preview {
    Translate { ids: Vec<ElementId>, delta: DVec2 },
    Marquee(Bounds),
    Shape(ElementKind),
}

impl Gesture {
    pub fn origin(&self) -> Point {
        match self {
            Gesture::Press { origin, .. }
            | Gesture::Move { origin, .. }
            | Gesture::Marquee { origin, .. }
            | Gesture::Draw { origin, .. } => *origin,
        }
    }

    /// Records the latest pointer position.
    pub(crate) fn track(&mut self, position: Point) {
        match self {
            Gesture::Press { .. } => {}
            Gesture::Move { current, .. } | Gesture::Marquee { current, .. } | Gesture::Draw { current, .. } => {
                *current = position
            }
        }
    }

    pub fn preview(&self) -> Option<Preview> {
        match self {
            Gesture::Press { .. } => None,
            Gesture::Move {
                origin, current, ids, ..
            } => Some(Preview::Translate {
                ids: ids.clone(),
                delta: *current - *origin,
            }),
            Gesture::Marquee { origin, current, .. } => Some(Preview::Marquee(Bounds::from_corners(*origin, *current))),
            Gesture::Draw { tool, origin, current } => shape_between(*tool, *origin, *current).map(Preview::Shape),
        }
    }
}

/// Geometry of the shape `tool` draws for a drag from `origin` to `current`.
pub fn shape_between(tool: Tool, origin: Point, current: Point) -> Option<ElementKind> {
    let bounds = Bounds::from_corners(origin, current);
    let kind = match tool {
        Tool::Select => return None,
        Tool::Rect => ElementKind::Rect {
            x: bounds.min.x,
            y: bounds.min.y,
            width: bounds.width(),
            height: bounds.height(),
            rx: 0.0,
        },
        Tool::Ellipse => {
            let center = bounds.center();
            ElementKind::Ellipse {
                cx: center.x,
                cy: center.y,
                rx: bounds.width() / 2.0,
                ry: bounds.height() / 2.0,
            }
        }
        Tool::Circle => ElementKind::Circle {
            cx: origin.x,
            cy: origin.y,
            r: origin.distance(current),
        },
    };
    Some(kind)
}
