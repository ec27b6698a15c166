//! Scriptable editor actions.
//!
//! Actions describe intent ("move the selection by 10,0") rather than the
//! scene edits that realise it. They serialize to tagged JSON, so scripts,
//! macros and the command line all drive the editor the same way:
//!
//! ```json
//! [
//!   { "type": "create_shape", "shape": { "type": "rect", "x": 0, "y": 0, "width": 40, "height": 20 }, "fill": "#ff0000" },
//!   { "type": "move", "delta": [10, 0] },
//!   { "type": "undo" }
//! ]
//! ```

use crate::Tool;
use glam::DVec2;
use node::{Color, ElementId, ElementKind, Point, Transform};
use serde::{Deserialize, Serialize};

/// An operation on the editor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    // === Creation ===
    /// Create a new element. Style fields left out come from the editor's
    /// default style.
    CreateShape {
        shape: ElementKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<ElementId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<Paint>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stroke: Option<StrokeValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opacity: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transform: Option<Transform>,
    },

    /// Delete target elements and their subtrees.
    Delete {
        #[serde(default)]
        target: Target,
    },

    // === Selection ===
    Select {
        target: Target,
        #[serde(default)]
        add_to_selection: bool,
    },

    /// Select the topmost element under a point.
    SelectAt {
        point: Point,
        #[serde(default)]
        additive: bool,
    },

    /// Select root-level elements intersecting a rectangle.
    SelectInRect {
        min: Point,
        max: Point,
        #[serde(default)]
        additive: bool,
    },

    ClearSelection,

    SelectAll,

    // === Transform ===
    /// Move elements by a document-space delta.
    Move {
        #[serde(default)]
        target: Target,
        delta: DVec2,
    },

    /// Rotate elements. The pivot defaults to the center of their combined
    /// bounds.
    Rotate {
        #[serde(default)]
        target: Target,
        degrees: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pivot: Option<Point>,
    },

    /// Scale elements by a per-axis factor.
    Scale {
        #[serde(default)]
        target: Target,
        factor: DVec2,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pivot: Option<Point>,
    },

    /// Apply an arbitrary document-space transform.
    Transform {
        #[serde(default)]
        target: Target,
        transform: Transform,
    },

    // === Style ===
    SetFill {
        #[serde(default)]
        target: Target,
        fill: Paint,
    },

    /// Set or remove the stroke.
    SetStroke {
        #[serde(default)]
        target: Target,
        stroke: Option<StrokeValue>,
    },

    SetOpacity {
        #[serde(default)]
        target: Target,
        opacity: f64,
    },

    /// Set corner radius. Elements other than rects are left alone.
    SetCornerRadius {
        #[serde(default)]
        target: Target,
        radius: f64,
    },

    // === Structure ===
    Group {
        #[serde(default)]
        target: Target,
    },

    Ungroup {
        #[serde(default)]
        target: Target,
    },

    BringForward {
        #[serde(default)]
        target: Target,
    },

    SendBackward {
        #[serde(default)]
        target: Target,
    },

    BringToFront {
        #[serde(default)]
        target: Target,
    },

    SendToBack {
        #[serde(default)]
        target: Target,
    },

    // === Tool ===
    SetTool { tool: Tool },

    // === History ===
    Undo,

    Redo,

    /// Run several actions in order. Each recorded edit is undone on its
    /// own; a failing action stops the batch.
    Batch { actions: Vec<Action> },
}

/// Which elements an action applies to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The current selection.
    #[default]
    Selection,

    Element(ElementId),

    Elements(Vec<ElementId>),

    /// Every root-level element.
    All,
}

impl From<ElementId> for Target {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

impl From<Vec<ElementId>> for Target {
    fn from(ids: Vec<ElementId>) -> Self {
        Self::Elements(ids)
    }
}

/// A fill or stroke paint: `"none"` or any color `Color::parse` accepts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    None,
    Color(Color),
}

impl Paint {
    pub fn color(self) -> Option<Color> {
        match self {
            Paint::None => None,
            Paint::Color(color) => Some(color),
        }
    }
}

impl From<Option<Color>> for Paint {
    fn from(color: Option<Color>) -> Self {
        color.map_or(Paint::None, Paint::Color)
    }
}

impl Serialize for Paint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Paint::None => serializer.serialize_str("none"),
            Paint::Color(color) => serializer.serialize_str(&color.to_hex()),
        }
    }
}

impl<'de> Deserialize<'de> for Paint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(Paint::None);
        }
        Color::parse(&s).map(Paint::Color).map_err(serde::de::Error::custom)
    }
}

/// Stroke paint and width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeValue {
    pub color: Color,
    #[serde(default = "default_stroke_width")]
    pub width: f64,
}

fn default_stroke_width() -> f64 {
    1.0
}

/// Outcome of applying an action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult {
    Success {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        created: Vec<ElementId>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        modified: Vec<ElementId>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        deleted: Vec<ElementId>,
    },
    Error {
        message: String,
    },
}

impl ActionResult {
    pub fn success() -> Self {
        Self::Success {
            created: vec![],
            modified: vec![],
            deleted: vec![],
        }
    }

    pub fn created(ids: Vec<ElementId>) -> Self {
        Self::Success {
            created: ids,
            modified: vec![],
            deleted: vec![],
        }
    }

    pub fn modified(ids: Vec<ElementId>) -> Self {
        Self::Success {
            created: vec![],
            modified: ids,
            deleted: vec![],
        }
    }

    pub fn deleted(ids: Vec<ElementId>) -> Self {
        Self::Success {
            created: vec![],
            modified: vec![],
            deleted: ids,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }

    /// Folds another result into this one. The first error wins.
    pub(crate) fn merge(self, other: ActionResult) -> ActionResult {
        match (self, other) {
            (
                ActionResult::Success {
                    mut created,
                    mut modified,
                    mut deleted,
                },
                ActionResult::Success {
                    created: more_created,
                    modified: more_modified,
                    deleted: more_deleted,
                },
            ) => {
                created.extend(more_created);
                modified.extend(more_modified);
                deleted.extend(more_deleted);
                ActionResult::Success {
                    created,
                    modified,
                    deleted,
                }
            }
            (error @ ActionResult::Error { .. }, _) | (_, error @ ActionResult::Error { .. }) => error,
        }
    }
}
