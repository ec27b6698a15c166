use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// How pointer input on the canvas is interpreted.
#[derive(
    Default, Debug, Display, EnumString, EnumIter, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Click to select, drag selected elements to move them, drag on empty
    /// canvas for a marquee.
    #[default]
    Select,
    /// Drag out a rectangle between two corners.
    Rect,
    /// Drag out an ellipse inscribed in the dragged box.
    Ellipse,
    /// Drag from the center outwards.
    Circle,
}

impl Tool {
    /// The single-key shortcut that activates this tool.
    pub fn shortcut(self) -> char {
        match self {
            Tool::Select => 'v',
            Tool::Rect => 'r',
            Tool::Ellipse => 'e',
            Tool::Circle => 'c',
        }
    }

    pub fn from_shortcut(key: char) -> Option<Tool> {
        use strum::IntoEnumIterator;
        Tool::iter().find(|tool| tool.shortcut() == key.to_ascii_lowercase())
    }

    /// Whether dragging with this tool creates a shape.
    pub fn draws(self) -> bool {
        !matches!(self, Tool::Select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_shortcuts_round_trip() {
        assert_eq!(Tool::from_shortcut('r'), Some(Tool::Rect));
        assert_eq!(Tool::from_shortcut('C'), Some(Tool::Circle));
        assert_eq!(Tool::from_shortcut('x'), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(Tool::Ellipse.to_string(), "ellipse");
        assert_eq!(Tool::from_str("rect"), Ok(Tool::Rect));
    }
}
