use crate::error::{finite, non_negative};
use crate::{Color, ValidationError};
use serde::{Deserialize, Serialize};
use svg_core::approx_eq;

/// Paint attributes shared by every element kind.
///
/// Defaults follow SVG: black fill, no stroke, stroke width 1, fully opaque.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_stroke_width() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Some(Color::BLACK),
            stroke: None,
            stroke_width: default_stroke_width(),
            opacity: default_opacity(),
        }
    }
}

impl Style {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("stroke width", self.stroke_width)?;
        finite("opacity", self.opacity)?;
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ValidationError::OpacityOutOfRange(self.opacity));
        }
        Ok(())
    }

    /// Half the stroke width when a stroke is painted, zero otherwise.
    pub fn stroke_extent(&self) -> f64 {
        if self.stroke.is_some() {
            self.stroke_width / 2.0
        } else {
            0.0
        }
    }

    pub fn approx_eq(&self, other: &Style, tolerance: f64) -> bool {
        self.fill == other.fill
            && self.stroke == other.stroke
            && approx_eq(self.stroke_width, other.stroke_width, tolerance)
            && approx_eq(self.opacity, other.opacity, tolerance)
    }
}
