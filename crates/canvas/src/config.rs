use crate::error::ConfigError;
use log::info;
use node::{Style, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editor tunables. Every field has a default, so a config file only needs
/// the values it changes.
///
/// ```json
/// { "history_capacity": 100, "nudge": { "small": 1, "large": 10 } }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo depth; `None` keeps every command.
    pub history_capacity: Option<usize>,
    /// Pointer travel, in document units, below which a press is a click.
    pub drag_threshold: f64,
    pub nudge: NudgeSteps,
    /// Slack added around element bounds when hit testing.
    pub hit_tolerance: f64,
    /// Style given to shapes drawn with a tool or created by an action
    /// without an explicit style.
    pub default_style: Style,
    pub default_font_size: f64,
}

/// Arrow-key step sizes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NudgeSteps {
    pub small: f64,
    /// Used while shift is held.
    pub large: f64,
}

impl Default for NudgeSteps {
    fn default() -> Self {
        Self { small: 1.0, large: 10.0 }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: None,
            drag_threshold: 3.0,
            nudge: NudgeSteps::default(),
            hit_tolerance: 0.0,
            default_style: Style::default(),
            default_font_size: 16.0,
        }
    }
}

impl EditorConfig {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!("loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: Default::default(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |err: ValidationError| ConfigError::Invalid(err.to_string());
        let non_negative = [
            ("drag_threshold", self.drag_threshold),
            ("hit_tolerance", self.hit_tolerance),
            ("nudge.small", self.nudge.small),
            ("nudge.large", self.nudge.large),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be a non-negative number", field)));
            }
        }
        if !self.default_font_size.is_finite() || self.default_font_size <= 0.0 {
            return Err(ConfigError::Invalid("default_font_size must be positive".into()));
        }
        self.default_style.validate().map_err(invalid)?;
        Ok(())
    }
}
