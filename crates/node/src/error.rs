use crate::ElementId;
use svg_core::GeometryError;
use thiserror::Error;

/// A value was rejected before it could reach the scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("opacity must be between 0 and 1, got {0}")]
    OpacityOutOfRange(f64),

    #[error("element {0} is not a group and cannot have children")]
    ChildrenOnLeaf(ElementId),

    #[error("duplicate element id {0}")]
    DuplicateId(ElementId),

    #[error("invalid element id `{0}`")]
    InvalidId(String),

    #[error("invalid path data: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NonPositive { field, value });
    }
    Ok(())
}

/// Checks that `value` is finite and not negative.
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}
