use thiserror::Error;

/// Errors produced by geometry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The transform cannot be inverted.
    #[error("transform is singular (determinant {determinant})")]
    SingularTransform { determinant: f64 },

    /// A transform list could not be parsed.
    #[error("invalid transform `{0}`")]
    InvalidTransform(String),

    /// A color string could not be parsed.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
}
