use node::{ElementId, ValidationError};
use thiserror::Error;

/// A scene mutation was rejected. The tree is unchanged whenever one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("cannot move {id} under {parent}: it is the element itself or one of its descendants")]
    CyclicParent { id: ElementId, parent: ElementId },

    #[error("element {0} already exists")]
    DuplicateId(ElementId),

    #[error("element {0} not found")]
    NotFound(ElementId),

    #[error("element {0} is not a group")]
    NotAGroup(ElementId),

    #[error("index {index} out of bounds for {len} siblings")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("element {0} cannot change between group and non-group")]
    KindChange(ElementId),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
