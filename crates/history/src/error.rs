use scene_graph::SceneError;
use svg_core::GeometryError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("command has no elements to act on")]
    NoTargets,

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
