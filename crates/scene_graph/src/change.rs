use node::ElementId;
use strum_macros::{AsRefStr, Display};

/// What happened to an element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Remove,
    Update,
    Reorder,
}

/// A change notification emitted after a successful mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneChange {
    /// An element (with its subtree, if any) entered the tree.
    Inserted { id: ElementId },
    /// An element left the tree. `subtree` lists the element and every
    /// descendant that left with it, in pre-order.
    Removed {
        id: ElementId,
        subtree: Vec<ElementId>,
    },
    /// Geometry, style or transform changed.
    Updated { id: ElementId },
    /// Parent or position among siblings changed.
    Reordered { id: ElementId },
}

impl SceneChange {
    pub fn id(&self) -> ElementId {
        match self {
            SceneChange::Inserted { id }
            | SceneChange::Removed { id, .. }
            | SceneChange::Updated { id }
            | SceneChange::Reordered { id } => *id,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            SceneChange::Inserted { .. } => ChangeKind::Insert,
            SceneChange::Removed { .. } => ChangeKind::Remove,
            SceneChange::Updated { .. } => ChangeKind::Update,
            SceneChange::Reordered { .. } => ChangeKind::Reorder,
        }
    }
}

/// Receives change notifications synchronously, in mutation order.
pub trait ChangeSink {
    fn notify(&mut self, change: SceneChange);
}

impl ChangeSink for Vec<SceneChange> {
    fn notify(&mut self, change: SceneChange) {
        self.push(change);
    }
}

/// A sink that drops every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl ChangeSink for Discard {
    fn notify(&mut self, _change: SceneChange) {}
}
