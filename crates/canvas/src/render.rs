use node::ElementId;
use scene_graph::SceneChange;

/// Receives everything a renderer needs to stay in sync with the editor.
/// The editor never draws.
pub trait RenderSink {
    /// Called once per scene mutation, in order.
    fn scene_changed(&mut self, change: &SceneChange);

    /// Called after the selection changed, with the new selection.
    fn selection_changed(&mut self, selection: &[ElementId]);
}

/// Ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn scene_changed(&mut self, _change: &SceneChange) {}

    fn selection_changed(&mut self, _selection: &[ElementId]) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    Scene(SceneChange),
    Selection(Vec<ElementId>),
}

/// Keeps every notification, for tests and headless tooling.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<RenderEvent>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn scene_changes(&self) -> impl Iterator<Item = &SceneChange> {
        self.events.iter().filter_map(|event| match event {
            RenderEvent::Scene(change) => Some(change),
            RenderEvent::Selection(_) => None,
        })
    }
}

impl RenderSink for RecordingRenderer {
    fn scene_changed(&mut self, change: &SceneChange) {
        self.events.push(RenderEvent::Scene(change.clone()));
    }

    fn selection_changed(&mut self, selection: &[ElementId]) {
        self.events.push(RenderEvent::Selection(selection.to_vec()));
    }
}
