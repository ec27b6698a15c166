use crate::gesture::{shape_between, Gesture, Preview};
use crate::hit_test::{elements_in_rect, hit_test, hit_test_all};
use crate::input::{KeyEvent, Shortcut};
use crate::io::{LoadJob, Loaded, SaveJob};
use crate::{EditorConfig, EditorError, NullRenderer, PointerEvent, RenderSink, Selection, Tool};
use glam::DVec2;
use history::{Command, CommandKind, History};
use log::{debug, info};
use interchange::ParseWarning;
use node::{Bounds, Color, Document, DocumentId, Element, ElementId, IdGenerator, Point, Transform};
use project::SvgRecord;
use scene_graph::{ChangeSink, SceneChange, SceneGraph};

/// Document-level attributes the scene graph does not hold.
#[derive(Clone, Debug)]
struct DocumentInfo {
    id: DocumentId,
    name: String,
    width: f64,
    height: f64,
    background: Color,
}

impl DocumentInfo {
    fn of(document: &Document) -> Self {
        Self {
            id: document.id,
            name: document.name.clone(),
            width: document.width,
            height: document.height,
            background: document.background,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Io {
    Saving,
    Loading,
}

/// The editor controller.
///
/// Owns the scene, the undo history and the selection, and turns pointer,
/// keyboard and scripted input into [`Command`]s. Every scene mutation is
/// forwarded to the [`RenderSink`].
pub struct Editor<R: RenderSink = NullRenderer> {
    info: DocumentInfo,
    scene: SceneGraph,
    history: History,
    selection: Selection,
    tool: Tool,
    gesture: Option<Gesture>,
    ids: IdGenerator,
    config: EditorConfig,
    io: Option<Io>,
    renderer: R,
}

/// Routes scene notifications to the renderer and prunes removed elements
/// from the selection as they happen.
struct Fanout<'a, R: RenderSink> {
    selection: &'a mut Selection,
    renderer: &'a mut R,
    selection_changed: bool,
}

impl<R: RenderSink> ChangeSink for Fanout<'_, R> {
    fn notify(&mut self, change: SceneChange) {
        if let SceneChange::Removed { subtree, .. } = &change {
            self.selection_changed |= self.selection.prune(subtree);
        }
        self.renderer.scene_changed(&change);
    }
}

impl Editor<NullRenderer> {
    /// A blank 800×600 document.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_renderer(config, NullRenderer)
    }
}

impl<R: RenderSink> Editor<R> {
    pub fn with_renderer(config: EditorConfig, renderer: R) -> Self {
        let document = Document::blank();
        Self {
            info: DocumentInfo::of(&document),
            scene: SceneGraph::new(),
            history: History::with_capacity(config.history_capacity),
            selection: Selection::new(),
            tool: Tool::default(),
            gesture: None,
            ids: IdGenerator::new(),
            config,
            io: None,
            renderer,
        }
    }

    /// Opens an existing document.
    pub fn open(document: Document, config: EditorConfig, renderer: R) -> Result<Self, EditorError> {
        document.validate()?;
        let mut editor = Self::with_renderer(config, renderer);
        editor.ids = IdGenerator::after(document.max_element_id());
        editor.info = DocumentInfo::of(&document);
        editor.scene = SceneGraph::from_elements(document.elements)?;
        Ok(editor)
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Overlay for the gesture in progress, if any.
    pub fn preview(&self) -> Option<Preview> {
        self.gesture.as_ref().and_then(Gesture::preview)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn document_id(&self) -> DocumentId {
        self.info.id
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// True while a save or load is in flight.
    pub fn is_busy(&self) -> bool {
        self.io.is_some()
    }

    /// An immutable snapshot of the current document.
    pub fn document(&self) -> Document {
        Document {
            id: self.info.id,
            name: self.info.name.clone(),
            width: self.info.width,
            height: self.info.height,
            background: self.info.background,
            elements: self.scene.to_elements(),
        }
    }

    /// Reserves a fresh element id.
    pub fn next_id(&mut self) -> ElementId {
        self.ids.next_id()
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        if self.io.is_some() {
            return Err(EditorError::Busy);
        }
        Ok(())
    }

    fn notify_selection(&mut self) {
        self.renderer.selection_changed(self.selection.ids());
    }

    // === History ===

    /// Applies a command and records it for undo.
    pub fn execute(&mut self, command: Command) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let mut fanout = Fanout {
            selection: &mut self.selection,
            renderer: &mut self.renderer,
            selection_changed: false,
        };
        self.history.execute(command, &mut self.scene, &mut fanout)?;
        if fanout.selection_changed {
            self.notify_selection();
        }
        Ok(())
    }

    pub fn undo(&mut self) -> Result<CommandKind, EditorError> {
        self.ensure_idle()?;
        let mut fanout = Fanout {
            selection: &mut self.selection,
            renderer: &mut self.renderer,
            selection_changed: false,
        };
        let kind = self.history.undo(&mut self.scene, &mut fanout)?;
        if fanout.selection_changed {
            self.notify_selection();
        }
        Ok(kind)
    }

    pub fn redo(&mut self) -> Result<CommandKind, EditorError> {
        self.ensure_idle()?;
        let mut fanout = Fanout {
            selection: &mut self.selection,
            renderer: &mut self.renderer,
            selection_changed: false,
        };
        let kind = self.history.redo(&mut self.scene, &mut fanout)?;
        if fanout.selection_changed {
            self.notify_selection();
        }
        Ok(kind)
    }

    // === Selection ===

    /// Selects existing elements, replacing or extending the selection.
    pub fn select(&mut self, ids: &[ElementId], additive: bool) -> Result<(), EditorError> {
        if let Some(&missing) = ids.iter().find(|&&id| !self.scene.contains(id)) {
            return Err(EditorError::NotFound(missing));
        }
        let changed = if additive {
            ids.iter().fold(false, |changed, &id| self.selection.add(id) | changed)
        } else {
            self.selection.set(ids.iter().copied())
        };
        if changed {
            self.notify_selection();
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.notify_selection();
        }
    }

    /// Selects every root-level element.
    pub fn select_all(&mut self) {
        if self.selection.set(self.scene.root_ids()) {
            self.notify_selection();
        }
    }

    pub fn hit_test(&self, point: Point) -> Option<ElementId> {
        hit_test(&self.scene, point, self.config.hit_tolerance)
    }

    pub fn hit_test_all(&self, point: Point) -> Vec<ElementId> {
        hit_test_all(&self.scene, point, self.config.hit_tolerance)
    }

    /// Click selection. A miss clears a non-additive selection; an additive
    /// click toggles the hit element.
    pub fn select_at(&mut self, point: Point, additive: bool) -> Option<ElementId> {
        let hit = self.hit_test(point);
        let changed = match (hit, additive) {
            (Some(id), true) => {
                self.selection.toggle(id);
                true
            }
            (Some(id), false) => self.selection.set([id]),
            (None, true) => false,
            (None, false) => self.selection.clear(),
        };
        if changed {
            self.notify_selection();
        }
        hit
    }

    /// Marquee selection of root-level elements intersecting `rect`.
    pub fn select_in_rect(&mut self, rect: Bounds, additive: bool) -> Vec<ElementId> {
        let hits = elements_in_rect(&self.scene, rect);
        let changed = if additive {
            hits.iter().fold(false, |changed, &id| self.selection.add(id) | changed)
        } else {
            self.selection.set(hits.iter().copied())
        };
        if changed {
            self.notify_selection();
        }
        hits
    }

    fn selected(&self) -> Result<Vec<ElementId>, EditorError> {
        if self.selection.is_empty() {
            return Err(EditorError::EmptySelection);
        }
        Ok(self.selection.ids().to_vec())
    }

    // === Edits ===

    /// Appends `element` under `parent` (or at the top of the document).
    /// Ids in the element are reserved so later ids never collide.
    pub fn insert(&mut self, parent: Option<ElementId>, element: Element) -> Result<ElementId, EditorError> {
        self.ensure_idle()?;
        let id = element.id;
        let command = Command::append(&self.scene, parent, element.clone())?;
        self.execute(command)?;
        for used in element.ids() {
            self.ids.observe(used);
        }
        Ok(id)
    }

    /// Removes the selected elements. Returns every removed id.
    pub fn delete_selection(&mut self) -> Result<Vec<ElementId>, EditorError> {
        let ids = self.selected()?;
        self.delete(&ids)
    }

    pub fn delete(&mut self, ids: &[ElementId]) -> Result<Vec<ElementId>, EditorError> {
        self.ensure_idle()?;
        let command = Command::remove(&self.scene, ids)?;
        let removed = command.targets();
        self.execute(command)?;
        Ok(removed)
    }

    /// Moves elements by `delta` in document space.
    pub fn translate(&mut self, ids: &[ElementId], delta: DVec2) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let command = Command::translate(&self.scene, ids, delta)?;
        self.execute(command)
    }

    /// Applies a document-space transform to elements.
    pub fn transform(&mut self, ids: &[ElementId], transform: Transform) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let command = Command::transform(&self.scene, ids, transform)?;
        self.execute(command)
    }

    /// Nudges the selection by one small or large step along `direction`.
    pub fn nudge(&mut self, direction: DVec2, large: bool) -> Result<(), EditorError> {
        let ids = self.selected()?;
        let step = if large {
            self.config.nudge.large
        } else {
            self.config.nudge.small
        };
        self.translate(&ids, direction * step)
    }

    /// Wraps the selection in a new group and selects the group.
    pub fn group_selection(&mut self) -> Result<ElementId, EditorError> {
        let ids = self.selected()?;
        self.group(&ids)
    }

    pub fn group(&mut self, ids: &[ElementId]) -> Result<ElementId, EditorError> {
        self.ensure_idle()?;
        let group_id = self.ids.next_id();
        let command = Command::group(&self.scene, ids, Element::group(group_id, Vec::new()))?;
        self.execute(command)?;
        if self.selection.set([group_id]) {
            self.notify_selection();
        }
        Ok(group_id)
    }

    /// Dissolves every selected group and selects their former children.
    pub fn ungroup_selection(&mut self) -> Result<Vec<ElementId>, EditorError> {
        let ids = self.selected()?;
        self.ungroup(&ids)
    }

    /// Dissolves the groups among `ids`; other ids are ignored.
    pub fn ungroup(&mut self, ids: &[ElementId]) -> Result<Vec<ElementId>, EditorError> {
        self.ensure_idle()?;
        let groups: Vec<_> = ids
            .iter()
            .copied()
            .filter(|&id| self.scene.find(id).is_some_and(Element::is_group))
            .collect();
        let mut released = Vec::new();
        for group in groups {
            released.extend(self.scene.children_of(Some(group))?);
            let command = Command::ungroup(&self.scene, group)?;
            self.execute(command)?;
        }
        if !released.is_empty() && self.selection.set(released.iter().copied()) {
            self.notify_selection();
        }
        Ok(released)
    }

    /// Moves each element one step up among its siblings. Returns how many
    /// moved.
    pub fn bring_forward(&mut self, ids: &[ElementId]) -> Result<usize, EditorError> {
        self.shift_z(ids, true)
    }

    pub fn send_backward(&mut self, ids: &[ElementId]) -> Result<usize, EditorError> {
        self.shift_z(ids, false)
    }

    /// Moves elements to the top (or bottom) of their sibling lists.
    pub fn bring_to_front(&mut self, ids: &[ElementId]) -> Result<usize, EditorError> {
        self.jump_z(ids, true)
    }

    pub fn send_to_back(&mut self, ids: &[ElementId]) -> Result<usize, EditorError> {
        self.jump_z(ids, false)
    }

    fn shift_z(&mut self, ids: &[ElementId], forward: bool) -> Result<usize, EditorError> {
        self.ensure_idle()?;
        let mut placed = ids
            .iter()
            .map(|&id| {
                self.scene
                    .placement(id)
                    .map(|placement| (id, placement))
                    .ok_or(EditorError::NotFound(id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        // Move the element nearest the edge first so neighbours keep their
        // relative order.
        placed.sort_by_key(|(_, placement)| placement.index);
        if forward {
            placed.reverse();
        }

        let mut moved = 0;
        for (id, _) in placed {
            let Some(placement) = self.scene.placement(id) else {
                continue;
            };
            let len = self.scene.children_of(placement.parent)?.len();
            let target = if forward {
                placement.index + 1
            } else {
                placement.index.wrapping_sub(1)
            };
            if target >= len {
                continue;
            }
            let sibling = self.scene.children_of(placement.parent)?[target];
            if ids.contains(&sibling) {
                continue;
            }
            let command = Command::reorder(&self.scene, id, target)?;
            self.execute(command)?;
            moved += 1;
        }
        Ok(moved)
    }

    fn jump_z(&mut self, ids: &[ElementId], front: bool) -> Result<usize, EditorError> {
        self.ensure_idle()?;
        let mut moved = 0;
        let ordered: Vec<_> = if front { ids.to_vec() } else { ids.iter().rev().copied().collect() };
        for id in ordered {
            let placement = self.scene.placement(id).ok_or(EditorError::NotFound(id))?;
            let last = self.scene.children_of(placement.parent)?.len() - 1;
            let target = if front { last } else { 0 };
            if placement.index == target {
                continue;
            }
            let command = Command::reorder(&self.scene, id, target)?;
            self.execute(command)?;
            moved += 1;
        }
        Ok(moved)
    }

    /// Union of the world bounds of `ids`.
    pub fn bounds_of(&self, ids: &[ElementId]) -> Option<Bounds> {
        ids.iter()
            .filter_map(|&id| self.scene.world_bounds(id))
            .reduce(|a, b| a.union(&b))
    }

    // === Tools and gestures ===

    /// Switches tools, cancelling any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.cancel_gesture();
        self.tool = tool;
    }

    pub fn pointer_down(&mut self, event: PointerEvent) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.cancel_gesture();
        let origin = event.position;
        self.gesture = Some(if self.tool.draws() {
            Gesture::Draw {
                tool: self.tool,
                origin,
                current: origin,
            }
        } else {
            Gesture::Press {
                origin,
                hit: self.hit_test(origin),
                additive: event.modifiers.shift,
            }
        });
        Ok(())
    }

    /// Updates the gesture in progress. A press that travels past the drag
    /// threshold becomes a move (when it started on an element) or a
    /// marquee.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        let position = event.position;
        match self.gesture.take() {
            Some(Gesture::Press { origin, hit, additive })
                if origin.distance(position) >= self.config.drag_threshold =>
            {
                self.gesture = Some(match hit {
                    Some(id) => {
                        let selection_before = self.selection.ids().to_vec();
                        if !self.selection.contains(id) {
                            if !additive {
                                self.selection.clear();
                            }
                            self.selection.add(id);
                            self.notify_selection();
                        }
                        Gesture::Move {
                            origin,
                            current: position,
                            ids: self.selection.ids().to_vec(),
                            selection_before,
                        }
                    }
                    None => Gesture::Marquee {
                        origin,
                        current: position,
                        additive,
                    },
                });
            }
            Some(mut gesture) => {
                gesture.track(position);
                self.gesture = Some(gesture);
            }
            None => {}
        }
    }

    /// Finishes the gesture. At most one command is executed; its kind is
    /// returned.
    pub fn pointer_up(&mut self, event: PointerEvent) -> Result<Option<CommandKind>, EditorError> {
        self.pointer_move(event);
        let Some(gesture) = self.gesture.take() else {
            return Ok(None);
        };

        match gesture {
            Gesture::Press { origin, additive, .. } => {
                self.select_at(origin, additive);
                Ok(None)
            }
            Gesture::Move {
                origin, current, ids, ..
            } => {
                let delta = current - origin;
                if ids.is_empty() || delta == DVec2::ZERO {
                    return Ok(None);
                }
                self.translate(&ids, delta)?;
                Ok(Some(CommandKind::Translate))
            }
            Gesture::Marquee {
                origin,
                current,
                additive,
            } => {
                self.select_in_rect(Bounds::from_corners(origin, current), additive);
                Ok(None)
            }
            Gesture::Draw { tool, origin, current } => {
                if origin.distance(current) < self.config.drag_threshold {
                    return Ok(None);
                }
                let Some(kind) = shape_between(tool, origin, current) else {
                    return Ok(None);
                };
                let id = self.ids.next_id();
                let element = Element::new(id, kind).with_style(self.config.default_style);
                self.insert(None, element)?;
                if self.selection.set([id]) {
                    self.notify_selection();
                }
                Ok(Some(CommandKind::Insert))
            }
        }
    }

    /// Drops the gesture in progress without touching the scene. Returns
    /// whether there was one.
    pub fn cancel_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        if let Gesture::Move { selection_before, .. } = gesture {
            if self.selection.set(selection_before) {
                self.notify_selection();
            }
        }
        debug!("gesture cancelled");
        true
    }

    /// Handles a key press. Returns whether the key did anything.
    pub fn key_down(&mut self, event: KeyEvent) -> Result<bool, EditorError> {
        let Some(shortcut) = event.shortcut() else {
            return Ok(false);
        };
        if self.gesture.is_some() && shortcut != Shortcut::Cancel {
            return Ok(false);
        }

        match shortcut {
            Shortcut::Cancel => {
                if !self.cancel_gesture() {
                    self.clear_selection();
                }
            }
            Shortcut::DeleteSelection => {
                if self.selection.is_empty() {
                    return Ok(false);
                }
                self.delete_selection()?;
            }
            Shortcut::Nudge { dx, dy, large } => {
                if self.selection.is_empty() {
                    return Ok(false);
                }
                self.nudge(DVec2::new(dx, dy), large)?;
            }
            Shortcut::Undo => {
                self.undo()?;
            }
            Shortcut::Redo => {
                self.redo()?;
            }
            Shortcut::SelectAll => self.select_all(),
            Shortcut::Group => {
                if self.selection.is_empty() {
                    return Ok(false);
                }
                self.group_selection()?;
            }
            Shortcut::Ungroup => {
                if self.selection.is_empty() {
                    return Ok(false);
                }
                return Ok(!self.ungroup_selection()?.is_empty());
            }
            Shortcut::BringForward => {
                let ids = self.selection.ids().to_vec();
                return Ok(self.bring_forward(&ids)? > 0);
            }
            Shortcut::SendBackward => {
                let ids = self.selection.ids().to_vec();
                return Ok(self.send_backward(&ids)? > 0);
            }
            Shortcut::Tool(tool) => self.set_tool(tool),
        }
        Ok(true)
    }

    // === Save and load ===

    /// Starts a save. Edits are rejected until [`Editor::finish_save`].
    pub fn begin_save(&mut self) -> Result<SaveJob, EditorError> {
        self.ensure_idle()?;
        self.cancel_gesture();
        self.io = Some(Io::Saving);
        Ok(SaveJob::new(self.document()))
    }

    /// Completes a save started with [`Editor::begin_save`], passing the
    /// job's outcome through.
    pub fn finish_save(&mut self, result: Result<SvgRecord, EditorError>) -> Result<SvgRecord, EditorError> {
        if self.io != Some(Io::Saving) {
            return Err(EditorError::NotBusy);
        }
        self.io = None;
        let record = result?;
        info!("saved {} ({})", record.name, record.id);
        Ok(record)
    }

    /// Starts loading a stored document. Edits are rejected until
    /// [`Editor::finish_load`].
    pub fn begin_load(&mut self, id: DocumentId) -> Result<LoadJob, EditorError> {
        self.ensure_idle()?;
        self.cancel_gesture();
        self.io = Some(Io::Loading);
        Ok(LoadJob::new(id))
    }

    /// Completes a load. On success the loaded document replaces the scene
    /// and the history and selection are reset; the renderer sees every old
    /// root removed and every new root inserted. Returns the warnings
    /// collected while reading the markup.
    pub fn finish_load(&mut self, result: Result<Loaded, EditorError>) -> Result<Vec<ParseWarning>, EditorError> {
        if self.io != Some(Io::Loading) {
            return Err(EditorError::NotBusy);
        }
        self.io = None;
        let Loaded { document, warnings } = result?;
        self.replace_document(document)?;
        info!("loaded {} ({})", self.info.name, self.info.id);
        Ok(warnings)
    }

    fn replace_document(&mut self, document: Document) -> Result<(), EditorError> {
        document.validate()?;
        let info = DocumentInfo::of(&document);
        let ids = IdGenerator::after(document.max_element_id());
        let mut sink = RenderOnly(&mut self.renderer);
        self.scene.reset(document.elements, &mut sink)?;
        self.info = info;
        self.ids = ids;
        self.history.clear();
        self.clear_selection();
        Ok(())
    }
}

/// Forwards scene changes to the renderer only.
struct RenderOnly<'a, R: RenderSink>(&'a mut R);

impl<R: RenderSink> ChangeSink for RenderOnly<'_, R> {
    fn notify(&mut self, change: SceneChange) {
        self.0.scene_changed(&change);
    }
}
