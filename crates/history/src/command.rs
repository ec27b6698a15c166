use crate::HistoryError;
use glam::DVec2;
use node::{Element, ElementId, Transform};
use scene_graph::{Discard, NodeState, SceneGraph};
use std::collections::HashSet;
use strum_macros::{AsRefStr, Display};

/// What kind of edit a command performs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    Insert,
    Remove,
    Translate,
    Transform,
    Update,
    Reorder,
    Reparent,
    Group,
    Ungroup,
}

type States = Vec<(ElementId, Option<NodeState>)>;

/// An edit recorded as before and after snapshots of every element it
/// touches.
///
/// Constructors replay the edit on a scratch copy of the scene, so an
/// invalid request fails here and a `Command` that exists can always be
/// applied to the scene it was built from.
#[derive(Clone, Debug)]
pub struct Command {
    kind: CommandKind,
    before: States,
    after: States,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn targets(&self) -> Vec<ElementId> {
        self.after.iter().map(|(id, _)| *id).collect()
    }

    pub fn before(&self) -> &[(ElementId, Option<NodeState>)] {
        &self.before
    }

    pub fn after(&self) -> &[(ElementId, Option<NodeState>)] {
        &self.after
    }

    /// Inserts `element` (and its subtree) at `index` under `parent`.
    pub fn insert(
        scene: &SceneGraph,
        parent: Option<ElementId>,
        element: Element,
        index: usize,
    ) -> Result<Self, HistoryError> {
        let targets = element.ids();
        Self::record(scene, CommandKind::Insert, targets, |scratch| {
            scratch.insert(parent, element, index, &mut Discard)?;
            Ok(())
        })
    }

    /// Inserts `element` on top of its future siblings.
    pub fn append(scene: &SceneGraph, parent: Option<ElementId>, element: Element) -> Result<Self, HistoryError> {
        let index = scene.children_of(parent)?.len();
        Self::insert(scene, parent, element, index)
    }

    /// Removes the elements with all of their descendants.
    pub fn remove(scene: &SceneGraph, ids: &[ElementId]) -> Result<Self, HistoryError> {
        let roots = outermost(scene, ids)?;
        let targets = roots.iter().flat_map(|&id| scene.subtree_ids_of(id)).collect();
        Self::record(scene, CommandKind::Remove, targets, |scratch| {
            for &id in &roots {
                scratch.remove(id, &mut Discard)?;
            }
            Ok(())
        })
    }

    /// Moves elements by `delta` in document space.
    ///
    /// The delta is mapped into each element's parent space through the
    /// inverse of the parent's world transform, then prepended to the
    /// element's own transform.
    pub fn translate(scene: &SceneGraph, ids: &[ElementId], delta: DVec2) -> Result<Self, HistoryError> {
        let targets = outermost(scene, ids)?;
        Self::record(scene, CommandKind::Translate, targets.clone(), |scratch| {
            for &id in &targets {
                let parent = parent_world(scratch, id)?;
                let local_delta = parent.inverse()?.apply_vector(delta);
                edit(scratch, id, |element| {
                    element.transform = Transform::translate(local_delta.x, local_delta.y).compose(&element.transform);
                })?;
            }
            Ok(())
        })
    }

    /// Applies `transform` to elements in document space, so that each new
    /// world transform is `transform · world`.
    pub fn transform(scene: &SceneGraph, ids: &[ElementId], transform: Transform) -> Result<Self, HistoryError> {
        let targets = outermost(scene, ids)?;
        Self::record(scene, CommandKind::Transform, targets.clone(), |scratch| {
            for &id in &targets {
                let parent = parent_world(scratch, id)?;
                let inverse = parent.inverse()?;
                edit(scratch, id, |element| {
                    element.transform = inverse
                        .compose(&transform)
                        .compose(&parent)
                        .compose(&element.transform);
                })?;
            }
            Ok(())
        })
    }

    /// Replaces the attributes of one element.
    pub fn update(scene: &SceneGraph, id: ElementId, attributes: Element) -> Result<Self, HistoryError> {
        Self::record(scene, CommandKind::Update, vec![id], |scratch| {
            scratch.update(id, attributes, &mut Discard)?;
            Ok(())
        })
    }

    /// Edits the attributes of several elements with the same function.
    pub fn update_each(
        scene: &SceneGraph,
        ids: &[ElementId],
        mut change: impl FnMut(&mut Element),
    ) -> Result<Self, HistoryError> {
        let targets = unique(scene, ids)?;
        Self::record(scene, CommandKind::Update, targets.clone(), |scratch| {
            for &id in &targets {
                edit(scratch, id, &mut change)?;
            }
            Ok(())
        })
    }

    /// Moves an element to `index` among its current siblings.
    pub fn reorder(scene: &SceneGraph, id: ElementId, index: usize) -> Result<Self, HistoryError> {
        let parent = scene.parent_of(id);
        Self::record(scene, CommandKind::Reorder, vec![id], |scratch| {
            scratch.move_to(id, parent, index, &mut Discard)?;
            Ok(())
        })
    }

    /// Moves an element under a new parent. Its transform is unchanged, so
    /// it follows the new parent's coordinate space.
    pub fn reparent(
        scene: &SceneGraph,
        id: ElementId,
        parent: Option<ElementId>,
        index: usize,
    ) -> Result<Self, HistoryError> {
        Self::record(scene, CommandKind::Reparent, vec![id], |scratch| {
            scratch.move_to(id, parent, index, &mut Discard)?;
            Ok(())
        })
    }

    /// Wraps elements in a new group, keeping their document-space
    /// position and relative z-order.
    ///
    /// The group takes the place of the topmost member. Members that live
    /// under another parent are re-expressed in the group's space.
    pub fn group(scene: &SceneGraph, ids: &[ElementId], group: Element) -> Result<Self, HistoryError> {
        let members = in_document_order(scene, outermost(scene, ids)?);
        let Some(&topmost) = members.last() else {
            return Err(HistoryError::NoTargets);
        };
        let group_id = group.id;
        let mut targets = vec![group_id];
        targets.extend(&members);

        let mut group = group.shallow();
        group.transform = Transform::IDENTITY;
        Self::record(scene, CommandKind::Group, targets, |scratch| {
            let placement = scratch
                .placement(topmost)
                .ok_or(scene_graph::SceneError::NotFound(topmost))?;
            scratch.insert(placement.parent, group, placement.index + 1, &mut Discard)?;
            let group_world = parent_world(scratch, group_id)?;
            let to_group = group_world.inverse()?;

            for (index, &id) in members.iter().enumerate() {
                let world = world(scratch, id)?;
                scratch.move_to(id, Some(group_id), index, &mut Discard)?;
                edit(scratch, id, |element| element.transform = to_group.compose(&world))?;
            }
            Ok(())
        })
    }

    /// Dissolves a group, moving its children to the group's parent at the
    /// group's position. Each child absorbs the group transform.
    pub fn ungroup(scene: &SceneGraph, group_id: ElementId) -> Result<Self, HistoryError> {
        let group = scene
            .find(group_id)
            .ok_or(scene_graph::SceneError::NotFound(group_id))?;
        if !group.is_group() {
            return Err(scene_graph::SceneError::NotAGroup(group_id).into());
        }
        let group_transform = group.transform;
        let children = scene.children_of(Some(group_id))?;
        let mut targets = vec![group_id];
        targets.extend(&children);

        Self::record(scene, CommandKind::Ungroup, targets, |scratch| {
            let placement = scratch
                .placement(group_id)
                .ok_or(scene_graph::SceneError::NotFound(group_id))?;
            for (offset, &child) in children.iter().enumerate() {
                scratch.move_to(child, placement.parent, placement.index + offset, &mut Discard)?;
                edit(scratch, child, |element| {
                    element.transform = group_transform.compose(&element.transform)
                })?;
            }
            scratch.remove(group_id, &mut Discard)?;
            Ok(())
        })
    }

    fn record(
        scene: &SceneGraph,
        kind: CommandKind,
        targets: Vec<ElementId>,
        mutate: impl FnOnce(&mut SceneGraph) -> Result<(), HistoryError>,
    ) -> Result<Self, HistoryError> {
        if targets.is_empty() {
            return Err(HistoryError::NoTargets);
        }
        let before = targets.iter().map(|&id| (id, scene.capture(id))).collect();
        let mut scratch = scene.clone();
        mutate(&mut scratch)?;
        let after = targets.iter().map(|&id| (id, scratch.capture(id))).collect();
        Ok(Self { kind, before, after })
    }
}

/// Rewrites one element's attributes in place on a scratch scene.
fn edit(scene: &mut SceneGraph, id: ElementId, change: impl FnOnce(&mut Element)) -> Result<(), HistoryError> {
    let mut element = scene
        .find(id)
        .ok_or(scene_graph::SceneError::NotFound(id))?
        .clone();
    change(&mut element);
    scene.update(id, element, &mut Discard)?;
    Ok(())
}

fn world(scene: &SceneGraph, id: ElementId) -> Result<Transform, HistoryError> {
    Ok(scene
        .world_transform(id)
        .ok_or(scene_graph::SceneError::NotFound(id))?)
}

fn parent_world(scene: &SceneGraph, id: ElementId) -> Result<Transform, HistoryError> {
    Ok(scene
        .parent_world_transform(id)
        .ok_or(scene_graph::SceneError::NotFound(id))?)
}

/// Deduplicates `ids`, failing on the first one not in the scene.
fn unique(scene: &SceneGraph, ids: &[ElementId]) -> Result<Vec<ElementId>, HistoryError> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(ids.len());
    for &id in ids {
        if !scene.contains(id) {
            return Err(scene_graph::SceneError::NotFound(id).into());
        }
        if seen.insert(id) {
            result.push(id);
        }
    }
    Ok(result)
}

/// Like [`unique`], additionally dropping ids whose ancestor is also
/// listed, since edits to the ancestor already carry them along.
fn outermost(scene: &SceneGraph, ids: &[ElementId]) -> Result<Vec<ElementId>, HistoryError> {
    let ids = unique(scene, ids)?;
    let set: HashSet<ElementId> = ids.iter().copied().collect();
    Ok(ids
        .iter()
        .copied()
        .filter(|&id| !set.iter().any(|&other| scene.is_descendant(id, other)))
        .collect())
}

fn in_document_order(scene: &SceneGraph, ids: Vec<ElementId>) -> Vec<ElementId> {
    let set: HashSet<ElementId> = ids.into_iter().collect();
    scene
        .traverse()
        .map(|visit| visit.element.id)
        .filter(|id| set.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use node::Point;
    use scene_graph::SceneError;

    fn id(n: u64) -> ElementId {
        ElementId::from_raw(n)
    }

    fn rect(n: u64) -> Element {
        Element::rect(id(n), 0.0, 0.0, 10.0, 10.0)
    }

    fn apply(scene: &mut SceneGraph, command: &Command) {
        scene.apply_states(command.after(), &mut Discard).unwrap();
    }

    #[test]
    fn test_insert_records_absent_before_state() {
        let scene = SceneGraph::new();
        let command = Command::append(&scene, None, Element::group(id(1), vec![rect(2)])).unwrap();
        assert_eq!(command.kind(), CommandKind::Insert);
        assert_eq!(command.targets(), vec![id(1), id(2)]);
        assert!(command.before().iter().all(|(_, state)| state.is_none()));
        assert!(command.after().iter().all(|(_, state)| state.is_some()));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_invalid_request_creates_no_command() {
        let scene = SceneGraph::from_elements(vec![rect(1)]).unwrap();
        assert_eq!(
            Command::insert(&scene, None, rect(1), 0).unwrap_err(),
            HistoryError::Scene(SceneError::DuplicateId(id(1)))
        );
        assert_eq!(
            Command::remove(&scene, &[id(9)]).unwrap_err(),
            HistoryError::Scene(SceneError::NotFound(id(9)))
        );
        assert_eq!(Command::remove(&scene, &[]).unwrap_err(), HistoryError::NoTargets);
    }

    #[test]
    fn test_remove_expands_to_descendants() {
        let scene = SceneGraph::from_elements(vec![Element::group(id(1), vec![rect(2), rect(3)])]).unwrap();
        let command = Command::remove(&scene, &[id(2), id(1)]).unwrap();
        assert_eq!(command.targets(), vec![id(1), id(2), id(3)]);
    }

    #[test]
    fn test_translate_maps_delta_into_parent_space() {
        let mut scene = SceneGraph::from_elements(vec![Element::group(id(1), vec![rect(2)])
            .with_transform(Transform::scale(2.0, 2.0))])
        .unwrap();
        let command = Command::translate(&scene, &[id(2)], DVec2::new(10.0, 0.0)).unwrap();
        apply(&mut scene, &command);

        let world = scene.world_transform(id(2)).unwrap();
        assert_eq!(world.apply(Point::ZERO), Point::new(10.0, 0.0));
        assert_eq!(scene.find(id(2)).unwrap().transform, Transform::translate(5.0, 0.0));
    }

    #[test]
    fn test_translate_skips_children_of_moved_groups() {
        let mut scene = SceneGraph::from_elements(vec![Element::group(id(1), vec![rect(2)])]).unwrap();
        let command = Command::translate(&scene, &[id(1), id(2)], DVec2::new(5.0, 5.0)).unwrap();
        assert_eq!(command.targets(), vec![id(1)]);
        apply(&mut scene, &command);
        let world = scene.world_transform(id(2)).unwrap();
        assert_eq!(world.apply(Point::ZERO), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_transform_prepends_in_document_space() {
        let mut scene = SceneGraph::from_elements(vec![Element::group(id(1), vec![rect(2)])
            .with_transform(Transform::translate(100.0, 0.0))])
        .unwrap();
        let rotate = Transform::rotate(90.0);
        let world_before = scene.world_transform(id(2)).unwrap();
        let command = Command::transform(&scene, &[id(2)], rotate).unwrap();
        apply(&mut scene, &command);

        let expected = rotate.compose(&world_before);
        assert!(scene.world_transform(id(2)).unwrap().approx_eq(&expected, 1e-9));
    }

    #[test]
    fn test_transform_rejects_singular_parent() {
        let scene = SceneGraph::from_elements(vec![Element::group(id(1), vec![rect(2)])
            .with_transform(Transform::scale(0.0, 1.0))])
        .unwrap();
        assert!(matches!(
            Command::translate(&scene, &[id(2)], DVec2::X),
            Err(HistoryError::Geometry(_))
        ));
    }

    #[test]
    fn test_group_keeps_world_position_and_order() {
        let mut scene = SceneGraph::from_elements(vec![
            rect(1).with_transform(Transform::translate(5.0, 0.0)),
            rect(2),
            rect(3),
        ])
        .unwrap();
        let command = Command::group(&scene, &[id(3), id(1)], Element::group(id(10), vec![])).unwrap();
        apply(&mut scene, &command);

        assert_eq!(scene.root_ids(), vec![id(2), id(10)]);
        assert_eq!(scene.children_of(Some(id(10))).unwrap(), vec![id(1), id(3)]);
        assert_eq!(scene.world_transform(id(1)), Some(Transform::translate(5.0, 0.0)));
    }

    #[test]
    fn test_ungroup_absorbs_group_transform() {
        let mut scene = SceneGraph::from_elements(vec![
            rect(1),
            Element::group(id(2), vec![rect(3), rect(4)]).with_transform(Transform::translate(7.0, 0.0)),
            rect(5),
        ])
        .unwrap();
        let command = Command::ungroup(&scene, id(2)).unwrap();
        apply(&mut scene, &command);

        assert_eq!(scene.root_ids(), vec![id(1), id(3), id(4), id(5)]);
        assert_eq!(scene.find(id(3)).unwrap().transform, Transform::translate(7.0, 0.0));
        assert_eq!(
            Command::ungroup(&scene, id(3)).unwrap_err(),
            HistoryError::Scene(SceneError::NotAGroup(id(3)))
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(CommandKind::Reparent.to_string(), "reparent");
        assert_eq!(CommandKind::Ungroup.as_ref(), "ungroup");
    }
}
