//! # Scene Graph
//!
//! The live, editable element tree. Every node lives in a [`SlotMap`] and
//! links to its parent and its ordered children; a side table maps the
//! stable [`ElementId`]s used everywhere else onto slot keys.
//!
//! A node's position in its parent's child list is its z-order: index 0 is
//! drawn first. Root-level elements behave the same way through the
//! graph's own root list.
//!
//! Every mutation checks its preconditions before touching the tree, so a
//! failed call leaves the graph exactly as it was. Successful mutations
//! report what they did to the [`ChangeSink`] passed in by the caller.

mod change;
mod error;
mod state;
mod traverse;

pub use change::{ChangeKind, ChangeSink, Discard, SceneChange};
pub use error::SceneError;
pub use state::NodeState;
pub use traverse::{Traverse, Visit};

use log::debug;
use node::{Bounds, Element, ElementId, Transform};
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};

slotmap::new_key_type! {
    /// Slot key of a node inside one scene graph.
    pub struct SceneNodeId;
}

/// Where an element sits in the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// `None` for root-level elements.
    pub parent: Option<ElementId>,
    pub index: usize,
}

/// One element in the tree. The stored element carries no children; the
/// hierarchy lives in `parent`/`children`.
#[derive(Clone, Debug)]
pub struct SceneNode {
    parent: Option<SceneNodeId>,
    children: Vec<SceneNodeId>,
    element: Element,
}

impl SceneNode {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn children(&self) -> &[SceneNodeId] {
        &self.children
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<SceneNodeId, SceneNode>,
    roots: Vec<SceneNodeId>,
    node_mapping: HashMap<ElementId, SceneNodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph holding `elements` as root-level trees, in order.
    pub fn from_elements(elements: Vec<Element>) -> Result<Self, SceneError> {
        let mut graph = Self::new();
        for element in elements {
            let index = graph.roots.len();
            graph.insert(None, element, index, &mut Discard)?;
        }
        Ok(graph)
    }

    /// Deep copies of the root-level trees, in z-order.
    pub fn to_elements(&self) -> Vec<Element> {
        self.roots.iter().map(|&key| self.build(key)).collect()
    }

    /// Replaces the whole content. Old roots are reported as removed, then
    /// the new roots as inserted.
    pub fn reset(&mut self, elements: Vec<Element>, sink: &mut dyn ChangeSink) -> Result<(), SceneError> {
        let replacement = Self::from_elements(elements)?;
        let removed: Vec<(ElementId, Vec<ElementId>)> = self
            .roots
            .iter()
            .map(|&key| (self.nodes[key].element.id, self.subtree_ids(key)))
            .collect();
        *self = replacement;
        debug!("scene reset: {} root(s) out, {} in", removed.len(), self.roots.len());

        for (id, subtree) in removed {
            sink.notify(SceneChange::Removed { id, subtree });
        }
        for id in self.root_ids() {
            sink.notify(SceneChange::Inserted { id });
        }
        Ok(())
    }

    /// Number of elements in the tree, at any depth.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.node_mapping.contains_key(&id)
    }

    /// The element's own attributes. The returned element has no children;
    /// use [`SceneGraph::subtree`] for a deep copy.
    pub fn find(&self, id: ElementId) -> Option<&Element> {
        self.key(id).map(|key| &self.nodes[key].element)
    }

    pub fn node(&self, id: ElementId) -> Option<&SceneNode> {
        self.key(id).map(|key| &self.nodes[key])
    }

    /// Deep copy of an element and its descendants.
    pub fn subtree(&self, id: ElementId) -> Option<Element> {
        self.key(id).map(|key| self.build(key))
    }

    pub fn placement(&self, id: ElementId) -> Option<Placement> {
        let key = self.key(id)?;
        let parent = self.nodes[key].parent;
        let index = self.siblings(parent).iter().position(|&k| k == key)?;
        Some(Placement {
            parent: parent.map(|p| self.nodes[p].element.id),
            index,
        })
    }

    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        let key = self.key(id)?;
        self.nodes[key].parent.map(|p| self.nodes[p].element.id)
    }

    /// Children of `parent` in z-order, or the root-level elements for
    /// `None`.
    pub fn children_of(&self, parent: Option<ElementId>) -> Result<Vec<ElementId>, SceneError> {
        let parent_key = parent.map(|id| self.key(id).ok_or(SceneError::NotFound(id))).transpose()?;
        Ok(self.ids_of(self.siblings(parent_key)))
    }

    pub fn root_ids(&self) -> Vec<ElementId> {
        self.ids_of(&self.roots)
    }

    /// The element and all of its descendants, in pre-order.
    pub fn subtree_ids_of(&self, id: ElementId) -> Vec<ElementId> {
        self.key(id).map(|key| self.subtree_ids(key)).unwrap_or_default()
    }

    /// Number of ancestors; root-level elements have depth 0.
    pub fn depth(&self, id: ElementId) -> Option<usize> {
        let mut key = self.key(id)?;
        let mut depth = 0;
        while let Some(parent) = self.nodes[key].parent {
            depth += 1;
            key = parent;
        }
        Some(depth)
    }

    /// True when `ancestor` is a strict ancestor of `id`.
    pub fn is_descendant(&self, id: ElementId, ancestor: ElementId) -> bool {
        match (self.key(id), self.key(ancestor)) {
            (Some(key), Some(ancestor)) => key != ancestor && self.is_ancestor(ancestor, key),
            _ => false,
        }
    }

    /// Pre-order walk over the whole tree. Each call starts a fresh walk.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse::new(self)
    }

    /// Composition of every ancestor transform with the element's own,
    /// mapping element space to document space.
    pub fn world_transform(&self, id: ElementId) -> Option<Transform> {
        let key = self.key(id)?;
        Some(self.world_transform_of(key))
    }

    /// Transform mapping the element's parent space to document space.
    pub fn parent_world_transform(&self, id: ElementId) -> Option<Transform> {
        let key = self.key(id)?;
        Some(
            self.nodes[key]
                .parent
                .map_or(Transform::IDENTITY, |parent| self.world_transform_of(parent)),
        )
    }

    /// Document-space bounding box. Groups use the union of their
    /// children; empty groups have no bounds.
    pub fn world_bounds(&self, id: ElementId) -> Option<Bounds> {
        let key = self.key(id)?;
        self.world_bounds_of(key, &self.world_transform_of(key))
    }

    /// Inserts `element`, with its subtree, at `index` among the children
    /// of `parent` (or among the roots).
    pub fn insert(
        &mut self,
        parent: Option<ElementId>,
        element: Element,
        index: usize,
        sink: &mut dyn ChangeSink,
    ) -> Result<(), SceneError> {
        element.validate()?;
        let mut incoming = HashSet::new();
        for id in element.ids() {
            if self.contains(id) || !incoming.insert(id) {
                return Err(SceneError::DuplicateId(id));
            }
        }
        let parent_key = self.group_key(parent)?;
        let len = self.siblings(parent_key).len();
        if index > len {
            return Err(SceneError::IndexOutOfBounds { index, len });
        }

        let id = element.id;
        let key = self.build_nodes(parent_key, element);
        self.siblings_mut(parent_key).insert(index, key);
        sink.notify(SceneChange::Inserted { id });
        Ok(())
    }

    /// Removes an element and its subtree, returning them.
    pub fn remove(&mut self, id: ElementId, sink: &mut dyn ChangeSink) -> Result<Element, SceneError> {
        let key = self.key(id).ok_or(SceneError::NotFound(id))?;
        let removed = self.build(key);
        let subtree = self.subtree_ids(key);
        self.detach(key);
        self.drop_nodes(key);
        sink.notify(SceneChange::Removed { id, subtree });
        Ok(removed)
    }

    /// Moves an element to `index` among the children of `new_parent`.
    ///
    /// The index addresses the sibling list as it is once the element has
    /// been taken out of its current position.
    pub fn move_to(
        &mut self,
        id: ElementId,
        new_parent: Option<ElementId>,
        index: usize,
        sink: &mut dyn ChangeSink,
    ) -> Result<(), SceneError> {
        let key = self.key(id).ok_or(SceneError::NotFound(id))?;
        let parent_key = self.group_key(new_parent)?;
        if let (Some(parent_id), Some(parent_key)) = (new_parent, parent_key) {
            if self.is_ancestor(key, parent_key) {
                return Err(SceneError::CyclicParent { id, parent: parent_id });
            }
        }
        let siblings = self.siblings(parent_key);
        let len = siblings.len() - usize::from(siblings.contains(&key));
        if index > len {
            return Err(SceneError::IndexOutOfBounds { index, len });
        }

        self.detach(key);
        self.attach(key, parent_key, index);
        sink.notify(SceneChange::Reordered { id });
        Ok(())
    }

    /// Replaces geometry, style and transform of an element, keeping its
    /// place and children. Returns the previous attributes.
    pub fn update(
        &mut self,
        id: ElementId,
        attributes: Element,
        sink: &mut dyn ChangeSink,
    ) -> Result<Element, SceneError> {
        let key = self.key(id).ok_or(SceneError::NotFound(id))?;
        let mut element = attributes.shallow();
        element.id = id;
        element.validate_attributes()?;
        if element.is_group() != self.nodes[key].element.is_group() {
            return Err(SceneError::KindChange(id));
        }

        let previous = std::mem::replace(&mut self.nodes[key].element, element);
        sink.notify(SceneChange::Updated { id });
        Ok(previous)
    }

    fn key(&self, id: ElementId) -> Option<SceneNodeId> {
        self.node_mapping.get(&id).copied()
    }

    /// Resolves a parent id to the key of a group, or `None` for the root.
    fn group_key(&self, parent: Option<ElementId>) -> Result<Option<SceneNodeId>, SceneError> {
        let Some(parent) = parent else {
            return Ok(None);
        };
        let key = self.key(parent).ok_or(SceneError::NotFound(parent))?;
        if !self.nodes[key].element.is_group() {
            return Err(SceneError::NotAGroup(parent));
        }
        Ok(Some(key))
    }

    fn siblings(&self, parent: Option<SceneNodeId>) -> &[SceneNodeId] {
        match parent {
            Some(parent) => &self.nodes[parent].children,
            None => &self.roots,
        }
    }

    fn siblings_mut(&mut self, parent: Option<SceneNodeId>) -> &mut Vec<SceneNodeId> {
        match parent {
            Some(parent) => &mut self.nodes[parent].children,
            None => &mut self.roots,
        }
    }

    fn ids_of(&self, keys: &[SceneNodeId]) -> Vec<ElementId> {
        keys.iter().map(|&key| self.nodes[key].element.id).collect()
    }

    /// True when `node` is `descendant` or one of its ancestors.
    fn is_ancestor(&self, node: SceneNodeId, descendant: SceneNodeId) -> bool {
        let mut current = Some(descendant);
        while let Some(key) = current {
            if key == node {
                return true;
            }
            current = self.nodes.get(key).and_then(|n| n.parent);
        }
        false
    }

    fn build(&self, key: SceneNodeId) -> Element {
        let node = &self.nodes[key];
        let mut element = node.element.clone();
        element.children = node.children.iter().map(|&child| self.build(child)).collect();
        element
    }

    fn subtree_ids(&self, key: SceneNodeId) -> Vec<ElementId> {
        let mut ids = Vec::new();
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            ids.push(node.element.id);
            stack.extend(node.children.iter().rev());
        }
        ids
    }

    /// Creates nodes for `element` and its subtree without linking the
    /// top node into its parent's child list.
    fn build_nodes(&mut self, parent: Option<SceneNodeId>, mut element: Element) -> SceneNodeId {
        let children = std::mem::take(&mut element.children);
        let id = element.id;
        let key = self.nodes.insert(SceneNode {
            parent,
            children: Vec::with_capacity(children.len()),
            element,
        });
        self.node_mapping.insert(id, key);
        for child in children {
            let child_key = self.build_nodes(Some(key), child);
            self.nodes[key].children.push(child_key);
        }
        key
    }

    /// Unlinks a node from its parent (or the root list). The node keeps
    /// its own children.
    fn detach(&mut self, key: SceneNodeId) {
        let parent = self.nodes[key].parent.take();
        self.siblings_mut(parent).retain(|&k| k != key);
    }

    fn attach(&mut self, key: SceneNodeId, parent: Option<SceneNodeId>, index: usize) {
        self.nodes[key].parent = parent;
        self.siblings_mut(parent).insert(index, key);
    }

    /// Frees a detached node and everything below it.
    fn drop_nodes(&mut self, key: SceneNodeId) {
        if let Some(node) = self.nodes.remove(key) {
            self.node_mapping.remove(&node.element.id);
            for child in node.children {
                self.drop_nodes(child);
            }
        }
    }

    fn world_transform_of(&self, key: SceneNodeId) -> Transform {
        let mut transform = self.nodes[key].element.transform;
        let mut current = self.nodes[key].parent;
        while let Some(parent) = current {
            transform = self.nodes[parent].element.transform.compose(&transform);
            current = self.nodes[parent].parent;
        }
        transform
    }

    fn world_bounds_of(&self, key: SceneNodeId, world: &Transform) -> Option<Bounds> {
        let node = &self.nodes[key];
        if node.element.is_group() {
            node.children
                .iter()
                .filter_map(|&child| {
                    let child_world = world.compose(&self.nodes[child].element.transform);
                    self.world_bounds_of(child, &child_world)
                })
                .reduce(|a, b| a.union(&b))
        } else {
            node.element.local_bounds().map(|bounds| bounds.transformed(world))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use node::Point;

    fn id(n: u64) -> ElementId {
        ElementId::from_raw(n)
    }

    fn rect(n: u64) -> Element {
        Element::rect(id(n), 0.0, 0.0, 10.0, 10.0)
    }

    /// Roots: g1[r2, r3], r4
    fn sample() -> SceneGraph {
        SceneGraph::from_elements(vec![Element::group(id(1), vec![rect(2), rect(3)]), rect(4)]).unwrap()
    }

    #[test]
    fn test_insert_and_find() {
        let mut graph = SceneGraph::new();
        let mut changes = Vec::new();
        graph.insert(None, rect(1), 0, &mut changes).unwrap();
        graph.insert(None, rect(2), 0, &mut changes).unwrap();

        assert_eq!(graph.root_ids(), vec![id(2), id(1)]);
        assert!(graph.find(id(1)).is_some());
        assert_eq!(
            changes,
            vec![SceneChange::Inserted { id: id(1) }, SceneChange::Inserted { id: id(2) }]
        );
    }

    #[test]
    fn test_insert_rejections_leave_tree_unchanged() {
        let mut graph = sample();
        let mut changes = Vec::new();

        assert_eq!(graph.insert(None, rect(2), 0, &mut changes), Err(SceneError::DuplicateId(id(2))));
        assert_eq!(
            graph.insert(Some(id(4)), rect(9), 0, &mut changes),
            Err(SceneError::NotAGroup(id(4)))
        );
        assert_eq!(
            graph.insert(Some(id(99)), rect(9), 0, &mut changes),
            Err(SceneError::NotFound(id(99)))
        );
        assert_eq!(
            graph.insert(Some(id(1)), rect(9), 3, &mut changes),
            Err(SceneError::IndexOutOfBounds { index: 3, len: 2 })
        );
        let invalid = Element::rect(id(9), 0.0, 0.0, -5.0, 1.0);
        assert!(matches!(
            graph.insert(None, invalid, 0, &mut changes),
            Err(SceneError::Validation(_))
        ));
        let duplicate_inside = Element::group(id(9), vec![rect(10), rect(10)]);
        assert_eq!(
            graph.insert(None, duplicate_inside, 0, &mut changes),
            Err(SceneError::DuplicateId(id(10)))
        );

        assert!(changes.is_empty());
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_remove_returns_subtree_and_reports_ids() {
        let mut graph = sample();
        let mut changes = Vec::new();
        let removed = graph.remove(id(1), &mut changes).unwrap();

        assert_eq!(removed.children.len(), 2);
        assert_eq!(graph.len(), 1);
        assert!(!graph.contains(id(2)));
        assert_eq!(
            changes,
            vec![SceneChange::Removed {
                id: id(1),
                subtree: vec![id(1), id(2), id(3)],
            }]
        );
    }

    #[test]
    fn test_move_reorders_and_reparents() {
        let mut graph = sample();
        let mut changes = Vec::new();

        graph.move_to(id(4), Some(id(1)), 1, &mut changes).unwrap();
        assert_eq!(graph.children_of(Some(id(1))).unwrap(), vec![id(2), id(4), id(3)]);
        assert_eq!(graph.root_ids(), vec![id(1)]);

        graph.move_to(id(2), Some(id(1)), 2, &mut changes).unwrap();
        assert_eq!(graph.children_of(Some(id(1))).unwrap(), vec![id(4), id(3), id(2)]);
        assert_eq!(
            graph.placement(id(2)),
            Some(Placement {
                parent: Some(id(1)),
                index: 2
            })
        );
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.kind() == ChangeKind::Reorder));
    }

    #[test]
    fn test_cyclic_move_fails_and_leaves_tree_unchanged() {
        let mut graph = SceneGraph::from_elements(vec![Element::group(
            id(1),
            vec![Element::group(id(2), vec![rect(3)])],
        )])
        .unwrap();
        let before = graph.to_elements();
        let mut changes = Vec::new();

        assert_eq!(
            graph.move_to(id(1), Some(id(2)), 0, &mut changes),
            Err(SceneError::CyclicParent {
                id: id(1),
                parent: id(2)
            })
        );
        assert_eq!(
            graph.move_to(id(1), Some(id(1)), 0, &mut changes),
            Err(SceneError::CyclicParent {
                id: id(1),
                parent: id(1)
            })
        );
        assert_eq!(graph.to_elements(), before);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_update_keeps_place_and_children() {
        let mut graph = sample();
        let mut changes = Vec::new();
        let moved = Element::group(id(1), vec![]).with_transform(Transform::translate(5.0, 0.0));
        graph.update(id(1), moved, &mut changes).unwrap();

        assert_eq!(graph.children_of(Some(id(1))).unwrap(), vec![id(2), id(3)]);
        assert_eq!(graph.find(id(1)).unwrap().transform, Transform::translate(5.0, 0.0));
        assert_eq!(changes, vec![SceneChange::Updated { id: id(1) }]);

        assert_eq!(graph.update(id(1), rect(1), &mut changes), Err(SceneError::KindChange(id(1))));
    }

    #[test]
    fn test_world_transform_and_bounds() {
        let graph = SceneGraph::from_elements(vec![Element::group(
            id(1),
            vec![
                Element::rect(id(2), 0.0, 0.0, 10.0, 10.0).with_transform(Transform::scale(2.0, 2.0)),
                Element::rect(id(3), 50.0, 50.0, 10.0, 10.0),
            ],
        )
        .with_transform(Transform::translate(100.0, 0.0))])
        .unwrap();

        let world = graph.world_transform(id(2)).unwrap();
        assert_eq!(world.apply(Point::new(1.0, 1.0)), Point::new(102.0, 2.0));

        let child = graph.world_bounds(id(2)).unwrap();
        assert_eq!(child.min, Point::new(100.0, 0.0));
        assert_eq!(child.max, Point::new(120.0, 20.0));

        let group = graph.world_bounds(id(1)).unwrap();
        assert_eq!(group.min, Point::new(100.0, 0.0));
        assert_eq!(group.max, Point::new(160.0, 60.0));

        assert_eq!(graph.parent_world_transform(id(2)), Some(Transform::translate(100.0, 0.0)));
    }

    #[test]
    fn test_reset_reports_removals_then_insertions() {
        let mut graph = sample();
        let mut changes = Vec::new();
        graph.reset(vec![rect(7)], &mut changes).unwrap();

        assert_eq!(graph.root_ids(), vec![id(7)]);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].kind(), ChangeKind::Remove);
        assert_eq!(changes[2], SceneChange::Inserted { id: id(7) });
    }

    #[test]
    fn test_depth_and_descendants() {
        let graph = sample();
        assert_eq!(graph.depth(id(3)), Some(1));
        assert_eq!(graph.depth(id(4)), Some(0));
        assert!(graph.is_descendant(id(3), id(1)));
        assert!(!graph.is_descendant(id(1), id(1)));
        assert_eq!(graph.subtree_ids_of(id(1)), vec![id(1), id(2), id(3)]);
    }
}
