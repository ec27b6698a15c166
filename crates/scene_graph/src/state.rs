//! Snapshots of individual nodes and atomic transitions between them.
//!
//! Commands record a [`NodeState`] (or its absence) for each element they
//! touch, once before and once after. Undo and redo are then nothing more
//! than [`SceneGraph::apply_states`] with one of the two lists.

use crate::{ChangeSink, SceneChange, SceneError, SceneGraph, SceneNode, SceneNodeId};
use node::{Element, ElementId};
use std::collections::HashSet;

/// Placement and attributes of one element. `element` carries no children.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeState {
    pub parent: Option<ElementId>,
    pub index: usize,
    pub element: Element,
}

impl SceneGraph {
    /// Records the current state of `id`, or `None` when it is absent.
    pub fn capture(&self, id: ElementId) -> Option<NodeState> {
        let placement = self.placement(id)?;
        Some(NodeState {
            parent: placement.parent,
            index: placement.index,
            element: self.find(id)?.clone(),
        })
    }

    pub fn capture_all(&self, ids: &[ElementId]) -> Vec<Option<NodeState>> {
        ids.iter().map(|&id| self.capture(id)).collect()
    }

    /// Moves every listed element to its given state: `None` removes it,
    /// `Some` creates, moves or updates it as needed.
    ///
    /// The whole transition is staged on a copy. Nothing changes and no
    /// notification is sent unless every step succeeds. Applying the same
    /// states twice is a no-op the second time.
    pub fn apply_states(
        &mut self,
        states: &[(ElementId, Option<NodeState>)],
        sink: &mut dyn ChangeSink,
    ) -> Result<(), SceneError> {
        let mut staged = self.clone();
        let mut changes = Vec::new();
        staged.stage(self, states, &mut changes)?;
        *self = staged;
        for change in changes {
            sink.notify(change);
        }
        Ok(())
    }

    fn stage(
        &mut self,
        before: &SceneGraph,
        states: &[(ElementId, Option<NodeState>)],
        changes: &mut Vec<SceneChange>,
    ) -> Result<(), SceneError> {
        let mut pending: Vec<(ElementId, SceneNodeId, &NodeState)> = Vec::new();
        let mut created = HashSet::new();

        // Unlink everything that will be placed again.
        for (id, state) in states {
            if let (Some(key), Some(state)) = (self.key(*id), state) {
                self.detach(key);
                pending.push((*id, key, state));
            }
        }

        // Remove leaving elements, outermost first so each subtree is
        // reported once.
        let mut leaving: Vec<ElementId> = states
            .iter()
            .filter(|(id, state)| state.is_none() && self.contains(*id))
            .map(|(id, _)| *id)
            .collect();
        leaving.sort_by_key(|id| before.depth(*id).unwrap_or(0));
        for id in leaving {
            let Some(key) = self.key(id) else {
                continue;
            };
            let subtree = self.subtree_ids(key);
            self.detach(key);
            self.drop_nodes(key);
            changes.push(SceneChange::Removed { id, subtree });
        }

        // Create arriving elements and refresh attributes of the rest.
        for (id, state) in states {
            let Some(state) = state else {
                continue;
            };
            let mut element = state.element.shallow();
            element.id = *id;
            element.validate_attributes()?;

            match self.key(*id) {
                Some(key) => {
                    if element.is_group() != self.nodes[key].element.is_group() {
                        return Err(SceneError::KindChange(*id));
                    }
                    self.nodes[key].element = element;
                }
                None => {
                    let key = self.nodes.insert(SceneNode {
                        parent: None,
                        children: Vec::new(),
                        element,
                    });
                    self.node_mapping.insert(*id, key);
                    created.insert(*id);
                    pending.push((*id, key, state));
                }
            }
        }

        // Link pending elements, parents before children and lower indices
        // first, so every index is exact at the moment it is used.
        pending.sort_by_key(|(_, _, state)| state.index);
        while !pending.is_empty() {
            let waiting: HashSet<ElementId> = pending.iter().map(|(id, _, _)| *id).collect();
            let (ready, rest): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|(_, _, state)| state.parent.map_or(true, |p| !waiting.contains(&p)));

            if ready.is_empty() {
                // Every remaining element waits on another one: a cycle.
                let (id, _, state) = rest[0];
                return Err(SceneError::CyclicParent {
                    id,
                    parent: state.parent.unwrap_or(id),
                });
            }

            for (id, key, state) in ready {
                let parent_key = self.group_key(state.parent)?;
                if let (Some(parent), Some(parent_key)) = (state.parent, parent_key) {
                    if self.is_ancestor(key, parent_key) {
                        return Err(SceneError::CyclicParent { id, parent });
                    }
                }
                let len = self.siblings(parent_key).len();
                if state.index > len {
                    return Err(SceneError::IndexOutOfBounds {
                        index: state.index,
                        len,
                    });
                }
                self.attach(key, parent_key, state.index);
            }
            pending = rest;
        }

        for (id, state) in states {
            let Some(state) = state else {
                continue;
            };
            if created.contains(id) {
                if state.parent.map_or(true, |p| !created.contains(&p)) {
                    changes.push(SceneChange::Inserted { id: *id });
                }
                continue;
            }
            if before.find(*id) != self.find(*id) {
                changes.push(SceneChange::Updated { id: *id });
            }
            if before.placement(*id) != self.placement(*id) {
                changes.push(SceneChange::Reordered { id: *id });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Discard;
    use node::Transform;

    fn id(n: u64) -> ElementId {
        ElementId::from_raw(n)
    }

    fn rect(n: u64) -> Element {
        Element::rect(id(n), n as f64, 0.0, 10.0, 10.0)
    }

    fn capture(graph: &SceneGraph, ids: &[ElementId]) -> Vec<(ElementId, Option<NodeState>)> {
        ids.iter().map(|&id| (id, graph.capture(id))).collect()
    }

    #[test]
    fn test_capture_records_placement() {
        let graph = SceneGraph::from_elements(vec![rect(1), Element::group(id(2), vec![rect(3)])]).unwrap();
        let state = graph.capture(id(3)).unwrap();
        assert_eq!(state.parent, Some(id(2)));
        assert_eq!(state.index, 0);
        assert_eq!(state.element, rect(3));
        assert!(graph.capture(id(9)).is_none());
    }

    #[test]
    fn test_apply_states_round_trips_removal() {
        let mut graph = SceneGraph::from_elements(vec![
            rect(1),
            Element::group(id(2), vec![rect(3), rect(4)]),
            rect(5),
        ])
        .unwrap();
        let original = graph.to_elements();
        let targets = [id(2), id(3), id(4)];
        let before = capture(&graph, &targets);
        let after: Vec<_> = targets.iter().map(|&id| (id, None)).collect();

        let mut changes = Vec::new();
        graph.apply_states(&after, &mut changes).unwrap();
        assert_eq!(graph.root_ids(), vec![id(1), id(5)]);
        assert_eq!(
            changes,
            vec![SceneChange::Removed {
                id: id(2),
                subtree: vec![id(2), id(3), id(4)],
            }]
        );

        changes.clear();
        graph.apply_states(&before, &mut changes).unwrap();
        assert_eq!(graph.to_elements(), original);
        assert_eq!(changes, vec![SceneChange::Inserted { id: id(2) }]);
    }

    #[test]
    fn test_apply_states_is_idempotent() {
        let mut graph = SceneGraph::from_elements(vec![rect(1), rect(2)]).unwrap();
        let mut scratch = graph.clone();
        scratch.move_to(id(1), None, 1, &mut Discard).unwrap();
        scratch
            .update(id(1), rect(1).with_transform(Transform::translate(3.0, 4.0)), &mut Discard)
            .unwrap();
        let after = capture(&scratch, &[id(1)]);

        let mut changes = Vec::new();
        graph.apply_states(&after, &mut changes).unwrap();
        assert_eq!(graph.root_ids(), vec![id(2), id(1)]);
        assert_eq!(
            changes,
            vec![SceneChange::Updated { id: id(1) }, SceneChange::Reordered { id: id(1) }]
        );

        changes.clear();
        graph.apply_states(&after, &mut changes).unwrap();
        assert_eq!(graph.to_elements(), scratch.to_elements());
        assert!(changes.is_empty());
    }

    #[test]
    fn test_apply_states_reparents_children_out_of_removed_group() {
        let mut graph =
            SceneGraph::from_elements(vec![rect(1), Element::group(id(2), vec![rect(3), rect(4)])]).unwrap();
        let before = capture(&graph, &[id(2), id(3), id(4)]);

        let mut scratch = graph.clone();
        scratch.move_to(id(3), None, 1, &mut Discard).unwrap();
        scratch.move_to(id(4), None, 2, &mut Discard).unwrap();
        scratch.remove(id(2), &mut Discard).unwrap();
        let after = capture(&scratch, &[id(2), id(3), id(4)]);

        graph.apply_states(&after, &mut Discard).unwrap();
        assert_eq!(graph.root_ids(), vec![id(1), id(3), id(4)]);

        graph.apply_states(&before, &mut Discard).unwrap();
        assert_eq!(graph.root_ids(), vec![id(1), id(2)]);
        assert_eq!(graph.children_of(Some(id(2))).unwrap(), vec![id(3), id(4)]);
    }

    #[test]
    fn test_failed_apply_changes_nothing() {
        let mut graph = SceneGraph::from_elements(vec![rect(1), rect(2)]).unwrap();
        let original = graph.to_elements();
        let states = vec![
            (id(1), None),
            (
                id(2),
                Some(NodeState {
                    parent: Some(id(42)),
                    index: 0,
                    element: rect(2),
                }),
            ),
        ];

        let mut changes = Vec::new();
        assert_eq!(graph.apply_states(&states, &mut changes), Err(SceneError::NotFound(id(42))));
        assert_eq!(graph.to_elements(), original);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_apply_states_rejects_cycles() {
        let mut graph =
            SceneGraph::from_elements(vec![Element::group(id(1), vec![]), Element::group(id(2), vec![])]).unwrap();
        let group = |n| Element::group(id(n), vec![]);
        let states = vec![
            (
                id(1),
                Some(NodeState {
                    parent: Some(id(2)),
                    index: 0,
                    element: group(1),
                }),
            ),
            (
                id(2),
                Some(NodeState {
                    parent: Some(id(1)),
                    index: 0,
                    element: group(2),
                }),
            ),
        ];

        assert!(matches!(
            graph.apply_states(&states, &mut Discard),
            Err(SceneError::CyclicParent { .. })
        ));
        assert_eq!(graph.root_ids(), vec![id(1), id(2)]);
    }
}
