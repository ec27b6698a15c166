use crate::{SceneGraph, SceneNodeId};
use node::Element;

/// An element reached during a walk, with its depth below the root level.
#[derive(Clone, Copy, Debug)]
pub struct Visit<'a> {
    pub element: &'a Element,
    pub depth: usize,
}

/// Lazy pre-order walk over a [`SceneGraph`].
///
/// Cloning the iterator forks the walk at its current position.
#[derive(Clone)]
pub struct Traverse<'a> {
    graph: &'a SceneGraph,
    stack: Vec<(SceneNodeId, usize)>,
}

impl<'a> Traverse<'a> {
    pub(crate) fn new(graph: &'a SceneGraph) -> Self {
        let stack = graph.roots.iter().rev().map(|&key| (key, 0)).collect();
        Self { graph, stack }
    }
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, depth) = self.stack.pop()?;
        let node = &self.graph.nodes[key];
        self.stack
            .extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        Some(Visit {
            element: &node.element,
            depth,
        })
    }
}
