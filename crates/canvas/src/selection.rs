use node::ElementId;
use smallvec::SmallVec;

/// Selected element ids in the order they were selected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: SmallVec<[ElementId; 8]>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    /// Replaces the selection. Returns whether it changed.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ElementId>) -> bool {
        let mut next = SmallVec::new();
        for id in ids {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        if next == self.ids {
            return false;
        }
        self.ids = next;
        true
    }

    /// Adds an id if it is not already selected.
    pub fn add(&mut self, id: ElementId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Deselects a selected id, selects an unselected one.
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(index) = self.ids.iter().position(|&selected| selected == id) {
            self.ids.remove(index);
        } else {
            self.ids.push(id);
        }
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }

    /// Drops every id in `removed`. Returns whether anything was dropped.
    pub fn prune(&mut self, removed: &[ElementId]) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| !removed.contains(id));
        self.ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> ElementId {
        ElementId::from_raw(n)
    }

    #[test]
    fn test_set_dedups_and_keeps_order() {
        let mut selection = Selection::new();
        assert!(selection.set([id(3), id(1), id(3)]));
        assert_eq!(selection.ids(), &[id(3), id(1)]);
        assert!(!selection.set([id(3), id(1)]));
    }

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        selection.toggle(id(1));
        selection.toggle(id(2));
        selection.toggle(id(1));
        assert_eq!(selection.ids(), &[id(2)]);
    }

    #[test]
    fn test_prune() {
        let mut selection = Selection::new();
        selection.set([id(1), id(2), id(3)]);
        assert!(selection.prune(&[id(2), id(9)]));
        assert_eq!(selection.ids(), &[id(1), id(3)]);
        assert!(!selection.prune(&[id(9)]));
    }
}
