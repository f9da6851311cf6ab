use crate::node::NodeId;
use std::collections::HashSet;

/// Set of selected node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionManager {
    selected: HashSet<NodeId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on a node based on interaction modifiers
    pub fn handle_interaction(&mut self, id: &NodeId, shift_held: bool) {
        if shift_held {
            if !self.selected.remove(id) {
                self.selected.insert(id.clone());
            }
        } else {
            if self.selected.len() == 1 && self.selected.contains(id) {
                return;
            }
            self.selected.clear();
            self.selected.insert(id.clone());
        }
    }

    /// Clear the current selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the current selection with a new set of IDs
    ///
    /// Used by marquee selection and select-all.
    pub fn replace_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.selected.clear();
        self.selected.extend(ids);
    }

    /// Drop ids that no longer exist, e.g. after undo or delete.
    pub fn retain<F: FnMut(&NodeId) -> bool>(&mut self, keep: F) {
        self.selected.retain(keep);
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.selected.contains(id)
    }

    pub fn iter(&self) -> std::collections::hash_set::Iter<'_, NodeId> {
        self.selected.iter()
    }

    /// Selected ids in a stable (sorted) order.
    pub fn to_sorted_vec(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
