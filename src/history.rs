//! Snapshot-based undo/redo.
//!
//! The manager only stores copies; applying a snapshot to the live graph is
//! the caller's job.

use crate::node::{Connection, Group, GraphSnapshot, Node};
use std::collections::VecDeque;
use tracing::debug;

/// Bounded ring of graph snapshots with a cursor.
///
/// ```
/// use workflow_canvas::HistoryManager;
///
/// let mut history = HistoryManager::new(10);
/// history.save_to_history(&[], &[], &[]);
/// assert!(!history.can_undo());
/// ```
#[derive(Debug, Clone)]
pub struct HistoryManager {
    snapshots: VecDeque<GraphSnapshot>,
    cursor: usize,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(50)
    }
}

impl HistoryManager {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Deep-copy the triple and push it.
    pub fn save_to_history(&mut self, nodes: &[Node], connections: &[Connection], groups: &[Group]) {
        self.push(GraphSnapshot::capture(nodes, connections, groups));
    }

    /// Push a snapshot, dropping any redo tail and evicting the oldest entry
    /// when full.
    pub fn push(&mut self, snapshot: GraphSnapshot) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        debug!(len = self.snapshots.len(), "history push");
    }

    /// Push only if `snapshot` differs from the one at the cursor. Returns
    /// whether anything was pushed.
    pub fn push_if_changed(&mut self, snapshot: GraphSnapshot) -> bool {
        if self.current() == Some(&snapshot) {
            return false;
        }
        self.push(snapshot);
        true
    }

    /// Overwrite the entry at the cursor without touching the redo tail.
    pub fn replace_current(&mut self, snapshot: GraphSnapshot) {
        match self.snapshots.get_mut(self.cursor) {
            Some(slot) => *slot = snapshot,
            None => self.push(snapshot),
        }
    }

    /// Step back. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&GraphSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        debug!(cursor = self.cursor, "history undo");
        self.snapshots.get(self.cursor)
    }

    /// Step forward. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&GraphSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, "history redo");
        self.snapshots.get(self.cursor)
    }

    pub fn current(&self) -> Option<&GraphSnapshot> {
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }
}
