//! Glue between the headless engine and a Slint front end.
//!
//! ```ignore
//! let controller = CanvasController::new(CanvasConfig::default(), SlintFrameScheduler::default());
//! let nodes = Rc::new(VecModel::<NodeRow>::default());
//! window.set_nodes(nodes.clone().into());
//!
//! let c = controller.clone();
//! window.on_pointer_up(move |x, y| {
//!     c.pointer_up(PointerEvent::primary(x, y));
//!     sync_nodes_to_model(c.store().nodes(), &nodes, |n| NodeRow::from(n));
//! });
//! ```
//!
//! Requires the `slint` feature to be enabled.

use std::time::Duration;

use slint::{Color, Model, SharedString, VecModel};

use crate::node::{Node, NodeStatus};
use crate::selection::SelectionManager;
use crate::tracking::FrameScheduler;

/// Flushes coalesced pointer moves on the Slint event loop.
#[derive(Debug, Clone, Copy)]
pub struct SlintFrameScheduler {
    /// Delay before the flush; one frame at 60 Hz by default.
    pub frame_interval: Duration,
}

impl Default for SlintFrameScheduler {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl FrameScheduler for SlintFrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        slint::Timer::single_shot(self.frame_interval, callback);
    }
}

impl SelectionManager {
    /// Sync the selection into a Slint model of node ids, sorted.
    pub fn sync_to_model(&self, model: &VecModel<SharedString>) {
        let ids: Vec<SharedString> = self
            .to_sorted_vec()
            .iter()
            .map(|id| SharedString::from(id.as_str()))
            .collect();
        model.set_vec(ids);
    }

    /// Replace the selection with the ids held in a Slint model.
    pub fn sync_from_model(&mut self, model: &dyn Model<Data = SharedString>) {
        let ids = (0..model.row_count())
            .filter_map(|i| model.row_data(i))
            .map(|s| crate::node::NodeId::from_string(s.as_str()));
        self.replace_selection(ids);
    }
}

/// Mirror `nodes` into a Slint model, converting each with `constructor`.
///
/// Rows are updated in place when the node count is unchanged so Slint only
/// re-renders what changed; otherwise the model is rebuilt.
pub fn sync_nodes_to_model<T, F>(nodes: &[Node], model: &VecModel<T>, constructor: F)
where
    T: Clone + PartialEq + 'static,
    F: Fn(&Node) -> T,
{
    if model.row_count() != nodes.len() {
        model.set_vec(nodes.iter().map(&constructor).collect::<Vec<T>>());
        return;
    }
    for (i, node) in nodes.iter().enumerate() {
        let row = constructor(node);
        if model.row_data(i).as_ref() != Some(&row) {
            model.set_row_data(i, row);
        }
    }
}

/// Accent colour for a node's status badge.
pub fn status_color(status: NodeStatus) -> Color {
    match status {
        NodeStatus::Idle => Color::from_rgb_u8(148, 163, 184),
        NodeStatus::Working => Color::from_rgb_u8(59, 130, 246),
        NodeStatus::Success => Color::from_rgb_u8(34, 197, 94),
        NodeStatus::Error => Color::from_rgb_u8(239, 68, 68),
    }
}
