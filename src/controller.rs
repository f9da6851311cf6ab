//! Canvas interaction controller.
//!
//! [`CanvasController`] turns raw pointer and wheel events into graph
//! mutations: node drag with magnetic snapping and a collision nudge on
//! release, node resize, marquee selection with automatic grouping, group
//! drag, connection drag and pan/zoom. Only one gesture is active at a time.
//!
//! Pointer moves are coalesced to one update per frame through a
//! [`FrameScheduler`]; pointer-up always applies the release position
//! directly, so a pending frame can never land after the commit.
//!
//! # Example
//!
//! ```
//! use workflow_canvas::{
//!     CanvasConfig, CanvasController, GestureOutcome, ManualScheduler, Node, NodeType,
//!     PointerEvent,
//! };
//!
//! let frames = ManualScheduler::new();
//! let ctrl = CanvasController::new(CanvasConfig::default(), frames.clone());
//! let image = ctrl.add_node(Node::new(NodeType::ImageGenerator, 0.0, 0.0))?;
//! let video = ctrl.add_node(Node::new(NodeType::VideoGenerator, 1000.0, 0.0))?;
//!
//! // Drag from the image generator's output port to the video generator.
//! ctrl.pointer_down(PointerEvent::primary(420.0, 160.0));
//! ctrl.pointer_move(PointerEvent::primary(700.0, 160.0));
//! frames.run_pending();
//! let outcome = ctrl.pointer_up(PointerEvent::primary(1100.0, 100.0));
//!
//! assert_eq!(outcome, GestureOutcome::Connected { from: image, to: video.clone() });
//! assert_eq!(ctrl.store().node(&video).unwrap().inputs().len(), 1);
//! # Ok::<(), workflow_canvas::CanvasError>(())
//! ```

use crate::config::CanvasConfig;
use crate::error::CanvasError;
use crate::graph::ValidationError;
use crate::hit_test::{
    group_bounds, group_containing, hit_test, members_of, node_bounds, nodes_in_selection_box,
    output_port, union_bounds, Bounds, HitTarget, HitTolerance,
};
use crate::history::HistoryManager;
use crate::node::{GraphSnapshot, Group, GroupId, Node, NodeId};
use crate::selection::SelectionManager;
use crate::snap::{resolve_collision, snap_position};
use crate::state::{Expansion, GraphStore, NodeUpdate};
use crate::tracking::{FrameScheduler, ImmediateScheduler, MoveCoalescer};
use crate::viewport::Viewport;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

/// Title given to groups created by marquee selection.
const AUTO_GROUP_TITLE: &str = "新建分组";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn control() -> Self {
        Self {
            control: true,
            ..Self::NONE
        }
    }

    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.control || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn primary(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn middle(x: f32, y: f32) -> Self {
        Self {
            button: PointerButton::Middle,
            ..Self::primary(x, y)
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Both coordinates are usable; other events are dropped.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Wheel event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub x: f32,
    pub y: f32,
    pub delta_x: f32,
    pub delta_y: f32,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.delta_x, self.delta_y]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Which gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    NodeDrag,
    NodeResize,
    Marquee,
    GroupDrag,
    ConnectionDrag,
    Pan,
}

/// What a finished gesture did, for the UI to surface.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// No gesture was active, or it ended without effect.
    None,
    /// A node was clicked but not moved.
    NodeSelected(NodeId),
    NodeMoved(NodeId),
    NodeResized(NodeId),
    GroupMoved(GroupId),
    /// Marquee finished; `count` nodes are now selected.
    Selected { count: usize },
    /// Marquee finished and wrapped ungrouped nodes in a new group.
    GroupCreated { group: GroupId, count: usize },
    Connected { from: NodeId, to: NodeId },
    /// The rule engine refused the edge; show the message, nothing changed.
    ConnectionRejected(ValidationError),
    /// Connection drag released away from any target.
    ConnectionCancelled,
    Panned,
}

#[derive(Debug, Clone)]
struct NodeDrag {
    id: NodeId,
    start: (f32, f32),
    pointer_start: (f32, f32),
    size: (f32, f32),
    group: Option<GroupId>,
    siblings: Vec<NodeId>,
    /// Set once the pointer has left `pointer_start`.
    moved: bool,
}

#[derive(Debug, Clone)]
enum Gesture {
    Idle,
    NodeDrag(NodeDrag),
    NodeResize {
        id: NodeId,
        start_size: (f32, f32),
        pointer_start: (f32, f32),
        group: Option<GroupId>,
    },
    Marquee {
        anchor: (f32, f32),
        current: (f32, f32),
    },
    GroupDrag {
        id: GroupId,
        start: (f32, f32),
        pointer_start: (f32, f32),
        children: Vec<(NodeId, f32, f32)>,
    },
    ConnectionDrag {
        from: NodeId,
        pointer: (f32, f32),
    },
    Pan {
        last: (f32, f32),
    },
}

impl Gesture {
    fn kind(&self) -> Option<GestureKind> {
        match self {
            Gesture::Idle => None,
            Gesture::NodeDrag(_) => Some(GestureKind::NodeDrag),
            Gesture::NodeResize { .. } => Some(GestureKind::NodeResize),
            Gesture::Marquee { .. } => Some(GestureKind::Marquee),
            Gesture::GroupDrag { .. } => Some(GestureKind::GroupDrag),
            Gesture::ConnectionDrag { .. } => Some(GestureKind::ConnectionDrag),
            Gesture::Pan { .. } => Some(GestureKind::Pan),
        }
    }
}

/// Controller that owns the graph store, history, selection and viewport.
///
/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct CanvasController {
    store: Rc<RefCell<GraphStore>>,
    history: Rc<RefCell<HistoryManager>>,
    selection: Rc<RefCell<SelectionManager>>,
    viewport: Rc<RefCell<Viewport>>,
    gesture: Rc<RefCell<Gesture>>,
    config: Rc<CanvasConfig>,
    moves: MoveCoalescer<(f32, f32)>,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(CanvasConfig::default(), ImmediateScheduler)
    }
}

impl CanvasController {
    /// Controller over an empty graph.
    pub fn new<S: FrameScheduler + 'static>(config: CanvasConfig, scheduler: S) -> Self {
        Self::with_store(GraphStore::new(), config, scheduler)
    }

    /// Controller over an existing graph. The initial state is the first
    /// history entry.
    pub fn with_store<S: FrameScheduler + 'static>(
        store: GraphStore,
        config: CanvasConfig,
        scheduler: S,
    ) -> Self {
        let config = config.normalized();
        let ctrl = Self {
            store: Rc::new(RefCell::new(store)),
            history: Rc::new(RefCell::new(HistoryManager::new(config.history_capacity))),
            selection: Rc::new(RefCell::new(SelectionManager::new())),
            viewport: Rc::new(RefCell::new(Viewport::default())),
            gesture: Rc::new(RefCell::new(Gesture::Idle)),
            config: Rc::new(config),
            moves: MoveCoalescer::new(scheduler),
        };
        ctrl.checkpoint();
        ctrl
    }

    // === Accessors ===

    pub fn store(&self) -> Ref<'_, GraphStore> {
        self.store.borrow()
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.borrow()
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.borrow_mut() = viewport;
    }

    /// Selected node ids in sorted order.
    pub fn selection(&self) -> Vec<NodeId> {
        self.selection.borrow().to_sorted_vec()
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selection.borrow().contains(id)
    }

    pub fn active_gesture(&self) -> Option<GestureKind> {
        self.gesture.borrow().kind()
    }

    /// Source node and current endpoint (canvas coordinates) of the edge being
    /// dragged, for rendering.
    pub fn pending_connection(&self) -> Option<(NodeId, (f32, f32), (f32, f32))> {
        let gesture = self.gesture.borrow();
        let Gesture::ConnectionDrag { from, pointer } = &*gesture else {
            return None;
        };
        let start = output_port(self.store.borrow().node(from)?);
        Some((from.clone(), start, *pointer))
    }

    /// Marquee rectangle in canvas coordinates, for rendering.
    pub fn marquee_rect(&self) -> Option<Bounds> {
        match &*self.gesture.borrow() {
            Gesture::Marquee { anchor, current } => Some(self.world_rect(*anchor, *current)),
            _ => None,
        }
    }

    /// Group containing the node being dragged or resized, if any.
    pub fn active_group(&self) -> Option<GroupId> {
        match &*self.gesture.borrow() {
            Gesture::NodeDrag(drag) => drag.group.clone(),
            Gesture::NodeResize { group, .. } => group.clone(),
            Gesture::GroupDrag { id, .. } => Some(id.clone()),
            _ => None,
        }
    }

    /// Other nodes sharing the dragged node's group.
    pub fn drag_siblings(&self) -> Vec<NodeId> {
        match &*self.gesture.borrow() {
            Gesture::NodeDrag(drag) => drag.siblings.clone(),
            _ => Vec::new(),
        }
    }

    fn world_rect(&self, a: (f32, f32), b: (f32, f32)) -> Bounds {
        let vp = self.viewport.borrow();
        Bounds::from_corners(vp.screen_to_world(a.0, a.1), vp.screen_to_world(b.0, b.1))
    }

    fn tolerance(&self) -> HitTolerance {
        let vp = self.viewport.borrow();
        HitTolerance {
            port_radius: vp.screen_len_to_world(self.config.port_hit_radius),
            handle_size: vp.screen_len_to_world(self.config.resize_handle_size),
        }
    }

    // === History ===

    /// Record the current graph unless it equals the latest history entry.
    pub fn checkpoint(&self) -> bool {
        let snapshot = self.store.borrow().snapshot();
        self.history.borrow_mut().push_if_changed(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        let snapshot = self.store.borrow().snapshot();
        let history = self.history.borrow();
        history.can_undo() || history.current().is_some_and(|s| s != &snapshot)
    }

    pub fn can_redo(&self) -> bool {
        self.history.borrow().can_redo()
    }

    pub fn undo(&self) -> bool {
        self.reset_gesture();
        self.checkpoint();
        let snapshot = self.history.borrow_mut().undo().cloned();
        self.apply_snapshot(snapshot)
    }

    pub fn redo(&self) -> bool {
        self.reset_gesture();
        let snapshot = self.history.borrow_mut().redo().cloned();
        self.apply_snapshot(snapshot)
    }

    fn apply_snapshot(&self, snapshot: Option<GraphSnapshot>) -> bool {
        let Some(snapshot) = snapshot else {
            return false;
        };
        let mut store = self.store.borrow_mut();
        store.restore(snapshot);
        self.selection.borrow_mut().retain(|id| store.contains_node(id));
        true
    }

    fn reset_gesture(&self) {
        self.moves.discard();
        *self.gesture.borrow_mut() = Gesture::Idle;
    }

    // === Pointer input ===

    /// Start a gesture. Ignored while another gesture is active.
    pub fn pointer_down(&self, ev: PointerEvent) {
        if self.active_gesture().is_some() || !ev.is_finite() {
            return;
        }
        let screen = (ev.x, ev.y);
        let pan = ev.button == PointerButton::Middle
            || (ev.button == PointerButton::Primary && ev.modifiers.command());
        if pan {
            debug!("pan started");
            *self.gesture.borrow_mut() = Gesture::Pan { last: screen };
            return;
        }
        if ev.button != PointerButton::Primary {
            return;
        }

        let world = self.viewport.borrow().screen_to_world(ev.x, ev.y);
        let target = {
            let store = self.store.borrow();
            hit_test(world, store.nodes(), store.groups(), self.tolerance())
        };

        let gesture = match target {
            HitTarget::OutputPort(from) => {
                debug!(node = %from, "connection drag started");
                self.checkpoint();
                Gesture::ConnectionDrag { from, pointer: world }
            }
            HitTarget::InputPort(id) | HitTarget::Node(id) => {
                self.selection.borrow_mut().handle_interaction(&id, ev.modifiers.shift);
                match self.begin_node_drag(id, screen) {
                    Some(drag) => Gesture::NodeDrag(drag),
                    None => Gesture::Idle,
                }
            }
            HitTarget::ResizeHandle(id) => {
                self.selection.borrow_mut().handle_interaction(&id, false);
                let found = {
                    let store = self.store.borrow();
                    store.node(&id).map(|node| {
                        let b = node_bounds(node);
                        let group = group_containing(node, store.groups()).map(|g| g.id.clone());
                        ((b.width, b.height), group)
                    })
                };
                match found {
                    Some((start_size, group)) => {
                        self.checkpoint();
                        debug!(node = %id, "resize started");
                        Gesture::NodeResize {
                            id,
                            start_size,
                            pointer_start: screen,
                            group,
                        }
                    }
                    None => Gesture::Idle,
                }
            }
            HitTarget::Group(id) => {
                let found = {
                    let store = self.store.borrow();
                    store.group(&id).map(|group| {
                        let children: Vec<(NodeId, f32, f32)> = members_of(group, store.nodes())
                            .into_iter()
                            .map(|n| (n.id().clone(), n.x, n.y))
                            .collect();
                        ((group.x, group.y), children)
                    })
                };
                match found {
                    Some((start, children)) => {
                        self.checkpoint();
                        debug!(group = %id, children = children.len(), "group drag started");
                        Gesture::GroupDrag {
                            id,
                            start,
                            pointer_start: screen,
                            children,
                        }
                    }
                    None => Gesture::Idle,
                }
            }
            HitTarget::Canvas => {
                if ev.modifiers.any() {
                    Gesture::Idle
                } else {
                    self.selection.borrow_mut().clear();
                    Gesture::Marquee {
                        anchor: screen,
                        current: screen,
                    }
                }
            }
        };
        *self.gesture.borrow_mut() = gesture;
    }

    fn begin_node_drag(&self, id: NodeId, pointer_start: (f32, f32)) -> Option<NodeDrag> {
        let drag = {
            let store = self.store.borrow();
            let node = store.node(&id)?;
            let b = node_bounds(node);
            let group = group_containing(node, store.groups());
            let siblings = group
                .map(|g| {
                    members_of(g, store.nodes())
                        .into_iter()
                        .filter(|n| n.id() != &id)
                        .map(|n| n.id().clone())
                        .collect()
                })
                .unwrap_or_default();
            NodeDrag {
                id,
                start: (b.x, b.y),
                pointer_start,
                size: (b.width, b.height),
                group: group.map(|g| g.id.clone()),
                siblings,
                moved: false,
            }
        };
        self.checkpoint();
        debug!(node = %drag.id, group = ?drag.group, "node drag started");
        Some(drag)
    }

    /// Queue a pointer move; it is applied on the next frame together with
    /// any later moves in the same frame.
    pub fn pointer_move(&self, ev: PointerEvent) {
        if self.active_gesture().is_none() || !ev.is_finite() {
            return;
        }
        let this = self.clone();
        self.moves.submit((ev.x, ev.y), move |(x, y)| this.apply_pointer(x, y));
    }

    fn apply_pointer(&self, x: f32, y: f32) {
        let vp = *self.viewport.borrow();
        let scale = vp.effective_scale();
        let mut gesture = self.gesture.borrow_mut();
        match &mut *gesture {
            Gesture::Idle => {}
            Gesture::NodeDrag(drag) => {
                if !drag.moved && (x, y) == drag.pointer_start {
                    return;
                }
                drag.moved = true;
                let dx = (x - drag.pointer_start.0) / scale;
                let dy = (y - drag.pointer_start.1) / scale;
                let proposed = Bounds::new(drag.start.0 + dx, drag.start.1 + dy, drag.size.0, drag.size.1);
                let mut store = self.store.borrow_mut();
                let others: Vec<Bounds> = store
                    .nodes()
                    .iter()
                    .filter(|n| n.id() != &drag.id)
                    .map(node_bounds)
                    .collect();
                let snapped = snap_position(proposed, others, vp.screen_len_to_world(self.config.snap_threshold));
                let _ = store.move_node(&drag.id, snapped.x, snapped.y);
            }
            Gesture::NodeResize {
                id,
                start_size,
                pointer_start,
                ..
            } => {
                let w = (start_size.0 + (x - pointer_start.0) / scale).max(self.config.min_node_width);
                let h = (start_size.1 + (y - pointer_start.1) / scale).max(self.config.min_node_height);
                let _ = self.store.borrow_mut().resize_node(id, w, h);
            }
            Gesture::Marquee { current, .. } => {
                *current = (x, y);
            }
            Gesture::GroupDrag {
                id,
                start,
                pointer_start,
                children,
            } => {
                let dx = (x - pointer_start.0) / scale;
                let dy = (y - pointer_start.1) / scale;
                let mut store = self.store.borrow_mut();
                let _ = store.move_group(id, start.0 + dx, start.1 + dy);
                for (child, cx, cy) in children.iter() {
                    let _ = store.move_node(child, cx + dx, cy + dy);
                }
            }
            Gesture::ConnectionDrag { pointer, .. } => {
                *pointer = vp.screen_to_world(x, y);
            }
            Gesture::Pan { last } => {
                let (dx, dy) = (x - last.0, y - last.1);
                *last = (x, y);
                self.viewport.borrow_mut().pan_by(dx, dy);
            }
        }
    }

    /// Finish the active gesture at the release position.
    pub fn pointer_up(&self, ev: PointerEvent) -> GestureOutcome {
        if self.active_gesture().is_none() {
            return GestureOutcome::None;
        }
        self.moves.discard();
        if ev.is_finite() {
            self.apply_pointer(ev.x, ev.y);
        } else {
            warn!(x = ev.x, y = ev.y, "ignoring non-finite release position");
        }
        let gesture = std::mem::replace(&mut *self.gesture.borrow_mut(), Gesture::Idle);

        let outcome = match gesture {
            Gesture::Idle => GestureOutcome::None,
            Gesture::NodeDrag(drag) => self.finish_node_drag(drag),
            Gesture::NodeResize { id, .. } => GestureOutcome::NodeResized(id),
            Gesture::Marquee { anchor, current } => self.finish_marquee(anchor, current),
            Gesture::GroupDrag { id, start, .. } => {
                let moved = self.store.borrow().group(&id).map(|g| (g.x, g.y)) != Some(start);
                if moved {
                    GestureOutcome::GroupMoved(id)
                } else {
                    GestureOutcome::None
                }
            }
            Gesture::ConnectionDrag { from, pointer } => self.finish_connection(from, pointer),
            Gesture::Pan { .. } => GestureOutcome::Panned,
        };
        self.checkpoint();
        debug!(?outcome, "gesture finished");
        outcome
    }

    fn finish_node_drag(&self, drag: NodeDrag) -> GestureOutcome {
        if !drag.moved {
            return GestureOutcome::NodeSelected(drag.id);
        }
        let mut store = self.store.borrow_mut();
        let Some(node) = store.node(&drag.id) else {
            return GestureOutcome::None;
        };
        let moving = node_bounds(node);
        let others: Vec<Bounds> = store
            .nodes()
            .iter()
            .filter(|n| n.id() != &drag.id)
            .map(node_bounds)
            .collect();
        if let Some((x, y)) = resolve_collision(moving, others, self.config.collision_padding) {
            let _ = store.move_node(&drag.id, x, y);
        }
        let end = store.node(&drag.id).map(|n| (n.x, n.y));
        if end == Some(drag.start) {
            GestureOutcome::NodeSelected(drag.id)
        } else {
            GestureOutcome::NodeMoved(drag.id)
        }
    }

    fn finish_marquee(&self, anchor: (f32, f32), current: (f32, f32)) -> GestureOutcome {
        let rect = self.world_rect(anchor, current);
        let selected = nodes_in_selection_box(rect, self.store.borrow().nodes());
        let count = selected.len();
        self.selection.borrow_mut().replace_selection(selected.iter().cloned());

        let big_enough = (anchor.0 - current.0).abs() > self.config.marquee_min_size
            && (anchor.1 - current.1).abs() > self.config.marquee_min_size;
        if count == 0 || !big_enough {
            return GestureOutcome::Selected { count };
        }

        let area = {
            let store = self.store.borrow();
            let ungrouped = selected
                .iter()
                .filter_map(|id| store.node(id))
                .filter(|n| group_containing(n, store.groups()).is_none())
                .map(node_bounds);
            union_bounds(ungrouped)
        };
        let Some(area) = area else {
            return GestureOutcome::Selected { count };
        };
        let area = area.inflated(self.config.group_padding);
        self.checkpoint();
        let group = self.store.borrow_mut().add_group(Group::new(
            AUTO_GROUP_TITLE,
            area.x,
            area.y,
            area.width,
            area.height,
        ));
        GestureOutcome::GroupCreated { group, count }
    }

    fn finish_connection(&self, from: NodeId, pointer: (f32, f32)) -> GestureOutcome {
        let target = {
            let store = self.store.borrow();
            hit_test(pointer, store.nodes(), store.groups(), self.tolerance())
        };
        let to = match target {
            HitTarget::InputPort(id) | HitTarget::Node(id) | HitTarget::ResizeHandle(id) if id != from => id,
            _ => return GestureOutcome::ConnectionCancelled,
        };
        let result = self.store.borrow_mut().connect(&from, &to);
        match result {
            Ok(()) => GestureOutcome::Connected { from, to },
            Err(CanvasError::Rejected(err)) => GestureOutcome::ConnectionRejected(err),
            Err(err) => {
                warn!(error = %err, "connection drag ended on a missing node");
                GestureOutcome::ConnectionCancelled
            }
        }
    }

    /// Abort the active gesture, putting dragged or resized items back.
    pub fn cancel_gesture(&self) {
        self.moves.discard();
        let gesture = std::mem::replace(&mut *self.gesture.borrow_mut(), Gesture::Idle);
        let mut store = self.store.borrow_mut();
        match gesture {
            Gesture::NodeDrag(drag) => {
                let _ = store.move_node(&drag.id, drag.start.0, drag.start.1);
            }
            Gesture::NodeResize { id, start_size, .. } => {
                let _ = store.resize_node(&id, start_size.0, start_size.1);
            }
            Gesture::GroupDrag {
                id, start, children, ..
            } => {
                let _ = store.move_group(&id, start.0, start.1);
                for (child, x, y) in &children {
                    let _ = store.move_node(child, *x, *y);
                }
            }
            Gesture::Idle | Gesture::Marquee { .. } | Gesture::ConnectionDrag { .. } | Gesture::Pan { .. } => {}
        }
    }

    /// With Ctrl/Cmd the wheel zooms around the cursor; otherwise it pans.
    pub fn wheel(&self, ev: WheelEvent) {
        if !ev.is_finite() {
            return;
        }
        let mut vp = self.viewport.borrow_mut();
        if ev.modifiers.command() {
            let factor = (-ev.delta_y * self.config.zoom_sensitivity).exp();
            vp.zoom_at(ev.x, ev.y, factor, self.config.min_zoom, self.config.max_zoom);
        } else {
            vp.pan_by(-ev.delta_x, -ev.delta_y);
        }
    }

    // === Commands ===

    pub fn add_node(&self, node: Node) -> Result<NodeId, CanvasError> {
        self.checkpoint();
        let id = self.store.borrow_mut().add_node(node)?;
        self.checkpoint();
        Ok(id)
    }

    /// Delete every selected node. Returns how many were removed.
    pub fn delete_selected(&self) -> usize {
        let ids = self.selection();
        if ids.is_empty() {
            return 0;
        }
        self.checkpoint();
        let removed = self.store.borrow_mut().remove_nodes(&ids).len();
        self.selection.borrow_mut().clear();
        self.checkpoint();
        removed
    }

    pub fn add_group(&self, group: Group) -> GroupId {
        self.checkpoint();
        let id = self.store.borrow_mut().add_group(group);
        self.checkpoint();
        id
    }

    /// Delete a group; its nodes stay.
    pub fn delete_group(&self, id: &GroupId) -> Result<(), CanvasError> {
        self.checkpoint();
        self.store.borrow_mut().remove_group(id)?;
        self.checkpoint();
        Ok(())
    }

    pub fn connect(&self, from: &NodeId, to: &NodeId) -> Result<(), CanvasError> {
        self.checkpoint();
        self.store.borrow_mut().connect(from, to)?;
        self.checkpoint();
        Ok(())
    }

    pub fn expand_episode(&self, episode: &NodeId, shots: &[String]) -> Result<Expansion, CanvasError> {
        self.checkpoint();
        let expansion = self.store.borrow_mut().expand_episode(episode, shots)?;
        self.checkpoint();
        Ok(expansion)
    }

    /// Status/data write from the execution collaborator. Not an undo step of
    /// its own: when the graph is at the latest checkpoint, the write is
    /// folded into it.
    pub fn update_node(&self, id: &NodeId, update: NodeUpdate) -> Result<(), CanvasError> {
        let at_checkpoint = {
            let snapshot = self.store.borrow().snapshot();
            self.history.borrow().current() == Some(&snapshot)
        };
        self.store.borrow_mut().update_node(id, update)?;
        if at_checkpoint {
            let snapshot = self.store.borrow().snapshot();
            self.history.borrow_mut().replace_current(snapshot);
        }
        Ok(())
    }

    pub fn select_all(&self) {
        let ids: Vec<NodeId> = self.store.borrow().nodes().iter().map(|n| n.id().clone()).collect();
        self.selection.borrow_mut().replace_selection(ids);
    }

    pub fn clear_selection(&self) {
        self.selection.borrow_mut().clear();
    }

    /// Bounds of a group in canvas coordinates.
    pub fn group_rect(&self, id: &GroupId) -> Option<Bounds> {
        self.store.borrow().group(id).map(group_bounds)
    }
}
