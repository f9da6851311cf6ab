//! Headless test harness.
//!
//! Wraps a [`CanvasController`] driven by a [`ManualScheduler`], so tests
//! decide exactly when a frame is flushed, and provides helpers for
//! simulating pointer gestures in screen coordinates.

#![allow(dead_code)]

use super::OutcomeLog;
use workflow_canvas::{
    node_bounds, Bounds, CanvasConfig, CanvasController, GestureOutcome, Group, GroupId,
    ManualScheduler, Modifiers, Node, NodeId, NodeType, PointerEvent, Viewport, WheelEvent,
};

pub struct CanvasHarness {
    pub ctrl: CanvasController,
    pub frames: ManualScheduler,
    pub log: OutcomeLog,
}

impl CanvasHarness {
    /// Empty canvas with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        let frames = ManualScheduler::new();
        let ctrl = CanvasController::new(config, frames.clone());
        Self {
            ctrl,
            frames,
            log: OutcomeLog::new(),
        }
    }

    /// Canvas with an image generator at (0, 0) and a video generator at
    /// (1000, 0).
    pub fn with_pipeline() -> (Self, NodeId, NodeId) {
        let h = Self::new();
        let image = h.add(NodeType::ImageGenerator, 0.0, 0.0);
        let video = h.add(NodeType::VideoGenerator, 1000.0, 0.0);
        (h, image, video)
    }

    pub fn add(&self, kind: NodeType, x: f32, y: f32) -> NodeId {
        self.ctrl.add_node(Node::new(kind, x, y)).unwrap()
    }

    /// Insert a group directly, bypassing the marquee.
    pub fn add_group(&self, x: f32, y: f32, w: f32, h: f32) -> GroupId {
        self.ctrl.add_group(Group::new("测试分组", x, y, w, h))
    }

    pub fn set_zoom(&self, scale: f32) {
        self.ctrl.set_viewport(Viewport {
            scale,
            ..self.ctrl.viewport()
        });
    }

    // === Queries ===

    pub fn position(&self, id: &NodeId) -> (f32, f32) {
        let store = self.ctrl.store();
        let node = store.node(id).expect("node exists");
        (node.x, node.y)
    }

    pub fn bounds(&self, id: &NodeId) -> Bounds {
        node_bounds(self.ctrl.store().node(id).expect("node exists"))
    }

    /// Screen position of a canvas point under the current viewport.
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        self.ctrl.viewport().world_to_screen(x, y)
    }

    /// Screen position of a node's centre.
    pub fn node_center(&self, id: &NodeId) -> (f32, f32) {
        let (cx, cy) = self.bounds(id).center();
        self.to_screen(cx, cy)
    }

    /// Screen position of a node's output port.
    pub fn output_port(&self, id: &NodeId) -> (f32, f32) {
        let b = self.bounds(id);
        self.to_screen(b.r, b.y + b.height / 2.0)
    }

    /// Screen position of a node's input port.
    pub fn input_port(&self, id: &NodeId) -> (f32, f32) {
        let b = self.bounds(id);
        self.to_screen(b.x, b.y + b.height / 2.0)
    }

    // === Pointer simulation ===

    pub fn mouse_down(&self, x: f32, y: f32) {
        self.ctrl.pointer_down(PointerEvent::primary(x, y));
    }

    pub fn mouse_down_with(&self, x: f32, y: f32, modifiers: Modifiers) {
        self.ctrl
            .pointer_down(PointerEvent::primary(x, y).with_modifiers(modifiers));
    }

    pub fn mouse_move(&self, x: f32, y: f32) {
        self.ctrl.pointer_move(PointerEvent::primary(x, y));
    }

    pub fn mouse_up(&self, x: f32, y: f32) -> GestureOutcome {
        let outcome = self.ctrl.pointer_up(PointerEvent::primary(x, y));
        self.log.record(outcome.clone());
        outcome
    }

    /// Flush coalesced pointer moves.
    pub fn pump_frame(&self) {
        self.frames.run_pending();
    }

    /// Press, move in `steps` frames, release.
    pub fn drag(&self, from: (f32, f32), to: (f32, f32), steps: usize) -> GestureOutcome {
        self.mouse_down(from.0, from.1);
        let steps = steps.max(1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.mouse_move(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
            self.pump_frame();
        }
        self.mouse_up(to.0, to.1)
    }

    pub fn click(&self, x: f32, y: f32) -> GestureOutcome {
        self.mouse_down(x, y);
        self.mouse_up(x, y)
    }

    pub fn shift_click(&self, x: f32, y: f32) -> GestureOutcome {
        self.mouse_down_with(x, y, Modifiers::shift());
        self.mouse_up(x, y)
    }

    pub fn zoom_wheel(&self, x: f32, y: f32, delta_y: f32) {
        self.ctrl.wheel(WheelEvent {
            x,
            y,
            delta_x: 0.0,
            delta_y,
            modifiers: Modifiers::control(),
        });
    }
}
