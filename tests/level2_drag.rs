//! Level 2: Node Click & Drag Tests
//!
//! Tests selection via click, dragging with magnetic snapping, the collision
//! nudge on release and per-frame move coalescing.

mod common;

use common::harness::CanvasHarness;
use workflow_canvas::{GestureKind, GestureOutcome, NodeType};

#[test]
fn test_click_on_node_selects_it() {
    let h = CanvasHarness::new();
    let a = h.add(NodeType::PromptInput, 0.0, 0.0);
    let (cx, cy) = h.node_center(&a);

    assert_eq!(h.click(cx, cy), GestureOutcome::NodeSelected(a.clone()));
    assert_eq!(h.ctrl.selection(), vec![a]);
}

#[test]
fn test_click_replaces_and_shift_click_extends() {
    let h = CanvasHarness::new();
    let a = h.add(NodeType::PromptInput, 0.0, 0.0);
    let b = h.add(NodeType::PromptInput, 600.0, 0.0);

    let (ax, ay) = h.node_center(&a);
    let (bx, by) = h.node_center(&b);
    h.click(ax, ay);
    h.click(bx, by);
    assert_eq!(h.ctrl.selection(), vec![b.clone()]);

    h.shift_click(ax, ay);
    assert!(h.ctrl.is_selected(&a) && h.ctrl.is_selected(&b));

    h.shift_click(bx, by);
    assert_eq!(h.ctrl.selection(), vec![a]);
}

#[test]
fn test_click_on_empty_canvas_clears_selection() {
    let h = CanvasHarness::new();
    let a = h.add(NodeType::PromptInput, 0.0, 0.0);
    let (ax, ay) = h.node_center(&a);
    h.click(ax, ay);

    h.click(2000.0, 2000.0);
    assert!(h.ctrl.selection().is_empty());
}

#[test]
fn test_drag_moves_node_by_pointer_delta() {
    let h = CanvasHarness::new();
    let a = h.add(NodeType::PromptInput, 0.0, 0.0);

    let outcome = h.drag((100.0, 100.0), (250.0, 1100.0), 4);
    assert_eq!(outcome, GestureOutcome::NodeMoved(a.clone()));
    assert_eq!(h.position(&a), (150.0, 1000.0));
}

#[test]
fn test_drag_delta_is_divided_by_zoom() {
    let h = CanvasHarness::new();
    let a = h.add(NodeType::PromptInput, 0.0, 0.0);
    h.set_zoom(0.5);

    // 100 screen px at half zoom is 200 canvas units
    h.drag((50.0, 50.0), (150.0, 250.0), 1);
    assert_eq!(h.position(&a), (200.0, 400.0));
}

#[test]
fn test_left_edge_snaps_exactly_to_right_edge() {
    let h = CanvasHarness::new();
    let _fixed = h.add(NodeType::PromptInput, 0.0, 0.0);
    let moving = h.add(NodeType::PromptInput, 1000.0, 600.0);

    // Proposed left edge 425 is 5 units from the fixed node's right edge (420)
    h.drag((1100.0, 700.0), (525.0, 700.0), 3);
    assert_eq!(h.position(&moving), (420.0, 600.0));
}

#[test]
fn test_snap_threshold_is_zoom_invariant() {
    let h = CanvasHarness::new();
    let _fixed = h.add(NodeType::PromptInput, 0.0, 0.0);
    let moving = h.add(NodeType::PromptInput, 1000.0, 600.0);
    h.set_zoom(2.0);

    // 5 canvas units is 10 screen px at 2x zoom, outside the 8 px threshold
    h.drag((2200.0, 1400.0), (1050.0, 1400.0), 1);
    assert_eq!(h.position(&moving), (425.0, 600.0));

    // 3 canvas units is 6 screen px, inside it
    h.drag((1050.0, 1400.0), (1046.0, 1400.0), 1);
    assert_eq!(h.position(&moving), (420.0, 600.0));
}

#[test]
fn test_release_on_top_of_node_pushes_out_by_shallowest_depth() {
    let h = CanvasHarness::new();
    let fixed = h.add(NodeType::PromptInput, 0.0, 0.0);
    let moving = h.add(NodeType::PromptInput, 1000.0, 0.0);

    // Lands at x = 300: overlaps the fixed node by 120 on the right side
    h.drag((1100.0, 100.0), (400.0, 100.0), 2);

    let padding = h.ctrl.config().collision_padding;
    assert_eq!(h.position(&moving), (300.0 + 120.0 + padding, 0.0));
    assert!(!h.bounds(&moving).overlaps(&h.bounds(&fixed)));
}

#[test]
fn test_moves_are_coalesced_per_frame() {
    let h = CanvasHarness::new();
    let a = h.add(NodeType::PromptInput, 0.0, 0.0);

    h.mouse_down(100.0, 100.0);
    assert_eq!(h.ctrl.active_gesture(), Some(GestureKind::NodeDrag));
    for step in 1..=10 {
        h.mouse_move(100.0 + step as f32 * 100.0, 100.0 + step as f32 * 70.0);
    }
    // Nothing moves until the frame runs, and only one flush is queued
    assert_eq!(h.position(&a), (0.0, 0.0));
    assert_eq!(h.frames.pending(), 1);

    h.pump_frame();
    assert_eq!(h.position(&a), (1000.0, 700.0));
    h.mouse_up(1100.0, 800.0);
}

#[test]
fn test_release_wins_over_pending_frame() {
    let h = CanvasHarness::new();
    let a = h.add(NodeType::PromptInput, 0.0, 0.0);

    h.mouse_down(100.0, 100.0);
    h.mouse_move(900.0, 900.0);
    h.mouse_up(600.0, 400.0);
    assert_eq!(h.position(&a), (500.0, 300.0));

    // The stale frame finds nothing to apply
    h.pump_frame();
    assert_eq!(h.position(&a), (500.0, 300.0));
    assert_eq!(h.ctrl.active_gesture(), None);
}

#[test]
fn test_resize_is_clamped_to_minimum() {
    let h = CanvasHarness::new();
    let a = h.add(NodeType::PromptInput, 0.0, 0.0);
    // Bottom-right resize handle of a 420x240 node
    let outcome = h.drag((410.0, 230.0), (500.0, 300.0), 2);
    assert_eq!(outcome, GestureOutcome::NodeResized(a.clone()));
    let b = h.bounds(&a);
    assert_eq!((b.width, b.height), (510.0, 310.0));

    h.drag((500.0, 290.0), (0.0, 0.0), 2);
    let b = h.bounds(&a);
    let config = h.ctrl.config();
    assert_eq!((b.width, b.height), (config.min_node_width, config.min_node_height));
}

#[test]
fn test_click_beside_aligned_neighbour_leaves_it_in_place() {
    let h = CanvasHarness::new();
    h.add(NodeType::PromptInput, 0.0, 0.0);
    // Left edge 5 units from the first node's right edge
    let b = h.add(NodeType::PromptInput, 425.0, 500.0);

    assert_eq!(h.click(600.0, 600.0), GestureOutcome::NodeSelected(b.clone()));
    assert_eq!(h.position(&b), (425.0, 500.0));

    // Nothing to undo but the two adds
    assert!(h.ctrl.undo());
    assert!(h.ctrl.store().node(&b).is_none());
}

#[test]
fn test_non_finite_release_keeps_graph_loadable() {
    let h = CanvasHarness::new();
    let a = h.add(NodeType::PromptInput, 0.0, 0.0);

    h.mouse_down(200.0, 100.0);
    assert_eq!(h.mouse_up(f32::NAN, 100.0), GestureOutcome::NodeSelected(a.clone()));
    assert_eq!(h.position(&a), (0.0, 0.0));

    h.mouse_down(200.0, 100.0);
    h.mouse_move(300.0, 100.0);
    h.pump_frame();
    h.mouse_move(f32::INFINITY, f32::NAN);
    h.pump_frame();
    assert_eq!(h.mouse_up(f32::NAN, 100.0), GestureOutcome::NodeMoved(a.clone()));
    assert_eq!(h.position(&a), (100.0, 0.0));

    let store = h.ctrl.store();
    let json = store.to_json().unwrap();
    let loaded = workflow_canvas::GraphStore::from_json(&json).unwrap();
    assert_eq!(loaded.snapshot(), store.snapshot());
}
