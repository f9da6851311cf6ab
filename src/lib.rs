//! # Workflow Canvas
//!
//! Node-graph model and canvas interaction engine for AI content-generation
//! pipelines: prompts feed image generators, images feed video generators,
//! scripts fan out into storyboards, and so on.
//!
//! ## Features
//!
//! - **Typed Node Graph** - Twenty node types with typed payloads, directed
//!   connections and rectangular groups, owned by a single [`GraphStore`]
//! - **Connection Rules** - Per-type allowed inputs/outputs, input cardinality,
//!   duplicate and cycle rejection via composable [`ConnectionValidator`]s
//! - **Execution Gate** - [`can_execute_node`] tells the orchestrator whether a
//!   node has what it needs before a generation back-end is called
//! - **Canvas Gestures** - [`CanvasController`] drives drag with magnetic
//!   snapping, collision nudging, resize, marquee grouping, group drag,
//!   connection drag and cursor-anchored zoom
//! - **Undo/Redo** - Bounded snapshot history around every gesture
//! - **Headless** - No UI dependency; the optional `slint` feature adds model
//!   synchronisation and a timer-backed frame scheduler
//!
//! ## Quick Start
//!
//! ```
//! use workflow_canvas::{GraphStore, Node, NodeType};
//!
//! let mut store = GraphStore::new();
//! let prompt = store.add_node(Node::new(NodeType::PromptInput, 0.0, 0.0)).unwrap();
//! let image = store.add_node(Node::new(NodeType::ImageGenerator, 500.0, 0.0)).unwrap();
//!
//! store.connect(&prompt, &image).unwrap();
//! // The reverse edge would close a loop.
//! let err = store.connect(&image, &prompt).unwrap_err();
//! assert!(err.to_string().contains("循环依赖"));
//! ```
//!
//! ## Modules
//!
//! - [`node`] - Ids, node types, payloads, connections, groups, snapshots
//! - [`rules`] - Static per-type connection rule table
//! - [`graph`] - Connection validation and graph queries
//! - [`execution`] - Pre-flight execution gate
//! - [`hit_test`] - Node geometry, bounding boxes and hit testing
//! - [`snap`] - Magnetic snapping and collision resolution
//! - [`state`] - [`GraphStore`], the owner of the graph
//! - [`history`] - Snapshot undo/redo
//! - [`selection`] - Node selection set
//! - [`viewport`] - Zoom and pan
//! - [`tracking`] - Frame-coalesced pointer moves
//! - [`controller`] - The canvas gesture state machine
//! - `layout` - Automatic arrangement (feature `layout`)
//! - `slint_bridge` - Slint glue (feature `slint`)

pub mod config;
pub mod controller;
pub mod error;
pub mod execution;
pub mod graph;
pub mod history;
pub mod hit_test;
pub mod node;
pub mod rules;
pub mod selection;
pub mod snap;
pub mod state;
pub mod tracking;
pub mod viewport;

#[cfg(feature = "layout")]
pub mod layout;
#[cfg(feature = "slint")]
pub mod slint_bridge;

pub use config::CanvasConfig;
pub use controller::{
    CanvasController, GestureKind, GestureOutcome, Modifiers, PointerButton, PointerEvent,
    WheelEvent,
};
pub use error::CanvasError;
pub use execution::{can_execute_node, GateError, GateResult};
pub use graph::{
    is_acyclic, path_exists, validate_connection,
    // Connection validation framework
    CardinalityValidator, CompositeValidator, ConnectionValidator, NoCycleValidator,
    NoDuplicatesValidator, NoSelfLoopValidator, TypeCompatibilityValidator, ValidationError,
    ValidationResult,
};
pub use history::HistoryManager;
pub use hit_test::{
    approx_node_height, group_containing, hit_test, members_of, node_bounds,
    nodes_in_selection_box, Bounds, HitTarget, HitTolerance, NodeGeometry, DEFAULT_NODE_WIDTH,
    FALLBACK_POSITION,
};
pub use node::{
    AnalysisData, CharacterData, Connection, DramaData, EpisodeData, GenerationData,
    GraphSnapshot, Group, GroupId, ImageEditData, Node, NodeData, NodeId, NodeStatus, NodeType,
    PromptData, ScriptPlanData, SplitterData, StoryboardData, StyleData, VideoEditData,
};
pub use rules::{rule_for, NodeRule};
pub use selection::SelectionManager;
pub use snap::{resolve_collision, snap_position, SnapOutcome};
pub use state::{Expansion, GraphStore, NodeUpdate};
pub use tracking::{FrameScheduler, ImmediateScheduler, ManualScheduler, MoveCoalescer};
pub use viewport::Viewport;

#[cfg(feature = "slint")]
pub use slint_bridge::{status_color, sync_nodes_to_model, SlintFrameScheduler};
