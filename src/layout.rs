//! Automatic arrangement of the pipeline with the Sugiyama layered layout.
//!
//! Layers follow the connection direction, so upstream generators end up to
//! the left of the nodes they feed. Node sizes come from [`node_bounds`], the
//! same geometry the canvas uses for hit testing and snapping.
//!
//! The `rust-sugiyama` crate works in `f64`; [`arrange`] converts back to the
//! crate's `f32` canvas units so the result can go straight into
//! [`GraphStore::apply_positions`].
//!
//! Requires the `layout` feature to be enabled.

use std::collections::{HashMap, HashSet};

use crate::hit_test::{node_bounds, NodeGeometry};
use crate::node::NodeId;
use crate::state::GraphStore;

/// Direction in which layers advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Direction {
    /// Layers flow left to right (default): sources on the left.
    #[default]
    LeftToRight,
    TopToBottom,
}

/// A positioned node returned by [`arrange`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    pub id: NodeId,
    /// X coordinate of the node's top-left corner.
    pub x: f32,
    /// Y coordinate of the node's top-left corner.
    pub y: f32,
}

/// Tunables for [`arrange`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct ArrangeConfig {
    /// Minimum spacing between vertices; `0.0` keeps the `rust-sugiyama`
    /// default.
    pub vertex_spacing: f64,
    /// Minimum edge length in layers; `0` keeps the `rust-sugiyama` default.
    pub minimum_length: u32,
    pub dummy_vertices: bool,
    pub direction: Direction,
    /// Offset added to every position so the arrangement does not start at
    /// the canvas origin.
    pub origin: (f32, f32),
}

impl Default for ArrangeConfig {
    fn default() -> Self {
        Self {
            vertex_spacing: 60.0,
            minimum_length: 0,
            dummy_vertices: false,
            direction: Direction::LeftToRight,
            origin: (100.0, 100.0),
        }
    }
}

impl ArrangeConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_vertex_spacing(mut self, spacing: f64) -> Self {
        self.vertex_spacing = spacing;
        self
    }
}

/// Lay out every node of `store`, following its connections.
///
/// Positions are returned in the store's node order, which keeps the result
/// deterministic for callers that diff it against the current positions.
///
/// ```
/// use workflow_canvas::layout::{arrange, ArrangeConfig};
/// use workflow_canvas::{GraphStore, Node, NodeType};
///
/// let mut store = GraphStore::new();
/// let prompt = store.add_node(Node::new(NodeType::PromptInput, 500.0, 500.0)).unwrap();
/// let image = store.add_node(Node::new(NodeType::ImageGenerator, 0.0, 0.0)).unwrap();
/// store.connect(&prompt, &image).unwrap();
///
/// let positions = arrange(&store, &ArrangeConfig::default());
/// let x_of = |id| positions.iter().find(|p| &p.id == id).unwrap().x;
/// assert!(x_of(&prompt) < x_of(&image));
/// ```
pub fn arrange(store: &GraphStore, config: &ArrangeConfig) -> Vec<NodePosition> {
    let sizes: Vec<(NodeId, (f64, f64))> = store
        .nodes()
        .iter()
        .map(|node| {
            let b = node_bounds(node);
            (node.id().clone(), (b.width as f64, b.height as f64))
        })
        .collect();
    let edges: Vec<(NodeId, NodeId)> = store
        .connections()
        .iter()
        .map(|c| (c.from.clone(), c.to.clone()))
        .collect();

    let mut placed: HashMap<NodeId, (f64, f64)> = sugiyama_layout(&edges, &sizes, config)
        .into_iter()
        .collect();

    store
        .nodes()
        .iter()
        .filter_map(|node| {
            let (x, y) = placed.remove(node.id())?;
            Some(NodePosition {
                id: node.id().clone(),
                x: x as f32 + config.origin.0,
                y: y as f32 + config.origin.1,
            })
        })
        .collect()
}

/// Arrange any set of [`NodeGeometry`] items. Edges naming unknown ids and
/// self-edges are skipped, duplicate edges are collapsed.
pub fn arrange_geometry<N: NodeGeometry>(
    nodes: &[N],
    edges: &[(NodeId, NodeId)],
    config: &ArrangeConfig,
) -> Vec<NodePosition> {
    let sizes: Vec<(NodeId, (f64, f64))> = nodes
        .iter()
        .map(|n| {
            let b = n.bounds();
            (n.id().clone(), (b.width as f64, b.height as f64))
        })
        .collect();
    sugiyama_layout(edges, &sizes, config)
        .into_iter()
        .map(|(id, (x, y))| NodePosition {
            id,
            x: x as f32 + config.origin.0,
            y: y as f32 + config.origin.1,
        })
        .collect()
}

/// Core call into `rust-sugiyama`.
///
/// Ids are mapped to sequential `u32` indices and translated back. Duplicate
/// ids in `node_sizes` keep their first size.
fn sugiyama_layout(
    edges: &[(NodeId, NodeId)],
    node_sizes: &[(NodeId, (f64, f64))],
    config: &ArrangeConfig,
) -> Vec<(NodeId, (f64, f64))> {
    if node_sizes.is_empty() {
        return Vec::new();
    }

    let horizontal = config.direction == Direction::LeftToRight;

    let mut id_to_idx: HashMap<&NodeId, u32> = HashMap::new();
    let mut idx_to_id: Vec<&NodeId> = Vec::with_capacity(node_sizes.len());
    let mut vertices: Vec<(u32, (f64, f64))> = Vec::with_capacity(node_sizes.len());

    for (node_id, (w, h)) in node_sizes {
        if id_to_idx.contains_key(node_id) {
            continue;
        }
        let idx = idx_to_id.len() as u32;
        id_to_idx.insert(node_id, idx);
        idx_to_id.push(node_id);
        // The algorithm stacks layers vertically; swap axes for left-to-right.
        let size = if horizontal { (*h, *w) } else { (*w, *h) };
        vertices.push((idx, size));
    }

    let mapped_edges: Vec<(u32, u32)> = edges
        .iter()
        .filter_map(|(src, dst)| {
            let s = *id_to_idx.get(src)?;
            let d = *id_to_idx.get(dst)?;
            (s != d).then_some((s, d))
        })
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let mut sg_config = rust_sugiyama::configure::Config {
        dummy_vertices: config.dummy_vertices,
        ..Default::default()
    };
    if config.vertex_spacing > 0.0 {
        sg_config.vertex_spacing = config.vertex_spacing;
    }
    if config.minimum_length > 0 {
        sg_config.minimum_length = config.minimum_length;
    }

    let subgraphs = rust_sugiyama::from_vertices_and_edges(&vertices, &mapped_edges, &sg_config);

    // Disconnected components come back as separate subgraphs, each with its
    // own origin; stack them along the cross axis.
    let mut results = Vec::with_capacity(idx_to_id.len());
    let mut cross_offset = 0.0_f64;
    for (layout, width, _height) in &subgraphs {
        for &(idx, (x, y)) in layout {
            if let Some(&node_id) = idx_to_id.get(idx) {
                let (px, py) = if horizontal {
                    (y, x + cross_offset)
                } else {
                    (x + cross_offset, y)
                };
                results.push((node_id.clone(), (px, py)));
            }
        }
        cross_offset += width.max(0.0) + sg_config.vertex_spacing;
    }

    results
}
