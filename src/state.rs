//! The single owner of the live graph.
//!
//! [`GraphStore`] holds `(nodes, connections, groups)` and is the only code
//! that writes a node's `inputs`. Every method that commits or removes a
//! connection updates both sides before returning, so no caller can observe
//! the two out of sync.

use crate::error::CanvasError;
use crate::graph::{is_acyclic, validate_connection, ValidationResult};
use crate::hit_test::{members_of, node_bounds, sanitize_position, union_bounds};
use crate::node::{
    Connection, GraphSnapshot, Group, GroupId, Node, NodeData, NodeId, NodeStatus, NodeType,
    PromptData,
};
use crate::rules::rule_for;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Horizontal gap between an episode node and the prompts it expands into.
const EXPANSION_GAP: f32 = 160.0;
/// Vertical gap between expanded prompt nodes.
const EXPANSION_ROW_GAP: f32 = 40.0;
/// Padding of the group wrapping an expansion.
const EXPANSION_GROUP_PADDING: f32 = 40.0;

/// Partial update applied by the execution collaborator.
///
/// Fields left `None` are untouched. The update is all-or-nothing: a payload
/// of the wrong kind rejects the whole update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub status: Option<NodeStatus>,
    pub data: Option<NodeData>,
    pub title: Option<String>,
}

impl NodeUpdate {
    pub fn status(status: NodeStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn data(data: NodeData) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }
}

/// Nodes and group created by [`GraphStore::expand_episode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub prompts: Vec<NodeId>,
    pub group: GroupId,
}

/// Owns the workflow graph and every mutation of it.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    groups: Vec<Group>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a persisted graph. Node `inputs` are rebuilt from the connection
    /// list, then every structural invariant is checked.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, CanvasError> {
        let mut store = Self::default();
        store.restore(snapshot);
        store.verify_invariants()?;
        Ok(store)
    }

    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    pub fn to_json(&self) -> Result<String, CanvasError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    // === Read access ===

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node, CanvasError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id() == id)
            .ok_or_else(|| CanvasError::UnknownNode(id.clone()))
    }

    fn group_mut(&mut self, id: &GroupId) -> Result<&mut Group, CanvasError> {
        self.groups
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| CanvasError::UnknownGroup(id.clone()))
    }

    /// Nodes currently inside `group`.
    pub fn members_of(&self, group: &GroupId) -> Result<Vec<&Node>, CanvasError> {
        let group = self
            .group(group)
            .ok_or_else(|| CanvasError::UnknownGroup(group.clone()))?;
        Ok(members_of(group, &self.nodes))
    }

    /// Input nodes of `id`, in connection order.
    pub fn upstream_of(&self, id: &NodeId) -> Result<Vec<&Node>, CanvasError> {
        let node = self
            .node(id)
            .ok_or_else(|| CanvasError::UnknownNode(id.clone()))?;
        Ok(node.inputs().iter().filter_map(|i| self.node(i)).collect())
    }

    // === Nodes ===

    /// Insert a node and return its id. Any `inputs` it carries are dropped;
    /// edges only come from [`connect`](Self::connect). Non-finite geometry
    /// is replaced by the defaults.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId, CanvasError> {
        if self.contains_node(node.id()) {
            warn!(node = %node.id(), "refusing node with a duplicate id");
            return Err(CanvasError::DuplicateNode(node.id().clone()));
        }
        node.inputs_mut().clear();
        (node.x, node.y) = finite_position(node.id(), node.x, node.y);
        node.width = finite_size(node.id(), node.width);
        node.height = finite_size(node.id(), node.height);
        let id = node.id().clone();
        debug!(node = %id, kind = ?node.node_type(), "node added");
        self.nodes.push(node);
        Ok(id)
    }

    /// Remove a node, every connection touching it, and its id from other
    /// nodes' inputs.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node, CanvasError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id() == id)
            .ok_or_else(|| CanvasError::UnknownNode(id.clone()))?;
        let node = self.nodes.remove(index);
        if node.status == NodeStatus::Working {
            warn!(node = %id, "deleting a node that is still generating");
        }
        self.connections.retain(|c| !c.touches(id));
        for other in &mut self.nodes {
            other.inputs_mut().retain(|i| i != id);
        }
        debug!(node = %id, "node removed");
        Ok(node)
    }

    /// Remove several nodes; unknown ids are skipped.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Vec<Node> {
        ids.iter().filter_map(|id| self.remove_node(id).ok()).collect()
    }

    /// Move a node. A non-finite position becomes
    /// [`FALLBACK_POSITION`](crate::FALLBACK_POSITION).
    pub fn move_node(&mut self, id: &NodeId, x: f32, y: f32) -> Result<(), CanvasError> {
        let node = self.node_mut(id)?;
        (node.x, node.y) = finite_position(id, x, y);
        Ok(())
    }

    /// Resize a node. A non-finite or non-positive side reverts to its
    /// default.
    pub fn resize_node(&mut self, id: &NodeId, width: f32, height: f32) -> Result<(), CanvasError> {
        let node = self.node_mut(id)?;
        node.width = finite_size(id, Some(width));
        node.height = finite_size(id, Some(height));
        Ok(())
    }

    /// Move many nodes at once; unknown ids are skipped.
    pub fn apply_positions(&mut self, positions: &[(NodeId, f32, f32)]) {
        for (id, x, y) in positions {
            if let Ok(node) = self.node_mut(id) {
                (node.x, node.y) = finite_position(id, *x, *y);
            }
        }
    }

    /// Apply a [`NodeUpdate`].
    pub fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> Result<(), CanvasError> {
        let node = self.node_mut(id)?;
        if let Some(data) = update.data {
            node.set_data(data)?;
        }
        if let Some(status) = update.status {
            node.status = status;
        }
        if let Some(title) = update.title {
            node.title = title;
        }
        Ok(())
    }

    pub fn set_node_status(&mut self, id: &NodeId, status: NodeStatus) -> Result<(), CanvasError> {
        self.node_mut(id)?.status = status;
        Ok(())
    }

    pub fn set_node_title(&mut self, id: &NodeId, title: impl Into<String>) -> Result<(), CanvasError> {
        self.node_mut(id)?.title = title.into();
        Ok(())
    }

    // === Connections ===

    /// Run the rule engine on a prospective edge between two stored nodes.
    pub fn validate(&self, from: &NodeId, to: &NodeId) -> Result<ValidationResult, CanvasError> {
        let from_node = self
            .node(from)
            .ok_or_else(|| CanvasError::UnknownNode(from.clone()))?;
        let to_node = self
            .node(to)
            .ok_or_else(|| CanvasError::UnknownNode(to.clone()))?;
        Ok(validate_connection(from_node, to_node, &self.connections))
    }

    /// Validate and commit `from -> to`. A rejected edge leaves the graph
    /// unchanged.
    pub fn connect(&mut self, from: &NodeId, to: &NodeId) -> Result<(), CanvasError> {
        if let ValidationResult::Invalid(err) = self.validate(from, to)? {
            warn!(%from, %to, error = %err, "connection rejected");
            return Err(err.into());
        }
        self.connections.push(Connection::new(from.clone(), to.clone()));
        self.node_mut(to)?.inputs_mut().push(from.clone());
        debug!(%from, %to, "connection committed");
        Ok(())
    }

    /// Remove `from -> to`. Returns whether it existed.
    pub fn disconnect(&mut self, from: &NodeId, to: &NodeId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| !(&c.from == from && &c.to == to));
        if self.connections.len() == before {
            return false;
        }
        if let Ok(node) = self.node_mut(to) {
            node.inputs_mut().retain(|i| i != from);
        }
        debug!(%from, %to, "connection removed");
        true
    }

    // === Groups ===

    pub fn add_group(&mut self, group: Group) -> GroupId {
        let id = group.id.clone();
        info!(group = %id, title = %group.title, "group created");
        self.groups.push(group);
        id
    }

    /// Remove a group. Its member nodes stay where they are.
    pub fn remove_group(&mut self, id: &GroupId) -> Result<Group, CanvasError> {
        let index = self
            .groups
            .iter()
            .position(|g| &g.id == id)
            .ok_or_else(|| CanvasError::UnknownGroup(id.clone()))?;
        Ok(self.groups.remove(index))
    }

    pub fn rename_group(&mut self, id: &GroupId, title: impl Into<String>) -> Result<(), CanvasError> {
        self.group_mut(id)?.title = title.into();
        Ok(())
    }

    pub fn move_group(&mut self, id: &GroupId, x: f32, y: f32) -> Result<(), CanvasError> {
        let group = self.group_mut(id)?;
        let (gx, gy) = sanitize_position(x, y);
        if (gx, gy) != (x, y) {
            warn!(group = %id, "non-finite group position, using fallback");
        }
        group.x = gx;
        group.y = gy;
        Ok(())
    }

    // === Programmatic expansion ===

    /// Fan a script episode out into one prompt node per shot.
    ///
    /// The prompts are stacked in a column to the right of the episode, each
    /// connected from it, and wrapped in a new group. Either the whole
    /// fan-out is committed or the graph is left untouched.
    pub fn expand_episode(&mut self, episode: &NodeId, shots: &[String]) -> Result<Expansion, CanvasError> {
        self.all_or_nothing(|store| store.fan_out_episode(episode, shots))
    }

    fn fan_out_episode(&mut self, episode: &NodeId, shots: &[String]) -> Result<Expansion, CanvasError> {
        let source = self
            .node(episode)
            .ok_or_else(|| CanvasError::UnknownNode(episode.clone()))?;
        if source.node_type() != NodeType::ScriptEpisode {
            return Err(CanvasError::WrongNodeType {
                expected: NodeType::ScriptEpisode,
                found: source.node_type(),
            });
        }
        if shots.is_empty() {
            return Err(CanvasError::NothingToExpand);
        }

        let anchor = node_bounds(source);
        let group_title = format!("{} · 分镜", source.title);
        let column_x = anchor.r + EXPANSION_GAP;

        let mut prompts = Vec::with_capacity(shots.len());
        let mut y = anchor.y;
        for (i, shot) in shots.iter().enumerate() {
            let mut node = Node::new(NodeType::PromptInput, column_x, y).with_data(
                NodeData::PromptInput(PromptData {
                    prompt: shot.clone(),
                }),
            );
            node.title = format!("{} {}", NodeType::PromptInput.display_name(), i + 1);
            y += node_bounds(&node).height + EXPANSION_ROW_GAP;
            prompts.push(self.add_node(node)?);
        }
        for id in &prompts {
            self.connect(episode, id)?;
        }

        let area = union_bounds(prompts.iter().filter_map(|id| self.node(id)).map(node_bounds))
            .ok_or(CanvasError::NothingToExpand)?
            .inflated(EXPANSION_GROUP_PADDING);
        let group = self.add_group(Group::new(group_title, area.x, area.y, area.width, area.height));
        info!(%episode, count = prompts.len(), "episode expanded");
        Ok(Expansion { prompts, group })
    }

    /// Run `op`, restoring the graph as it was if it fails part-way.
    fn all_or_nothing<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, CanvasError>,
    ) -> Result<T, CanvasError> {
        let before = self.snapshot();
        let result = op(self);
        if let Err(err) = &result {
            warn!(error = %err, "rolling back partial update");
            self.restore(before);
        }
        result
    }

    // === Snapshots ===

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.nodes, &self.connections, &self.groups)
    }

    /// Replace the whole graph. Node `inputs` are rebuilt from the
    /// connection list.
    pub fn restore(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.connections = snapshot.connections;
        self.groups = snapshot.groups;
        self.rebuild_inputs();
    }

    fn rebuild_inputs(&mut self) {
        let index: HashMap<NodeId, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id().clone(), i))
            .collect();
        for node in &mut self.nodes {
            node.inputs_mut().clear();
        }
        for c in &self.connections {
            if let Some(&i) = index.get(&c.to) {
                self.nodes[i].inputs_mut().push(c.from.clone());
            }
        }
    }

    /// Report the first broken structural invariant, if any.
    pub fn verify_invariants(&self) -> Result<(), CanvasError> {
        let violated = |msg: String| Err(CanvasError::InvariantViolated(msg));

        let mut ids = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id()) {
                return violated(format!("duplicate node id {}", node.id()));
            }
            if node.data().kind() != node.node_type() {
                return violated(format!("node {} carries {} data", node.id(), node.data().kind()));
            }
        }

        let mut edges = HashSet::new();
        let mut inbound: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        for c in &self.connections {
            if c.from == c.to {
                return violated(format!("self-loop on {}", c.from));
            }
            if !ids.contains(&c.from) || !ids.contains(&c.to) {
                return violated(format!("dangling connection {} -> {}", c.from, c.to));
            }
            if !edges.insert((&c.from, &c.to)) {
                return violated(format!("duplicate connection {} -> {}", c.from, c.to));
            }
            inbound.entry(&c.to).or_default().push(&c.from);
        }
        if !is_acyclic(&self.connections) {
            return violated("connections contain a cycle".to_string());
        }

        for node in &self.nodes {
            let expected: HashSet<&NodeId> = inbound.get(node.id()).into_iter().flatten().copied().collect();
            let max = rule_for(node.node_type()).max_inputs;
            if expected.len() > max {
                return violated(format!("node {} has {} inputs, max {}", node.id(), expected.len(), max));
            }
            let actual: HashSet<&NodeId> = node.inputs().iter().collect();
            if actual != expected || node.inputs().len() != expected.len() {
                return violated(format!("inputs of node {} out of sync", node.id()));
            }
        }
        Ok(())
    }
}

fn finite_position(id: &NodeId, x: f32, y: f32) -> (f32, f32) {
    let clean = sanitize_position(x, y);
    if clean != (x, y) {
        warn!(node = %id, "non-finite node position, using fallback");
    }
    clean
}

fn finite_size(id: &NodeId, size: Option<f32>) -> Option<f32> {
    match size {
        Some(s) if !(s.is_finite() && s > 0.0) => {
            warn!(node = %id, size = s, "unusable node size, using default");
            None
        }
        other => other,
    }
}
