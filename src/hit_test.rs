//! Geometry shared by rendering, hit testing, snapping, selection and
//! grouping.
//!
//! Every consumer goes through [`node_bounds`]; nothing else in the crate
//! computes a node rectangle. All coordinates here are canvas-logical.

use crate::node::{Group, GroupId, Node, NodeId, NodeType};
use tracing::warn;

/// Width used when a node has no explicit width.
pub const DEFAULT_NODE_WIDTH: f32 = 420.0;

/// Where a node with a non-finite position is placed.
pub const FALLBACK_POSITION: (f32, f32) = (100.0, 100.0);

/// Extra height a node grows by once it shows generated media.
const MEDIA_PREVIEW_HEIGHT: f32 = 240.0;

/// Axis-aligned rectangle with precomputed right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    /// Right edge (`x + width`).
    pub r: f32,
    /// Bottom edge (`y + height`).
    pub b: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            r: x + width,
            b: y + height,
            width,
            height,
        }
    }

    /// Normalised rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        let x = a.0.min(b.0);
        let y = a.1.min(b.1);
        Self::new(x, y, (a.0 - b.0).abs(), (a.1 - b.1).abs())
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Point strictly inside (border excluded).
    pub fn contains_strict(&self, (px, py): (f32, f32)) -> bool {
        px > self.x && px < self.r && py > self.y && py < self.b
    }

    /// Point inside or on the border.
    pub fn contains(&self, (px, py): (f32, f32)) -> bool {
        px >= self.x && px <= self.r && py >= self.y && py <= self.b
    }

    /// Positive-area intersection; touching edges do not overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.r && self.r > other.x && self.y < other.b && self.b > other.y
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow by `padding` on every side.
    pub fn inflated(&self, padding: f32) -> Self {
        Self::new(
            self.x - padding,
            self.y - padding,
            self.width + 2.0 * padding,
            self.height + 2.0 * padding,
        )
    }

    pub fn union(&self, other: &Bounds) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(x, y, self.r.max(other.r) - x, self.b.max(other.b) - y)
    }
}

/// Smallest rectangle enclosing all of `bounds`, or `None` if empty.
pub fn union_bounds<I: IntoIterator<Item = Bounds>>(bounds: I) -> Option<Bounds> {
    bounds.into_iter().reduce(|acc, b| acc.union(&b))
}

/// Trait for anything with an id and a canvas rectangle.
pub trait NodeGeometry {
    fn id(&self) -> &NodeId;
    fn bounds(&self) -> Bounds;
}

impl NodeGeometry for Node {
    fn id(&self) -> &NodeId {
        Node::id(self)
    }

    fn bounds(&self) -> Bounds {
        node_bounds(self)
    }
}

impl<T: NodeGeometry> NodeGeometry for &T {
    fn id(&self) -> &NodeId {
        (*self).id()
    }

    fn bounds(&self) -> Bounds {
        (*self).bounds()
    }
}

/// Height of an idle node of `node_type` with no generated media.
pub fn base_node_height(node_type: NodeType) -> f32 {
    match node_type {
        NodeType::PromptInput | NodeType::StylePreset => 240.0,
        NodeType::AudioGenerator => 280.0,
        NodeType::DramaAnalyzer | NodeType::DramaRefined => 360.0,
        NodeType::ScriptPlanner | NodeType::ScriptEpisode => 400.0,
        NodeType::CharacterNode
        | NodeType::StoryboardGenerator
        | NodeType::StoryboardImage
        | NodeType::StoryboardSplitter => 420.0,
        NodeType::VideoAnalyzer | NodeType::ImageEditor => 320.0,
        NodeType::VideoEditor => 360.0,
        NodeType::ImageGenerator
        | NodeType::VideoGenerator
        | NodeType::SoraVideoGenerator
        | NodeType::SoraVideoChild
        | NodeType::StoryboardVideoGenerator
        | NodeType::StoryboardVideoChild => 320.0,
    }
}

/// `node.height` if set and usable, otherwise a per-type estimate that grows
/// once the node shows generated media.
pub fn approx_node_height(node: &Node) -> f32 {
    match node.height {
        Some(h) if h.is_finite() && h > 0.0 => h,
        _ => {
            let base = base_node_height(node.node_type());
            if node.data().media_count() > 0 {
                base + MEDIA_PREVIEW_HEIGHT
            } else {
                base
            }
        }
    }
}

/// `node.width` if set and usable, otherwise [`DEFAULT_NODE_WIDTH`].
pub fn node_width(node: &Node) -> f32 {
    match node.width {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => DEFAULT_NODE_WIDTH,
    }
}

/// Replace a non-finite position with [`FALLBACK_POSITION`].
pub fn sanitize_position(x: f32, y: f32) -> (f32, f32) {
    if x.is_finite() && y.is_finite() {
        (x, y)
    } else {
        FALLBACK_POSITION
    }
}

/// Bounding box of `node`.
pub fn node_bounds(node: &Node) -> Bounds {
    let (x, y) = sanitize_position(node.x, node.y);
    if (x, y) != (node.x, node.y) {
        warn!(node = %node.id(), "non-finite node position, using fallback");
    }
    Bounds::new(x, y, node_width(node), approx_node_height(node))
}

pub fn group_bounds(group: &Group) -> Bounds {
    let (x, y) = sanitize_position(group.x, group.y);
    let w = if group.width.is_finite() { group.width.max(0.0) } else { 0.0 };
    let h = if group.height.is_finite() { group.height.max(0.0) } else { 0.0 };
    Bounds::new(x, y, w, h)
}

/// Nodes whose bounding-box centre lies in `group` (border inclusive).
pub fn members_of<'a>(group: &Group, nodes: &'a [Node]) -> Vec<&'a Node> {
    let area = group_bounds(group);
    nodes
        .iter()
        .filter(|n| area.contains(node_bounds(n).center()))
        .collect()
}

/// First group whose rectangle contains the node's centre.
pub fn group_containing<'a>(node: &Node, groups: &'a [Group]) -> Option<&'a Group> {
    let center = node_bounds(node).center();
    groups.iter().find(|g| group_bounds(g).contains(center))
}

/// Ids of nodes whose centres lie strictly inside `selection`.
pub fn nodes_in_selection_box<N, I>(selection: Bounds, nodes: I) -> Vec<NodeId>
where
    N: NodeGeometry,
    I: IntoIterator<Item = N>,
{
    nodes
        .into_iter()
        .filter(|node| selection.contains_strict(node.bounds().center()))
        .map(|node| node.id().clone())
        .collect()
}

/// Centre of the right edge, where outbound edges start.
pub fn output_port(node: &Node) -> (f32, f32) {
    let b = node_bounds(node);
    (b.r, b.y + b.height / 2.0)
}

/// Centre of the left edge, where inbound edges end.
pub fn input_port(node: &Node) -> (f32, f32) {
    let b = node_bounds(node);
    (b.x, b.y + b.height / 2.0)
}

fn within_radius(p: (f32, f32), q: (f32, f32), radius: f32) -> bool {
    let dx = p.0 - q.0;
    let dy = p.1 - q.1;
    dx * dx + dy * dy <= radius * radius
}

/// What lies under a canvas point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    OutputPort(NodeId),
    InputPort(NodeId),
    ResizeHandle(NodeId),
    Node(NodeId),
    Group(GroupId),
    Canvas,
}

/// Hit tolerances in canvas units (screen sizes already divided by zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerance {
    pub port_radius: f32,
    pub handle_size: f32,
}

/// Resolve what is under `point`.
///
/// Later nodes are drawn on top, so they are tested first. Priority is ports,
/// then resize handles, then node bodies, then groups, then the canvas.
pub fn hit_test(point: (f32, f32), nodes: &[Node], groups: &[Group], tol: HitTolerance) -> HitTarget {
    for node in nodes.iter().rev() {
        if within_radius(point, output_port(node), tol.port_radius) {
            return HitTarget::OutputPort(node.id().clone());
        }
        if within_radius(point, input_port(node), tol.port_radius) {
            return HitTarget::InputPort(node.id().clone());
        }
    }
    for node in nodes.iter().rev() {
        let b = node_bounds(node);
        let handle = Bounds::new(b.r - tol.handle_size, b.b - tol.handle_size, tol.handle_size, tol.handle_size);
        if handle.contains(point) {
            return HitTarget::ResizeHandle(node.id().clone());
        }
    }
    if let Some(node) = node_at(point, nodes) {
        return HitTarget::Node(node.id().clone());
    }
    if let Some(group) = groups.iter().rev().find(|g| group_bounds(g).contains(point)) {
        return HitTarget::Group(group.id.clone());
    }
    HitTarget::Canvas
}

/// Topmost node whose rectangle contains `point`.
pub fn node_at(point: (f32, f32), nodes: &[Node]) -> Option<&Node> {
    nodes.iter().rev().find(|n| node_bounds(n).contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{GenerationData, NodeData};

    fn node(id: &str, kind: NodeType, x: f32, y: f32) -> Node {
        Node::with_id(NodeId::from_string(id), kind, x, y)
    }

    const TOL: HitTolerance = HitTolerance {
        port_radius: 16.0,
        handle_size: 24.0,
    };

    // ========================================================================
    // Node bounds
    // ========================================================================

    #[test]
    fn test_default_width_and_type_height() {
        let n = node("a", NodeType::PromptInput, 10.0, 20.0);
        let b = node_bounds(&n);
        assert_eq!(b.width, DEFAULT_NODE_WIDTH);
        assert_eq!(b.height, 240.0);
        assert_eq!(b.r, 430.0);
        assert_eq!(b.b, 260.0);
    }

    #[test]
    fn test_explicit_size_wins() {
        let n = node("a", NodeType::ImageGenerator, 0.0, 0.0).sized(500.0, 300.0);
        assert_eq!(node_bounds(&n), Bounds::new(0.0, 0.0, 500.0, 300.0));
    }

    #[test]
    fn test_media_grows_estimate() {
        let empty = node("a", NodeType::ImageGenerator, 0.0, 0.0);
        let full = empty.clone().with_data(NodeData::ImageGenerator(GenerationData {
            outputs: vec!["img.png".into()],
            ..Default::default()
        }));
        assert!(approx_node_height(&full) > approx_node_height(&empty));
    }

    #[test]
    fn test_nan_position_falls_back() {
        let n = node("a", NodeType::PromptInput, f32::NAN, 5.0);
        let b = node_bounds(&n);
        assert_eq!((b.x, b.y), FALLBACK_POSITION);
    }

    #[test]
    fn test_bad_size_falls_back() {
        let mut n = node("a", NodeType::PromptInput, 0.0, 0.0);
        n.width = Some(f32::NAN);
        n.height = Some(-4.0);
        let b = node_bounds(&n);
        assert_eq!(b.width, DEFAULT_NODE_WIDTH);
        assert_eq!(b.height, base_node_height(NodeType::PromptInput));
    }

    // ========================================================================
    // Bounds helpers
    // ========================================================================

    #[test]
    fn test_from_corners_normalises() {
        let b = Bounds::from_corners((100.0, 50.0), (20.0, 80.0));
        assert_eq!(b, Bounds::new(20.0, 50.0, 80.0, 30.0));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Bounds::new(0.0, 0.0, 100.0, 100.0);
        assert!(!a.overlaps(&Bounds::new(100.0, 0.0, 50.0, 50.0)));
        assert!(a.overlaps(&Bounds::new(99.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_union_bounds() {
        assert_eq!(union_bounds(Vec::<Bounds>::new()), None);
        let u = union_bounds([
            Bounds::new(0.0, 0.0, 10.0, 10.0),
            Bounds::new(50.0, -5.0, 10.0, 10.0),
        ])
        .unwrap();
        assert_eq!(u, Bounds::new(0.0, -5.0, 60.0, 15.0));
    }

    // ========================================================================
    // Membership and marquee
    // ========================================================================

    #[test]
    fn test_members_of_uses_centre_inclusive() {
        let nodes = vec![
            node("in", NodeType::PromptInput, 0.0, 0.0),
            node("out", NodeType::PromptInput, 1000.0, 0.0),
        ];
        // Centre of "in" is (210, 120); the group's right edge passes through it
        let group = Group::new("g", 0.0, 0.0, 210.0, 500.0);
        let members: Vec<_> = members_of(&group, &nodes).into_iter().map(|n| n.id().as_str()).collect();
        assert_eq!(members, vec!["in"]);
    }

    #[test]
    fn test_group_containing() {
        let groups = vec![
            Group::new("far", 5000.0, 5000.0, 100.0, 100.0),
            Group::new("near", -50.0, -50.0, 600.0, 600.0),
        ];
        let n = node("a", NodeType::PromptInput, 0.0, 0.0);
        assert_eq!(group_containing(&n, &groups).map(|g| g.title.as_str()), Some("near"));
        let lonely = node("b", NodeType::PromptInput, 2000.0, 0.0);
        assert!(group_containing(&lonely, &groups).is_none());
    }

    #[test]
    fn test_selection_box_is_strict_on_centres() {
        let nodes = vec![
            node("a", NodeType::PromptInput, 0.0, 0.0),
            node("b", NodeType::PromptInput, 600.0, 0.0),
        ];
        // Exactly on a's centre x: excluded
        let edge = Bounds::new(-10.0, -10.0, 220.0, 400.0);
        assert!(nodes_in_selection_box(edge, &nodes).is_empty());

        let wide = Bounds::new(-10.0, -10.0, 221.0, 400.0);
        assert_eq!(nodes_in_selection_box(wide, &nodes), vec![NodeId::from_string("a")]);
    }

    // ========================================================================
    // hit_test()
    // ========================================================================

    #[test]
    fn test_hit_ports_before_body() {
        let nodes = vec![node("a", NodeType::PromptInput, 0.0, 0.0)];
        assert_eq!(
            hit_test((425.0, 120.0), &nodes, &[], TOL),
            HitTarget::OutputPort(NodeId::from_string("a"))
        );
        assert_eq!(
            hit_test((-5.0, 118.0), &nodes, &[], TOL),
            HitTarget::InputPort(NodeId::from_string("a"))
        );
        assert_eq!(
            hit_test((200.0, 100.0), &nodes, &[], TOL),
            HitTarget::Node(NodeId::from_string("a"))
        );
    }

    #[test]
    fn test_hit_resize_handle() {
        let nodes = vec![node("a", NodeType::PromptInput, 0.0, 0.0)];
        assert_eq!(
            hit_test((410.0, 230.0), &nodes, &[], TOL),
            HitTarget::ResizeHandle(NodeId::from_string("a"))
        );
    }

    #[test]
    fn test_hit_topmost_node_wins() {
        let nodes = vec![
            node("below", NodeType::PromptInput, 0.0, 0.0),
            node("above", NodeType::PromptInput, 100.0, 50.0),
        ];
        assert_eq!(
            hit_test((200.0, 150.0), &nodes, &[], TOL),
            HitTarget::Node(NodeId::from_string("above"))
        );
    }

    #[test]
    fn test_hit_group_then_canvas() {
        let group = Group::new("g", 1000.0, 1000.0, 300.0, 300.0);
        let gid = group.id.clone();
        let groups = vec![group];
        assert_eq!(hit_test((1100.0, 1100.0), &[], &groups, TOL), HitTarget::Group(gid));
        assert_eq!(hit_test((0.0, 0.0), &[], &groups, TOL), HitTarget::Canvas);
    }
}
