//! Graph data model: nodes, connections, groups and snapshots.
//!
//! A [`Node`]'s type is fixed at creation and its [`NodeData`] payload always
//! matches that type. Its `inputs` list mirrors the connections that end at
//! it; only [`GraphStore`](crate::GraphStore) writes that list, which is how
//! the two stay in sync.

use crate::error::CanvasError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Unique identifier of a node.
///
/// Generated with nanoid at creation and never changed afterwards. Uses
/// `Arc<str>` so cloning an id (which happens on every gesture) is a
/// reference-count bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Creates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Wraps an existing id, e.g. when restoring a persisted graph.
    #[must_use]
    pub fn from_string(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Arc<str>);

impl GroupId {
    /// Creates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Wraps an existing id.
    #[must_use]
    pub fn from_string(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    PromptInput,
    ImageGenerator,
    VideoGenerator,
    AudioGenerator,
    VideoAnalyzer,
    ImageEditor,
    ScriptPlanner,
    ScriptEpisode,
    StoryboardGenerator,
    StoryboardImage,
    StoryboardSplitter,
    CharacterNode,
    DramaAnalyzer,
    DramaRefined,
    StylePreset,
    SoraVideoGenerator,
    SoraVideoChild,
    StoryboardVideoGenerator,
    StoryboardVideoChild,
    VideoEditor,
}

impl NodeType {
    /// Every node type, in palette order.
    pub const ALL: [NodeType; 20] = [
        NodeType::PromptInput,
        NodeType::ImageGenerator,
        NodeType::VideoGenerator,
        NodeType::AudioGenerator,
        NodeType::VideoAnalyzer,
        NodeType::ImageEditor,
        NodeType::ScriptPlanner,
        NodeType::ScriptEpisode,
        NodeType::StoryboardGenerator,
        NodeType::StoryboardImage,
        NodeType::StoryboardSplitter,
        NodeType::CharacterNode,
        NodeType::DramaAnalyzer,
        NodeType::DramaRefined,
        NodeType::StylePreset,
        NodeType::SoraVideoGenerator,
        NodeType::SoraVideoChild,
        NodeType::StoryboardVideoGenerator,
        NodeType::StoryboardVideoChild,
        NodeType::VideoEditor,
    ];

    /// User-facing label, also used as the default node title.
    pub fn display_name(self) -> &'static str {
        match self {
            NodeType::PromptInput => "创意描述",
            NodeType::ImageGenerator => "文字生图",
            NodeType::VideoGenerator => "文生视频",
            NodeType::AudioGenerator => "灵感音乐",
            NodeType::VideoAnalyzer => "视频分析",
            NodeType::ImageEditor => "图像编辑",
            NodeType::ScriptPlanner => "剧本大纲",
            NodeType::ScriptEpisode => "剧本分集",
            NodeType::StoryboardGenerator => "分镜生成",
            NodeType::StoryboardImage => "分镜图",
            NodeType::StoryboardSplitter => "分镜拆分",
            NodeType::CharacterNode => "角色设计",
            NodeType::DramaAnalyzer => "剧目分析",
            NodeType::DramaRefined => "剧目精炼",
            NodeType::StylePreset => "风格预设",
            NodeType::SoraVideoGenerator => "Sora 视频",
            NodeType::SoraVideoChild => "Sora 视频片段",
            NodeType::StoryboardVideoGenerator => "分镜视频",
            NodeType::StoryboardVideoChild => "分镜视频片段",
            NodeType::VideoEditor => "视频剪辑",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Generation status, written by the execution collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    #[default]
    Idle,
    Working,
    Success,
    Error,
}

/// Free-text input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptData {
    pub prompt: String,
}

/// Payload shared by the media generators and their child shots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationData {
    pub prompt: String,
    pub model: Option<String>,
    pub aspect_ratio: Option<String>,
    /// References (URLs or asset keys) to generated media.
    pub outputs: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisData {
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageEditData {
    pub instruction: String,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptPlanData {
    pub premise: String,
    pub genre: Option<String>,
    pub episode_count: u32,
    pub outline: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeData {
    pub selected_chapter: Option<String>,
    pub episodes: Vec<String>,
}

/// Payload of storyboard generators and storyboard images.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryboardData {
    pub script: String,
    pub shots: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterData {
    pub panels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterData {
    pub names: Vec<String>,
    pub portraits: Vec<String>,
}

/// Payload of the drama analyzer and its refined follow-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DramaData {
    pub drama_name: String,
    pub analysis: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleData {
    pub style: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoEditData {
    pub clips: Vec<String>,
    pub output: Option<String>,
}

/// Type-dependent node payload, one variant per [`NodeType`].
///
/// The graph engine only inspects it for presence checks (the execution gate)
/// and to estimate a node's rendered height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeData {
    PromptInput(PromptData),
    ImageGenerator(GenerationData),
    VideoGenerator(GenerationData),
    AudioGenerator(GenerationData),
    VideoAnalyzer(AnalysisData),
    ImageEditor(ImageEditData),
    ScriptPlanner(ScriptPlanData),
    ScriptEpisode(EpisodeData),
    StoryboardGenerator(StoryboardData),
    StoryboardImage(StoryboardData),
    StoryboardSplitter(SplitterData),
    CharacterNode(CharacterData),
    DramaAnalyzer(DramaData),
    DramaRefined(DramaData),
    StylePreset(StyleData),
    SoraVideoGenerator(GenerationData),
    SoraVideoChild(GenerationData),
    StoryboardVideoGenerator(GenerationData),
    StoryboardVideoChild(GenerationData),
    VideoEditor(VideoEditData),
}

impl NodeData {
    /// Empty payload for a freshly created node of `kind`.
    pub fn empty(kind: NodeType) -> Self {
        match kind {
            NodeType::PromptInput => NodeData::PromptInput(PromptData::default()),
            NodeType::ImageGenerator => NodeData::ImageGenerator(GenerationData::default()),
            NodeType::VideoGenerator => NodeData::VideoGenerator(GenerationData::default()),
            NodeType::AudioGenerator => NodeData::AudioGenerator(GenerationData::default()),
            NodeType::VideoAnalyzer => NodeData::VideoAnalyzer(AnalysisData::default()),
            NodeType::ImageEditor => NodeData::ImageEditor(ImageEditData::default()),
            NodeType::ScriptPlanner => NodeData::ScriptPlanner(ScriptPlanData::default()),
            NodeType::ScriptEpisode => NodeData::ScriptEpisode(EpisodeData::default()),
            NodeType::StoryboardGenerator => {
                NodeData::StoryboardGenerator(StoryboardData::default())
            }
            NodeType::StoryboardImage => NodeData::StoryboardImage(StoryboardData::default()),
            NodeType::StoryboardSplitter => NodeData::StoryboardSplitter(SplitterData::default()),
            NodeType::CharacterNode => NodeData::CharacterNode(CharacterData::default()),
            NodeType::DramaAnalyzer => NodeData::DramaAnalyzer(DramaData::default()),
            NodeType::DramaRefined => NodeData::DramaRefined(DramaData::default()),
            NodeType::StylePreset => NodeData::StylePreset(StyleData::default()),
            NodeType::SoraVideoGenerator => {
                NodeData::SoraVideoGenerator(GenerationData::default())
            }
            NodeType::SoraVideoChild => NodeData::SoraVideoChild(GenerationData::default()),
            NodeType::StoryboardVideoGenerator => {
                NodeData::StoryboardVideoGenerator(GenerationData::default())
            }
            NodeType::StoryboardVideoChild => {
                NodeData::StoryboardVideoChild(GenerationData::default())
            }
            NodeType::VideoEditor => NodeData::VideoEditor(VideoEditData::default()),
        }
    }

    /// The node type this payload belongs to.
    pub fn kind(&self) -> NodeType {
        match self {
            NodeData::PromptInput(_) => NodeType::PromptInput,
            NodeData::ImageGenerator(_) => NodeType::ImageGenerator,
            NodeData::VideoGenerator(_) => NodeType::VideoGenerator,
            NodeData::AudioGenerator(_) => NodeType::AudioGenerator,
            NodeData::VideoAnalyzer(_) => NodeType::VideoAnalyzer,
            NodeData::ImageEditor(_) => NodeType::ImageEditor,
            NodeData::ScriptPlanner(_) => NodeType::ScriptPlanner,
            NodeData::ScriptEpisode(_) => NodeType::ScriptEpisode,
            NodeData::StoryboardGenerator(_) => NodeType::StoryboardGenerator,
            NodeData::StoryboardImage(_) => NodeType::StoryboardImage,
            NodeData::StoryboardSplitter(_) => NodeType::StoryboardSplitter,
            NodeData::CharacterNode(_) => NodeType::CharacterNode,
            NodeData::DramaAnalyzer(_) => NodeType::DramaAnalyzer,
            NodeData::DramaRefined(_) => NodeType::DramaRefined,
            NodeData::StylePreset(_) => NodeType::StylePreset,
            NodeData::SoraVideoGenerator(_) => NodeType::SoraVideoGenerator,
            NodeData::SoraVideoChild(_) => NodeType::SoraVideoChild,
            NodeData::StoryboardVideoGenerator(_) => NodeType::StoryboardVideoGenerator,
            NodeData::StoryboardVideoChild(_) => NodeType::StoryboardVideoChild,
            NodeData::VideoEditor(_) => NodeType::VideoEditor,
        }
    }

    /// Number of generated media items the node currently shows.
    pub fn media_count(&self) -> usize {
        match self {
            NodeData::ImageGenerator(d)
            | NodeData::VideoGenerator(d)
            | NodeData::AudioGenerator(d)
            | NodeData::SoraVideoGenerator(d)
            | NodeData::SoraVideoChild(d)
            | NodeData::StoryboardVideoGenerator(d)
            | NodeData::StoryboardVideoChild(d) => d.outputs.len(),
            NodeData::ImageEditor(d) => d.outputs.len(),
            NodeData::StoryboardGenerator(d) | NodeData::StoryboardImage(d) => d.images.len(),
            NodeData::StoryboardSplitter(d) => d.panels.len(),
            NodeData::CharacterNode(d) => d.portraits.len(),
            NodeData::VideoEditor(d) => usize::from(d.output.is_some()),
            NodeData::PromptInput(_)
            | NodeData::VideoAnalyzer(_)
            | NodeData::ScriptPlanner(_)
            | NodeData::ScriptEpisode(_)
            | NodeData::DramaAnalyzer(_)
            | NodeData::DramaRefined(_)
            | NodeData::StylePreset(_) => 0,
        }
    }
}

/// A typed vertex of the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: NodeType,
    /// Left edge in canvas coordinates.
    pub x: f32,
    /// Top edge in canvas coordinates.
    pub y: f32,
    /// Layout width; `None` means the shared default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Layout height; `None` means the per-type estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    pub title: String,
    #[serde(default)]
    pub status: NodeStatus,
    data: NodeData,
    #[serde(default)]
    inputs: Vec<NodeId>,
}

impl Node {
    /// Creates an idle node of `node_type` at `(x, y)` with a fresh id and an
    /// empty payload.
    pub fn new(node_type: NodeType, x: f32, y: f32) -> Self {
        Self::with_id(NodeId::new(), node_type, x, y)
    }

    /// Creates a node with a caller-chosen id.
    pub fn with_id(id: NodeId, node_type: NodeType, x: f32, y: f32) -> Self {
        Self {
            id,
            node_type,
            x,
            y,
            width: None,
            height: None,
            title: node_type.display_name().to_string(),
            status: NodeStatus::Idle,
            data: NodeData::empty(node_type),
            inputs: Vec::new(),
        }
    }

    /// Builder-style size override.
    #[must_use]
    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Builder-style payload; panics in debug builds on a kind mismatch.
    #[must_use]
    pub fn with_data(mut self, data: NodeData) -> Self {
        debug_assert_eq!(data.kind(), self.node_type, "payload kind mismatch");
        if data.kind() == self.node_type {
            self.data = data;
        }
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Replaces the payload, refusing payloads of another node type.
    pub fn set_data(&mut self, data: NodeData) -> Result<(), CanvasError> {
        if data.kind() != self.node_type {
            return Err(CanvasError::DataKindMismatch {
                expected: self.node_type,
                found: data.kind(),
            });
        }
        self.data = data;
        Ok(())
    }

    /// Upstream node ids, in connection order.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.inputs
    }
}

/// Directed edge: the output of `from` feeds the input of `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
}

impl Connection {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }

    /// True if either endpoint is `id`.
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.from == id || &self.to == id
    }
}

/// A rectangular region of the canvas. Owns no nodes: membership is
/// recomputed from geometry with [`members_of`](crate::members_of).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Group {
    pub fn new(title: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: GroupId::new(),
            title: title.into(),
            x,
            y,
            width,
            height,
        }
    }
}

/// Deep copy of the whole graph, used by history and persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub groups: Vec<Group>,
}

impl GraphSnapshot {
    /// Clones the three collections into a snapshot.
    pub fn capture(nodes: &[Node], connections: &[Connection], groups: &[Group]) -> Self {
        Self {
            nodes: nodes.to_vec(),
            connections: connections.to_vec(),
            groups: groups.to_vec(),
        }
    }
}
