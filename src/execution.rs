//! Pre-flight check consulted before a node's generation back-end is called.
//!
//! The gate is advisory: it never mutates the graph and never blocks a call by
//! itself. The orchestrator decides what to do with a [`GateResult::Blocked`].

use crate::graph::inbound_count;
use crate::node::{Connection, Node, NodeData, NodeType};
use crate::rules::rule_for;

/// Outcome of [`can_execute_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResult {
    Ready,
    Blocked(GateError),
}

impl GateResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, GateResult::Ready)
    }

    pub fn error(&self) -> Option<&GateError> {
        match self {
            GateResult::Ready => None,
            GateResult::Blocked(err) => Some(err),
        }
    }
}

/// Why a node cannot run yet. The `Display` text is shown to users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("「{node_type}」节点至少需要 {required} 个输入，当前只有 {actual} 个")]
    TooFewInputs {
        node_type: NodeType,
        required: usize,
        actual: usize,
    },
    #[error("请输入提示词")]
    MissingPrompt,
    #[error("请输入提示词或连接上游节点")]
    MissingPromptOrInput,
    #[error("请先连接需要编辑的图片")]
    MissingSourceImage,
    #[error("请输入编辑指令")]
    MissingInstruction,
    #[error("请输入故事梗概或连接上游节点")]
    MissingPremise,
    #[error("请先选择要生成的章节")]
    MissingChapter,
    #[error("请输入剧本内容或连接上游节点")]
    MissingScript,
    #[error("请输入角色名称或连接上游节点")]
    MissingCharacters,
    #[error("请输入剧目名称")]
    MissingDramaName,
    #[error("请输入风格描述或连接上游节点")]
    MissingStyle,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Check topology first (minimum inputs), then per-type data completeness.
///
/// ```
/// use workflow_canvas::{can_execute_node, GateError, GateResult, Node, NodeType};
///
/// let image = Node::new(NodeType::ImageGenerator, 0.0, 0.0);
/// assert_eq!(
///     can_execute_node(&image, &[]),
///     GateResult::Blocked(GateError::MissingPromptOrInput)
/// );
/// ```
pub fn can_execute_node(node: &Node, connections: &[Connection]) -> GateResult {
    let inbound = inbound_count(connections, node.id());
    let required = rule_for(node.node_type()).min_inputs;
    if inbound < required {
        return GateResult::Blocked(GateError::TooFewInputs {
            node_type: node.node_type(),
            required,
            actual: inbound,
        });
    }
    let has_input = inbound > 0;

    let failure = match node.data() {
        NodeData::PromptInput(d) => (blank(&d.prompt) && !has_input).then_some(GateError::MissingPrompt),
        NodeData::ImageGenerator(d)
        | NodeData::VideoGenerator(d)
        | NodeData::AudioGenerator(d)
        | NodeData::SoraVideoGenerator(d)
        | NodeData::StoryboardVideoGenerator(d) => {
            (blank(&d.prompt) && !has_input).then_some(GateError::MissingPromptOrInput)
        }
        NodeData::ImageEditor(d) => {
            if !has_input {
                Some(GateError::MissingSourceImage)
            } else if blank(&d.instruction) {
                Some(GateError::MissingInstruction)
            } else {
                None
            }
        }
        NodeData::ScriptPlanner(d) => (blank(&d.premise) && !has_input).then_some(GateError::MissingPremise),
        NodeData::ScriptEpisode(d) => match &d.selected_chapter {
            Some(chapter) if !blank(chapter) => None,
            _ => Some(GateError::MissingChapter),
        },
        NodeData::StoryboardGenerator(d) | NodeData::StoryboardImage(d) => {
            (blank(&d.script) && d.shots.is_empty() && !has_input).then_some(GateError::MissingScript)
        }
        NodeData::CharacterNode(d) => (d.names.is_empty() && !has_input).then_some(GateError::MissingCharacters),
        NodeData::DramaAnalyzer(d) => blank(&d.drama_name).then_some(GateError::MissingDramaName),
        NodeData::StylePreset(d) => (blank(&d.style) && !has_input).then_some(GateError::MissingStyle),
        // Fully determined by their (required) upstream nodes
        NodeData::VideoAnalyzer(_)
        | NodeData::StoryboardSplitter(_)
        | NodeData::DramaRefined(_)
        | NodeData::SoraVideoChild(_)
        | NodeData::StoryboardVideoChild(_)
        | NodeData::VideoEditor(_) => None,
    };

    match failure {
        Some(err) => GateResult::Blocked(err),
        None => GateResult::Ready,
    }
}
