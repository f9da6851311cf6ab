//! Static per-type connection rules.
//!
//! This table is the type system of the workflow graph: it decides which
//! generation stages may feed which others and how many inputs each stage
//! accepts. The table is symmetric: whenever `A` lists `B` as an allowed
//! output, `B` lists `A` as an allowed input.

use crate::node::NodeType;
use crate::node::NodeType::*;

/// Connection rules for one node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRule {
    /// Types that may feed this node.
    pub allowed_inputs: &'static [NodeType],
    /// Types this node may feed.
    pub allowed_outputs: &'static [NodeType],
    /// Inbound connections required before the node can execute.
    pub min_inputs: usize,
    /// Inbound connections the node accepts at most.
    pub max_inputs: usize,
}

impl NodeRule {
    pub fn accepts_input(&self, from: NodeType) -> bool {
        self.allowed_inputs.contains(&from)
    }

    pub fn allows_output(&self, to: NodeType) -> bool {
        self.allowed_outputs.contains(&to)
    }

    /// A sink never has outbound edges.
    pub fn is_sink(&self) -> bool {
        self.allowed_outputs.is_empty()
    }

    /// A source never has inbound edges.
    pub fn is_source(&self) -> bool {
        self.max_inputs == 0
    }
}

static PROMPT_INPUT: NodeRule = NodeRule {
    allowed_inputs: &[VideoAnalyzer, ScriptEpisode, DramaRefined, StylePreset],
    allowed_outputs: &[
        ImageGenerator,
        VideoGenerator,
        AudioGenerator,
        ScriptPlanner,
        StoryboardGenerator,
        CharacterNode,
        SoraVideoGenerator,
        ImageEditor,
        StoryboardImage,
    ],
    min_inputs: 0,
    max_inputs: 3,
};

static IMAGE_GENERATOR: NodeRule = NodeRule {
    allowed_inputs: &[
        PromptInput,
        ImageGenerator,
        VideoGenerator,
        ImageEditor,
        VideoAnalyzer,
        StoryboardImage,
        StoryboardSplitter,
        CharacterNode,
        StylePreset,
    ],
    allowed_outputs: &[
        ImageGenerator,
        VideoGenerator,
        ImageEditor,
        SoraVideoGenerator,
        StoryboardVideoGenerator,
        VideoEditor,
    ],
    min_inputs: 0,
    max_inputs: 5,
};

static VIDEO_GENERATOR: NodeRule = NodeRule {
    allowed_inputs: &[
        PromptInput,
        ImageGenerator,
        VideoGenerator,
        VideoAnalyzer,
        ImageEditor,
        StoryboardImage,
        StoryboardSplitter,
        StylePreset,
    ],
    allowed_outputs: &[ImageGenerator, VideoAnalyzer, VideoGenerator, VideoEditor],
    min_inputs: 0,
    max_inputs: 3,
};

static AUDIO_GENERATOR: NodeRule = NodeRule {
    allowed_inputs: &[PromptInput, ScriptEpisode],
    allowed_outputs: &[],
    min_inputs: 0,
    max_inputs: 1,
};

static VIDEO_ANALYZER: NodeRule = NodeRule {
    allowed_inputs: &[VideoGenerator],
    allowed_outputs: &[PromptInput, ImageGenerator, VideoGenerator],
    min_inputs: 1,
    max_inputs: 1,
};

static IMAGE_EDITOR: NodeRule = NodeRule {
    allowed_inputs: &[PromptInput, ImageGenerator, ImageEditor],
    allowed_outputs: &[ImageGenerator, VideoGenerator, ImageEditor, SoraVideoGenerator],
    min_inputs: 0,
    max_inputs: 3,
};

static SCRIPT_PLANNER: NodeRule = NodeRule {
    allowed_inputs: &[PromptInput, DramaRefined, StylePreset],
    allowed_outputs: &[ScriptEpisode, CharacterNode],
    min_inputs: 0,
    max_inputs: 3,
};

static SCRIPT_EPISODE: NodeRule = NodeRule {
    allowed_inputs: &[ScriptPlanner],
    allowed_outputs: &[
        PromptInput,
        StoryboardGenerator,
        CharacterNode,
        StoryboardImage,
        AudioGenerator,
    ],
    min_inputs: 1,
    max_inputs: 1,
};

static STORYBOARD_GENERATOR: NodeRule = NodeRule {
    allowed_inputs: &[PromptInput, ScriptEpisode, CharacterNode],
    allowed_outputs: &[StoryboardImage, StoryboardVideoGenerator],
    min_inputs: 0,
    max_inputs: 5,
};

static STORYBOARD_IMAGE: NodeRule = NodeRule {
    allowed_inputs: &[
        PromptInput,
        ScriptEpisode,
        StoryboardGenerator,
        CharacterNode,
        StylePreset,
    ],
    allowed_outputs: &[
        StoryboardSplitter,
        ImageGenerator,
        VideoGenerator,
        StoryboardVideoGenerator,
    ],
    min_inputs: 0,
    max_inputs: 5,
};

static STORYBOARD_SPLITTER: NodeRule = NodeRule {
    allowed_inputs: &[StoryboardImage],
    allowed_outputs: &[
        ImageGenerator,
        VideoGenerator,
        StoryboardVideoGenerator,
        SoraVideoGenerator,
    ],
    min_inputs: 1,
    max_inputs: 1,
};

static CHARACTER_NODE: NodeRule = NodeRule {
    allowed_inputs: &[PromptInput, ScriptPlanner, ScriptEpisode, StylePreset],
    allowed_outputs: &[
        ImageGenerator,
        StoryboardImage,
        StoryboardGenerator,
        SoraVideoGenerator,
    ],
    min_inputs: 0,
    max_inputs: 3,
};

static DRAMA_ANALYZER: NodeRule = NodeRule {
    allowed_inputs: &[],
    allowed_outputs: &[DramaRefined],
    min_inputs: 0,
    max_inputs: 0,
};

static DRAMA_REFINED: NodeRule = NodeRule {
    allowed_inputs: &[DramaAnalyzer],
    allowed_outputs: &[ScriptPlanner, PromptInput, StylePreset],
    min_inputs: 1,
    max_inputs: 1,
};

static STYLE_PRESET: NodeRule = NodeRule {
    allowed_inputs: &[DramaRefined],
    allowed_outputs: &[
        ImageGenerator,
        VideoGenerator,
        StoryboardImage,
        CharacterNode,
        PromptInput,
        ScriptPlanner,
    ],
    min_inputs: 0,
    max_inputs: 1,
};

static SORA_VIDEO_GENERATOR: NodeRule = NodeRule {
    allowed_inputs: &[
        PromptInput,
        ImageGenerator,
        ImageEditor,
        StoryboardSplitter,
        CharacterNode,
    ],
    allowed_outputs: &[SoraVideoChild],
    min_inputs: 0,
    max_inputs: 5,
};

static SORA_VIDEO_CHILD: NodeRule = NodeRule {
    allowed_inputs: &[SoraVideoGenerator],
    allowed_outputs: &[VideoEditor],
    min_inputs: 1,
    max_inputs: 1,
};

static STORYBOARD_VIDEO_GENERATOR: NodeRule = NodeRule {
    allowed_inputs: &[
        ImageGenerator,
        StoryboardGenerator,
        StoryboardImage,
        StoryboardSplitter,
    ],
    allowed_outputs: &[StoryboardVideoChild],
    min_inputs: 0,
    max_inputs: 5,
};

static STORYBOARD_VIDEO_CHILD: NodeRule = NodeRule {
    allowed_inputs: &[StoryboardVideoGenerator],
    allowed_outputs: &[VideoEditor],
    min_inputs: 1,
    max_inputs: 1,
};

static VIDEO_EDITOR: NodeRule = NodeRule {
    allowed_inputs: &[
        ImageGenerator,
        VideoGenerator,
        SoraVideoChild,
        StoryboardVideoChild,
    ],
    allowed_outputs: &[],
    min_inputs: 1,
    max_inputs: 10,
};

/// Rules for `node_type`.
pub fn rule_for(node_type: NodeType) -> &'static NodeRule {
    match node_type {
        PromptInput => &PROMPT_INPUT,
        ImageGenerator => &IMAGE_GENERATOR,
        VideoGenerator => &VIDEO_GENERATOR,
        AudioGenerator => &AUDIO_GENERATOR,
        VideoAnalyzer => &VIDEO_ANALYZER,
        ImageEditor => &IMAGE_EDITOR,
        ScriptPlanner => &SCRIPT_PLANNER,
        ScriptEpisode => &SCRIPT_EPISODE,
        StoryboardGenerator => &STORYBOARD_GENERATOR,
        StoryboardImage => &STORYBOARD_IMAGE,
        StoryboardSplitter => &STORYBOARD_SPLITTER,
        CharacterNode => &CHARACTER_NODE,
        DramaAnalyzer => &DRAMA_ANALYZER,
        DramaRefined => &DRAMA_REFINED,
        StylePreset => &STYLE_PRESET,
        SoraVideoGenerator => &SORA_VIDEO_GENERATOR,
        SoraVideoChild => &SORA_VIDEO_CHILD,
        StoryboardVideoGenerator => &STORYBOARD_VIDEO_GENERATOR,
        StoryboardVideoChild => &STORYBOARD_VIDEO_CHILD,
        VideoEditor => &VIDEO_EDITOR,
    }
}
