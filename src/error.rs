//! Error type for fallible store, persistence and configuration operations.
//!
//! Connection-rule and execution-gate failures are *not* reported through
//! [`CanvasError`]: those predicates return [`ValidationResult`] and
//! [`GateResult`] values so callers can surface them inline. A rejected
//! connection only becomes an error when a mutating call such as
//! [`GraphStore::connect`] is asked to commit it.
//!
//! [`ValidationResult`]: crate::ValidationResult
//! [`GateResult`]: crate::GateResult
//! [`GraphStore::connect`]: crate::GraphStore::connect

use crate::graph::ValidationError;
use crate::node::{GroupId, NodeId, NodeType};

/// Errors returned by [`GraphStore`](crate::GraphStore) and
/// [`CanvasConfig`](crate::CanvasConfig) operations.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// No node with this id exists in the graph.
    #[error("node {0} not found")]
    UnknownNode(NodeId),

    /// No group with this id exists in the graph.
    #[error("group {0} not found")]
    UnknownGroup(GroupId),

    /// A node with this id is already in the graph.
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    /// A node's data payload was replaced by a payload of another node type.
    #[error("data for {found} cannot be stored on a {expected} node")]
    DataKindMismatch {
        /// Type of the node being updated.
        expected: NodeType,
        /// Type the new payload belongs to.
        found: NodeType,
    },

    /// The operation only applies to one node type.
    #[error("operation requires a {expected} node, got {found}")]
    WrongNodeType {
        /// Required node type.
        expected: NodeType,
        /// Actual node type.
        found: NodeType,
    },

    /// The connection rule engine refused the edge; the graph is unchanged.
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    /// A programmatic expansion was requested with nothing to expand.
    #[error("nothing to expand")]
    NothingToExpand,

    /// A loaded or restored graph breaks a structural invariant.
    #[error("graph invariant violated: {0}")]
    InvariantViolated(String),

    /// Snapshot (de)serialisation failed.
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configuration document could not be parsed.
    #[error("invalid canvas configuration: {0}")]
    Config(#[from] toml::de::Error),
}
