//! Connection rule engine.
//!
//! [`validate_connection`] decides whether a proposed edge is legal. It runs
//! six checks in a fixed order and reports the first failure:
//!
//! 1. outbound type compatibility
//! 2. inbound type compatibility
//! 3. inbound cardinality
//! 4. duplicate edge
//! 5. cycle
//! 6. self-loop
//!
//! Each check is also available as a [`ConnectionValidator`] so callers can
//! compose their own chain with [`CompositeValidator`]. Everything here is a
//! pure predicate; committing the edge is [`GraphStore::connect`]'s job.
//!
//! [`GraphStore::connect`]: crate::GraphStore::connect

use crate::node::{Connection, Node, NodeId, NodeType};
use crate::rules::rule_for;
use std::collections::{HashMap, HashSet};

/// Result of connection validation with optional rejection reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Connection is legal.
    Valid,
    /// Connection is illegal for the given reason.
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns the first error if any.
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }

    /// The rejection reason, if any.
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(err) => Err(err),
        }
    }
}

/// Reasons a connection is rejected. The `Display` text is shown to users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `from` may not feed a node of type `to`.
    #[error("「{from}」节点不能连接到「{to}」节点")]
    OutputNotAllowed { from: NodeType, to: NodeType },
    /// `to` does not accept input from a node of type `from`.
    #[error("「{to}」节点不接受来自「{from}」节点的输入")]
    InputNotAllowed { from: NodeType, to: NodeType },
    /// Target already has its maximum number of inbound connections.
    #[error("「{node_type}」节点最多只能有 {max} 个输入")]
    MaxInputsReached { node_type: NodeType, max: usize },
    /// The same (from, to) edge already exists.
    #[error("连接已存在")]
    DuplicateConnection,
    /// Adding the edge would close a directed cycle.
    #[error("无法连接：会形成循环依赖")]
    CycleDetected,
    /// Source and target are the same node.
    #[error("节点不能连接到自身")]
    SelfLoop,
    /// Failure reported by a caller-supplied validator.
    #[error("{0}")]
    Custom(String),
}

/// A single connection-legality check.
///
/// ```
/// use workflow_canvas::{Connection, ConnectionValidator, Node, ValidationError, ValidationResult};
///
/// /// Refuses any edge into a node that is currently generating.
/// struct NotWhileWorking;
///
/// impl ConnectionValidator for NotWhileWorking {
///     fn validate(&self, _from: &Node, to: &Node, _existing: &[Connection]) -> ValidationResult {
///         if to.status == workflow_canvas::NodeStatus::Working {
///             ValidationResult::Invalid(ValidationError::Custom("生成中，无法连接".into()))
///         } else {
///             ValidationResult::Valid
///         }
///     }
/// }
/// ```
pub trait ConnectionValidator {
    fn validate(&self, from: &Node, to: &Node, existing: &[Connection]) -> ValidationResult;
}

/// Checks 1 and 2: both ends of the rule table must agree.
#[derive(Clone, Copy, Debug, Default)]
pub struct TypeCompatibilityValidator;

impl ConnectionValidator for TypeCompatibilityValidator {
    fn validate(&self, from: &Node, to: &Node, _existing: &[Connection]) -> ValidationResult {
        let (from_type, to_type) = (from.node_type(), to.node_type());
        if !rule_for(from_type).allows_output(to_type) {
            return ValidationResult::Invalid(ValidationError::OutputNotAllowed {
                from: from_type,
                to: to_type,
            });
        }
        if !rule_for(to_type).accepts_input(from_type) {
            return ValidationResult::Invalid(ValidationError::InputNotAllowed {
                from: from_type,
                to: to_type,
            });
        }
        ValidationResult::Valid
    }
}

/// Check 3: the target's inbound count must stay below its maximum.
#[derive(Clone, Copy, Debug, Default)]
pub struct CardinalityValidator;

impl ConnectionValidator for CardinalityValidator {
    fn validate(&self, _from: &Node, to: &Node, existing: &[Connection]) -> ValidationResult {
        let max = rule_for(to.node_type()).max_inputs;
        if inbound_count(existing, to.id()) >= max {
            ValidationResult::Invalid(ValidationError::MaxInputsReached {
                node_type: to.node_type(),
                max,
            })
        } else {
            ValidationResult::Valid
        }
    }
}

/// Check 4: no second edge with the same (from, to).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesValidator;

impl ConnectionValidator for NoDuplicatesValidator {
    fn validate(&self, from: &Node, to: &Node, existing: &[Connection]) -> ValidationResult {
        if connection_exists(existing, from.id(), to.id()) {
            ValidationResult::Invalid(ValidationError::DuplicateConnection)
        } else {
            ValidationResult::Valid
        }
    }
}

/// Check 5: the new edge must not let `to` reach `from`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCycleValidator;

impl ConnectionValidator for NoCycleValidator {
    fn validate(&self, from: &Node, to: &Node, existing: &[Connection]) -> ValidationResult {
        if path_exists(existing, to.id(), from.id()) {
            ValidationResult::Invalid(ValidationError::CycleDetected)
        } else {
            ValidationResult::Valid
        }
    }
}

/// Check 6: `from` and `to` must differ.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSelfLoopValidator;

impl ConnectionValidator for NoSelfLoopValidator {
    fn validate(&self, from: &Node, to: &Node, _existing: &[Connection]) -> ValidationResult {
        if from.id() == to.id() {
            ValidationResult::Invalid(ValidationError::SelfLoop)
        } else {
            ValidationResult::Valid
        }
    }
}

/// Runs several validators in order and stops at the first failure.
///
/// Uses `Vec<Box<dyn ...>>`, which allocates; [`validate_connection`] runs the
/// standard chain without allocating.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six standard checks in their required order. Append custom checks
    /// with [`add`](Self::add).
    pub fn standard() -> Self {
        Self::new()
            .add(TypeCompatibilityValidator)
            .add(CardinalityValidator)
            .add(NoDuplicatesValidator)
            .add(NoCycleValidator)
            .add(NoSelfLoopValidator)
    }

    #[must_use]
    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(&self, from: &Node, to: &Node, existing: &[Connection]) -> ValidationResult {
        for v in &self.validators {
            let result = v.validate(from, to, existing);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }
}

/// Decide whether `from -> to` may be added to `existing`.
///
/// ```
/// use workflow_canvas::{validate_connection, Connection, Node, NodeType, ValidationError, ValidationResult};
///
/// let image = Node::new(NodeType::ImageGenerator, 0.0, 0.0);
/// let video = Node::new(NodeType::VideoGenerator, 1000.0, 0.0);
/// assert!(validate_connection(&image, &video, &[]).is_valid());
///
/// // The reverse edge would make the image depend on itself.
/// let existing = vec![Connection::new(image.id().clone(), video.id().clone())];
/// let result = validate_connection(&video, &image, &existing);
/// assert_eq!(result, ValidationResult::Invalid(ValidationError::CycleDetected));
/// assert!(result.error().unwrap().to_string().contains("循环依赖"));
/// ```
pub fn validate_connection(from: &Node, to: &Node, existing: &[Connection]) -> ValidationResult {
    let chain: [&dyn ConnectionValidator; 5] = [
        &TypeCompatibilityValidator,
        &CardinalityValidator,
        &NoDuplicatesValidator,
        &NoCycleValidator,
        &NoSelfLoopValidator,
    ];
    for validator in chain {
        let result = validator.validate(from, to, existing);
        if !result.is_valid() {
            return result;
        }
    }
    ValidationResult::Valid
}

/// Number of connections ending at `id`.
pub fn inbound_count(connections: &[Connection], id: &NodeId) -> usize {
    connections.iter().filter(|c| &c.to == id).count()
}

pub fn connection_exists(connections: &[Connection], from: &NodeId, to: &NodeId) -> bool {
    connections.iter().any(|c| &c.from == from && &c.to == to)
}

/// Connections with `id` at either end.
pub fn connections_touching<'a>(
    connections: &'a [Connection],
    id: &'a NodeId,
) -> impl Iterator<Item = &'a Connection> + 'a {
    connections.iter().filter(move |c| c.touches(id))
}

/// True if `target` is reachable from `start` by following edges forward.
///
/// A node reaches itself trivially. Iterative depth-first search with an
/// explicit stack, O(V + E).
pub fn path_exists(connections: &[Connection], start: &NodeId, target: &NodeId) -> bool {
    if start == target {
        return true;
    }
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for c in connections {
        adjacency.entry(&c.from).or_default().push(&c.to);
    }

    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut stack = vec![start];
    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        let Some(next) = adjacency.get(current) else {
            continue;
        };
        for &n in next {
            if n == target {
                return true;
            }
            if !visited.contains(n) {
                stack.push(n);
            }
        }
    }
    false
}

/// True if the connection set contains no directed cycle (Kahn's algorithm).
pub fn is_acyclic(connections: &[Connection]) -> bool {
    let mut in_degree: HashMap<&NodeId, usize> = HashMap::new();
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for c in connections {
        in_degree.entry(&c.from).or_insert(0);
        *in_degree.entry(&c.to).or_insert(0) += 1;
        adjacency.entry(&c.from).or_default().push(&c.to);
    }

    let mut ready: Vec<&NodeId> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&id, _)| id)
        .collect();
    let mut removed = 0;
    while let Some(id) = ready.pop() {
        removed += 1;
        for &n in adjacency.get(id).into_iter().flatten() {
            if let Some(d) = in_degree.get_mut(n) {
                *d -= 1;
                if *d == 0 {
                    ready.push(n);
                }
            }
        }
    }
    removed == in_degree.len()
}

// ============================================================================
// Tests
// ============================================================================
