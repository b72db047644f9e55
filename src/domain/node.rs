//! Tree model: leaf and internal nodes with opaque identities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};

/// Opaque, stable node identity used to correlate input and annotated nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leaf/internal distinction as an explicit variant.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf { value: f64 },
    Internal { children: Vec<Node> },
}

/// A labeled game-tree node.
///
/// Children are owned, so a node has exactly one parent and the tree is
/// acyclic by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    label: String,
    kind: NodeKind,
}

impl Node {
    pub fn leaf(label: impl Into<String>, value: f64) -> Self {
        Self {
            id: NodeId::new(),
            label: label.into(),
            kind: NodeKind::Leaf { value },
        }
    }

    pub fn internal(label: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            id: NodeId::new(),
            label: label.into(),
            kind: NodeKind::Internal { children },
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Leaf value, `None` for internal nodes.
    pub fn value(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Leaf { value } => Some(value),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Children in natural order; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Leaf { .. } => &[],
            NodeKind::Internal { children } => children,
        }
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(Node::size).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children().iter().map(Node::leaf_count).sum()
        }
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Node::depth)
            .max()
            .unwrap_or(0)
    }

    /// Checks the evaluation contract for the whole subtree.
    ///
    /// Rejects internal nodes without children and leaves whose value is
    /// NaN or infinite.
    pub fn validate(&self) -> DomainResult<()> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Leaf { value } if !value.is_finite() => {
                    return Err(DomainError::invalid_tree(
                        &node.label,
                        format!("leaf value must be finite, got {value}"),
                    ));
                }
                NodeKind::Leaf { .. } => {}
                NodeKind::Internal { children } if children.is_empty() => {
                    return Err(DomainError::invalid_tree(
                        &node.label,
                        "internal node has no children",
                    ));
                }
                NodeKind::Internal { children } => stack.extend(children.iter()),
            }
        }
        Ok(())
    }
}

/// Whether a node maximizes or minimizes over its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Max,
    Min,
}

impl Role {
    pub fn opposite(self) -> Self {
        match self {
            Role::Max => Role::Min,
            Role::Min => Role::Max,
        }
    }

    pub fn is_max(self) -> bool {
        self == Role::Max
    }

    /// Folds `value` into the running aggregate for this role.
    pub fn pick(self, best: Option<f64>, value: f64) -> f64 {
        match (self, best) {
            (_, None) => value,
            (Role::Max, Some(b)) => b.max(value),
            (Role::Min, Some(b)) => b.min(value),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Max => write!(f, "Max"),
            Role::Min => write!(f, "Min"),
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximizing" => Ok(Role::Max),
            "min" | "minimizing" => Ok(Role::Min),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// Pruning mode and child visitation order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "ltr", alias = "left-to-right")]
    LeftToRight,
    #[serde(rename = "rtl", alias = "right-to-left")]
    RightToLeft,
}

impl Direction {
    pub const ALL: [Direction; 3] = [
        Direction::None,
        Direction::LeftToRight,
        Direction::RightToLeft,
    ];

    pub fn prunes(self) -> bool {
        self != Direction::None
    }

    /// `LeftToRight` visits children in reverse; the other modes keep
    /// natural order.
    pub fn reverses(self) -> bool {
        self == Direction::LeftToRight
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::LeftToRight => "ltr",
            Direction::RightToLeft => "rtl",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Ok(Direction::None),
            "ltr" | "left-to-right" => Ok(Direction::LeftToRight),
            "rtl" | "right-to-left" => Ok(Direction::RightToLeft),
            other => Err(DomainError::UnknownDirection(other.to_string())),
        }
    }
}

/// Formats a value the way labels show it: integers without a fraction.
/// Negative zero prints as `0`.
pub fn format_value(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}")
}
