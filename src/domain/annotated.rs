use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::node::{format_value, Node, NodeId, Role};

/// Data payload for annotated nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Identity copied from the input node
    pub id: NodeId,
    /// Label as written in the input tree
    pub name: String,
    /// Display label, `name (value)` once a value is known
    pub label: String,
    /// Value fixed at construction, leaves only
    pub leaf_value: Option<f64>,
    /// Leaf value or computed minimax value; `None` if never evaluated
    pub value: Option<f64>,
    /// Aggregation role at this depth
    pub role: Role,
    /// Set on children skipped by an alpha-beta cutoff
    pub prune_mark: bool,
}

impl NodeData {
    fn from_node(node: &Node, role: Role) -> Self {
        let leaf_value = node.value();
        let label = match leaf_value {
            Some(v) => format!("{} ({})", node.label(), format_value(v)),
            None => node.label().to_string(),
        };
        Self {
            id: node.id(),
            name: node.label().to_string(),
            label,
            leaf_value,
            value: leaf_value,
            role,
            prune_mark: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf_value.is_some()
    }

    /// Records the computed value and appends it to the display label.
    pub(crate) fn assign(&mut self, value: f64) {
        self.value = Some(value);
        self.label = format!("{} ({})", self.name, format_value(value));
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Tree node in the arena-based annotated tree.
#[derive(Debug)]
pub struct TreeNode {
    /// Annotation payload for this node
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in natural order
    pub children: Vec<Index>,
}

/// Arena-based copy of an input tree that carries evaluation results.
///
/// Built fresh for every evaluation, so the input `Node` is never touched.
#[derive(Debug)]
pub struct AnnotatedTree {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl Default for AnnotatedTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotatedTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Copies the shape of `root`, assigning roles by alternating depth.
    #[instrument(level = "trace", skip(root), fields(root = %root.label()))]
    pub fn from_node(root: &Node, root_role: Role) -> Self {
        let mut tree = Self::new();
        let mut stack = vec![(root, None, root_role)];
        // Pushing children in reverse keeps natural order in the arena.
        while let Some((node, parent, role)) = stack.pop() {
            let idx = tree.insert_node(NodeData::from_node(node, role), parent);
            for child in node.children().iter().rev() {
                stack.push((child, Some(idx), role.opposite()));
            }
        }
        tree
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Pre-order traversal, children left to right.
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    /// Finds the first node (pre-order) with the given input label.
    pub fn find(&self, name: &str) -> Option<&NodeData> {
        self.iter()
            .map(|(_, node)| &node.data)
            .find(|data| data.name == name)
    }

    /// Input labels of nodes carrying a prune mark, left to right.
    pub fn pruned_names(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.data.prune_mark)
            .map(|(_, node)| node.data.name.clone())
            .collect()
    }

    /// True if the node or any ancestor carries a prune mark.
    pub fn is_skipped(&self, idx: Index) -> bool {
        let mut current = Some(idx);
        while let Some(i) = current {
            match self.get_node(i) {
                Some(node) if node.data.prune_mark => return true,
                Some(node) => current = node.parent,
                None => return false,
            }
        }
        false
    }
}

pub struct TreeIterator<'a> {
    arena: &'a AnnotatedTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a AnnotatedTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
