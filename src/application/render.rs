//! Presentation adapter: annotated trees as terminal trees or graph JSON.

use colored::Colorize;
use generational_arena::Index;
use serde::Serialize;
use termtree::Tree;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{AnnotatedTree, Evaluation, NodeId};

const PRUNED_MARKER: &str = "[pruned]";

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

// Plain labels, no role prefix and no colors.
impl TreeNodeConvert for AnnotatedTree {
    fn to_tree_string(&self) -> Tree<String> {
        match self.root() {
            Some(root_idx) => build_tree(self, root_idx, &|tree, idx| {
                node_text(tree, idx, false)
            }),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

impl TreeNodeConvert for Evaluation {
    fn to_tree_string(&self) -> Tree<String> {
        render_tree(self, false)
    }
}

/// Terminal tree with the root prefixed by its role, e.g. `Max: A (4)`.
pub fn render_tree(evaluation: &Evaluation, color: bool) -> Tree<String> {
    let tree = &evaluation.tree;
    let Some(root_idx) = tree.root() else {
        return Tree::new("Empty tree".to_string());
    };
    let prefix = format!("{}: ", evaluation.root_role);
    build_tree(tree, root_idx, &|t, idx| {
        let text = node_text(t, idx, color);
        if idx == root_idx {
            format!("{prefix}{text}")
        } else {
            text
        }
    })
}

fn build_tree(
    arena: &AnnotatedTree,
    node_idx: Index,
    text: &dyn Fn(&AnnotatedTree, Index) -> String,
) -> Tree<String> {
    let mut tree = Tree::new(text(arena, node_idx));
    if let Some(node) = arena.get_node(node_idx) {
        for &child_idx in &node.children {
            tree.push(build_tree(arena, child_idx, text));
        }
    }
    tree
}

fn node_text(tree: &AnnotatedTree, idx: Index, color: bool) -> String {
    let Some(node) = tree.get_node(idx) else {
        return String::new();
    };
    let mut text = node.data.label.clone();
    if node.data.prune_mark {
        text = format!("{text} {PRUNED_MARKER}");
    }
    if !color {
        return text;
    }
    if tree.is_skipped(idx) {
        text.red().to_string()
    } else if node.data.value.is_some() && !node.data.is_leaf() {
        text.bold().to_string()
    } else {
        text
    }
}

/// Node shape consumed by tree-graph widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub name: String,
    pub value: Option<f64>,
    pub pruned: bool,
    #[serde(rename = "gProps")]
    pub g_props: GraphProps,
    pub children: Vec<GraphNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphProps {
    #[serde(rename = "className")]
    pub class_name: String,
}

/// Converts an evaluation into graph nodes. A prune mark colors the whole
/// subtree red.
pub fn to_graph(evaluation: &Evaluation) -> Option<GraphNode> {
    let root_idx = evaluation.tree.root()?;
    let mut root = graph_node(&evaluation.tree, root_idx, "black")?;
    root.name = format!("{}: {}", evaluation.root_role, root.name);
    Some(root)
}

fn graph_node(tree: &AnnotatedTree, idx: Index, inherited: &str) -> Option<GraphNode> {
    let node = tree.get_node(idx)?;
    let color = if node.data.prune_mark { "red" } else { inherited };
    let children = node
        .children
        .iter()
        .filter_map(|&child| graph_node(tree, child, color))
        .collect();
    Some(GraphNode {
        id: node.data.id,
        name: node.data.label.clone(),
        value: node.data.value,
        pruned: node.data.prune_mark,
        g_props: GraphProps {
            class_name: format!("node-{color}"),
        },
        children,
    })
}

pub fn to_graph_json(evaluation: &Evaluation) -> ApplicationResult<String> {
    let graph = to_graph(evaluation).ok_or_else(|| ApplicationError::OperationFailed {
        context: "render graph".to_string(),
        source: "evaluation has no root".into(),
    })?;
    serde_json::to_string_pretty(&graph).map_err(|e| ApplicationError::OperationFailed {
        context: "serialize graph".to_string(),
        source: Box::new(e),
    })
}

/// Step-by-step listing of an evaluation pass.
pub fn render_trace(evaluation: &Evaluation) -> Vec<String> {
    evaluation.trace.iter().map(ToString::to_string).collect()
}
