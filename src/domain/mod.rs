//! Domain layer: tree model, text formats and the minimax evaluator
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod annotated;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod node;
pub mod parser;

pub use annotated::{AnnotatedTree, NodeData, TreeNode};
pub use document::TreeDocument;
pub use error::{DomainError, DomainResult};
pub use evaluator::{
    evaluate, evaluate_with_bounds, minimax_value, Bounds, EvalStats, Evaluation, TraceEvent,
};
pub use node::{format_value, Direction, Node, NodeId, NodeKind, Role};
pub use parser::{parse_expr, parse_tree, sample_tree, TreeFormat, DEFAULT_TREE};

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~` for the home directory.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
