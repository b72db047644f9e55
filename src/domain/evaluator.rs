//! Minimax evaluation with optional alpha-beta pruning.
//!
//! Evaluation is a pure function of the input tree: the result is a fresh
//! [`AnnotatedTree`] holding computed values, display labels and prune marks.
//! Re-evaluating the same [`Node`] is therefore safe and deterministic.

use std::fmt;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::annotated::AnnotatedTree;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{format_value, Direction, Node, NodeId, Role};

/// Alpha-beta window passed down by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Best value the maximizer can already guarantee
    pub alpha: f64,
    /// Best value the minimizer can already guarantee
    pub beta: f64,
}

impl Bounds {
    /// The unrestricted window given to the root.
    pub const UNBOUNDED: Bounds = Bounds {
        alpha: f64::NEG_INFINITY,
        beta: f64::INFINITY,
    };

    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Tightens the bound owned by `role` with a child's value.
    fn absorb(&mut self, role: Role, value: f64) {
        match role {
            Role::Max => self.alpha = self.alpha.max(value),
            Role::Min => self.beta = self.beta.min(value),
        }
    }

    pub fn is_cutoff(&self) -> bool {
        self.beta <= self.alpha
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[α={}, β={}]", fmt_bound(self.alpha), fmt_bound(self.beta))
    }
}

fn fmt_bound(v: f64) -> String {
    if v == f64::INFINITY {
        "+∞".to_string()
    } else if v == f64::NEG_INFINITY {
        "-∞".to_string()
    } else {
        format_value(v)
    }
}

/// One step of an evaluation pass, in visitation order.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Enter {
        depth: usize,
        id: NodeId,
        name: String,
        role: Role,
        bounds: Bounds,
    },
    Leaf {
        depth: usize,
        id: NodeId,
        name: String,
        value: f64,
    },
    Update {
        depth: usize,
        id: NodeId,
        name: String,
        child_value: f64,
        bounds: Bounds,
    },
    Cutoff {
        depth: usize,
        id: NodeId,
        name: String,
        bounds: Bounds,
    },
    Prune {
        depth: usize,
        id: NodeId,
        name: String,
    },
    Exit {
        depth: usize,
        id: NodeId,
        name: String,
        value: f64,
    },
}

impl TraceEvent {
    pub fn depth(&self) -> usize {
        match self {
            TraceEvent::Enter { depth, .. }
            | TraceEvent::Leaf { depth, .. }
            | TraceEvent::Update { depth, .. }
            | TraceEvent::Cutoff { depth, .. }
            | TraceEvent::Prune { depth, .. }
            | TraceEvent::Exit { depth, .. } => *depth,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(self.depth());
        match self {
            TraceEvent::Enter {
                name, role, bounds, ..
            } => write!(f, "{indent}enter {name} ({role}) {bounds}"),
            TraceEvent::Leaf { name, value, .. } => {
                write!(f, "{indent}leaf {name} = {}", format_value(*value))
            }
            TraceEvent::Update {
                name,
                child_value,
                bounds,
                ..
            } => write!(
                f,
                "{indent}{name} sees {} -> {bounds}",
                format_value(*child_value)
            ),
            TraceEvent::Cutoff { name, bounds, .. } => {
                write!(f, "{indent}cutoff at {name} {bounds}")
            }
            TraceEvent::Prune { name, .. } => write!(f, "{indent}prune {name}"),
            TraceEvent::Exit { name, value, .. } => {
                write!(f, "{indent}{name} = {}", format_value(*value))
            }
        }
    }
}

/// Counters collected during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalStats {
    /// Nodes the evaluator descended into, leaves included
    pub visited: usize,
    pub leaves_evaluated: usize,
    /// Prune marks written
    pub pruned: usize,
}

/// Outcome of one evaluation pass.
#[derive(Debug)]
pub struct Evaluation {
    pub value: f64,
    pub direction: Direction,
    pub root_role: Role,
    pub tree: AnnotatedTree,
    pub stats: EvalStats,
    pub trace: Vec<TraceEvent>,
}

impl Evaluation {
    /// Input labels of nodes that received a prune mark.
    pub fn pruned_names(&self) -> Vec<String> {
        self.tree.pruned_names()
    }

    /// Computed (or leaf) value of the first node with this label.
    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.tree.find(name).and_then(|data| data.value)
    }
}

/// Evaluates `root` with the unrestricted window.
pub fn evaluate(root: &Node, direction: Direction, root_role: Role) -> DomainResult<Evaluation> {
    evaluate_with_bounds(root, direction, root_role, Bounds::UNBOUNDED)
}

/// Evaluates `root` starting from an explicit alpha-beta window.
///
/// The tree is validated before anything is built, so an invalid input
/// yields `InvalidTree` and no partial result.
#[instrument(level = "debug", skip(root), fields(root = %root.label()))]
pub fn evaluate_with_bounds(
    root: &Node,
    direction: Direction,
    root_role: Role,
    bounds: Bounds,
) -> DomainResult<Evaluation> {
    root.validate()?;

    let mut tree = AnnotatedTree::from_node(root, root_role);
    let root_idx = tree
        .root()
        .ok_or_else(|| DomainError::MissingNode(root.label().to_string()))?;

    let mut pass = Pass {
        tree: &mut tree,
        direction,
        stats: EvalStats::default(),
        trace: Vec::new(),
    };
    let value = pass.visit(root_idx, root_role, bounds, 0)?;
    let stats = pass.stats;
    let trace = pass.trace;

    debug!(
        value,
        visited = stats.visited,
        pruned = stats.pruned,
        "evaluation finished"
    );
    Ok(Evaluation {
        value,
        direction,
        root_role,
        tree,
        stats,
        trace,
    })
}

/// Plain minimax without any pruning, used as a reference value.
pub fn minimax_value(root: &Node, role: Role) -> DomainResult<f64> {
    root.validate()?;
    Ok(plain(root, role))
}

fn plain(node: &Node, role: Role) -> f64 {
    match node.value() {
        Some(v) => v,
        None => node
            .children()
            .iter()
            .map(|child| plain(child, role.opposite()))
            .fold(None, |best, v| Some(role.pick(best, v)))
            .unwrap_or(f64::NAN),
    }
}

struct Pass<'a> {
    tree: &'a mut AnnotatedTree,
    direction: Direction,
    stats: EvalStats,
    trace: Vec<TraceEvent>,
}

impl Pass<'_> {
    fn visit(&mut self, idx: Index, role: Role, mut bounds: Bounds, depth: usize) -> DomainResult<f64> {
        self.stats.visited += 1;
        let (id, name, leaf_value, children) = {
            let node = self
                .tree
                .get_node(idx)
                .ok_or_else(|| DomainError::MissingNode(format!("{idx:?}")))?;
            (
                node.data.id,
                node.data.name.clone(),
                node.data.leaf_value,
                node.children.clone(),
            )
        };

        if let Some(value) = leaf_value {
            self.stats.leaves_evaluated += 1;
            trace!(%name, value, "leaf");
            self.trace.push(TraceEvent::Leaf {
                depth,
                id,
                name,
                value,
            });
            return Ok(value);
        }

        self.trace.push(TraceEvent::Enter {
            depth,
            id,
            name: name.clone(),
            role,
            bounds,
        });

        let order: Vec<Index> = if self.direction.reverses() {
            children.iter().rev().copied().collect()
        } else {
            children
        };

        let mut best: Option<f64> = None;
        let mut pruning = false;
        for child in order {
            if pruning {
                self.mark_pruned(child, depth + 1)?;
                continue;
            }

            let value = self.visit(child, role.opposite(), bounds, depth + 1)?;
            best = Some(role.pick(best, value));
            bounds.absorb(role, value);
            self.trace.push(TraceEvent::Update {
                depth,
                id,
                name: name.clone(),
                child_value: value,
                bounds,
            });

            if self.direction.prunes() && bounds.is_cutoff() {
                pruning = true;
                trace!(%name, %bounds, "cutoff");
                self.trace.push(TraceEvent::Cutoff {
                    depth,
                    id,
                    name: name.clone(),
                    bounds,
                });
            }
        }

        // validate() guarantees at least one child, and the first visited
        // child is never pruned.
        let value = best.ok_or_else(|| DomainError::invalid_tree(&name, "internal node has no children"))?;

        let node = self
            .tree
            .get_node_mut(idx)
            .ok_or_else(|| DomainError::MissingNode(name.clone()))?;
        node.data.assign(value);

        self.trace.push(TraceEvent::Exit {
            depth,
            id,
            name,
            value,
        });
        Ok(value)
    }

    fn mark_pruned(&mut self, idx: Index, depth: usize) -> DomainResult<()> {
        let node = self
            .tree
            .get_node_mut(idx)
            .ok_or_else(|| DomainError::MissingNode(format!("{idx:?}")))?;
        node.data.prune_mark = true;
        self.stats.pruned += 1;
        trace!(name = %node.data.name, "pruned");
        self.trace.push(TraceEvent::Prune {
            depth,
            id: node.data.id,
            name: node.data.name.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parser::sample_tree;

    #[test]
    fn given_sample_without_pruning_when_evaluating_then_matches_literal_trace() {
        let tree = sample_tree();
        let eval = evaluate(&tree, Direction::None, Role::Max).unwrap();

        assert_eq!(eval.value, 4.0);
        assert_eq!(eval.value_of("B"), Some(3.0));
        assert_eq!(eval.value_of("I"), Some(0.0));
        assert_eq!(eval.value_of("F"), Some(5.0));
        assert_eq!(eval.value_of("G"), Some(8.0));
        assert_eq!(eval.value_of("C"), Some(4.0));
        assert_eq!(eval.value_of("A"), Some(4.0));
        assert!(eval.pruned_names().is_empty());
        assert_eq!(eval.stats.visited, 14);
        assert_eq!(eval.stats.leaves_evaluated, 8);
    }

    #[test]
    fn given_sample_with_rtl_when_evaluating_then_prunes_n_and_l() {
        let eval = evaluate(&sample_tree(), Direction::RightToLeft, Role::Max).unwrap();

        assert_eq!(eval.value, 4.0);
        assert_eq!(eval.pruned_names(), vec!["N", "L"]);
        // G only saw K before the cutoff
        assert_eq!(eval.value_of("G"), Some(7.0));
        assert_eq!(eval.stats.leaves_evaluated, 6);
    }

    #[test]
    fn given_sample_with_ltr_when_evaluating_then_prunes_i_subtree() {
        let eval = evaluate(&sample_tree(), Direction::LeftToRight, Role::Max).unwrap();

        assert_eq!(eval.value, 4.0);
        assert_eq!(eval.pruned_names(), vec!["I", "K"]);
        assert_eq!(eval.value_of("I"), None);
        assert_eq!(eval.tree.find("I").unwrap().label, "I");
        assert_eq!(eval.stats.leaves_evaluated, 5);
    }

    #[test]
    fn given_min_at_root_when_evaluating_then_roles_flip() {
        let eval = evaluate(&sample_tree(), Direction::None, Role::Min).unwrap();
        assert_eq!(eval.value, 5.0);
        assert_eq!(eval.value_of("B"), Some(5.0));
        assert_eq!(eval.value_of("C"), Some(7.0));
    }

    #[test]
    fn given_leaf_root_when_evaluating_then_returns_value_without_relabel() {
        let eval = evaluate(&Node::leaf("X", 9.0), Direction::RightToLeft, Role::Max).unwrap();
        assert_eq!(eval.value, 9.0);
        assert_eq!(eval.tree.find("X").unwrap().label, "X (9)");
        assert!(eval.trace.iter().all(|e| matches!(e, TraceEvent::Leaf { .. })));
    }

    #[test]
    fn given_narrow_window_when_evaluating_then_cutoff_on_first_child() {
        let tree = Node::internal("A", vec![Node::leaf("B", 5.0), Node::leaf("C", 9.0)]);
        let eval = evaluate_with_bounds(
            &tree,
            Direction::RightToLeft,
            Role::Max,
            Bounds::new(0.0, 2.0),
        )
        .unwrap();
        assert_eq!(eval.value, 5.0);
        assert_eq!(eval.pruned_names(), vec!["C"]);
    }

    #[test]
    fn given_cutoff_when_tracing_then_prune_follows_cutoff() {
        let eval = evaluate(&sample_tree(), Direction::RightToLeft, Role::Max).unwrap();
        let cutoff = eval
            .trace
            .iter()
            .position(|e| matches!(e, TraceEvent::Cutoff { name, .. } if name == "I"))
            .unwrap();
        assert!(matches!(
            &eval.trace[cutoff + 1],
            TraceEvent::Prune { name, .. } if name == "N"
        ));
    }

    #[test]
    fn given_invalid_tree_when_evaluating_then_fails_before_building() {
        let tree = Node::internal("A", vec![Node::leaf("B", 1.0), Node::internal("C", vec![])]);
        let err = evaluate(&tree, Direction::None, Role::Max).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTree { label, .. } if label == "C"));
    }

    #[test]
    fn given_sample_when_computing_plain_minimax_then_matches_pruned_value() {
        let tree = sample_tree();
        for role in [Role::Max, Role::Min] {
            let reference = minimax_value(&tree, role).unwrap();
            for direction in Direction::ALL {
                assert_eq!(evaluate(&tree, direction, role).unwrap().value, reference);
            }
        }
    }

    #[test]
    fn given_bounds_when_displaying_then_shows_infinity() {
        assert_eq!(Bounds::UNBOUNDED.to_string(), "[α=-∞, β=+∞]");
        assert_eq!(Bounds::new(3.0, 4.5).to_string(), "[α=3, β=4.5]");
    }
}
