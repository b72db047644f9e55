//! Tree evaluation service
//!
//! Loads trees through the filesystem boundary and runs the evaluator.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    evaluate, format_value, minimax_value, parse_tree, Direction, EvalStats, Evaluation, Node,
    Role, TreeFormat,
};
use crate::infrastructure::traits::FileSystem;

/// Result of one direction in a comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionReport {
    pub direction: Direction,
    pub value: f64,
    /// Input labels of prune-marked nodes, left to right
    pub pruned: Vec<String>,
    pub stats: EvalStats,
}

impl fmt::Display for DirectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pruned = if self.pruned.is_empty() {
            "-".to_string()
        } else {
            self.pruned.iter().join(", ")
        };
        write!(
            f,
            "{:<5} value={} visited={} leaves={} pruned=[{}]",
            self.direction.as_str(),
            format_value(self.value),
            self.stats.visited,
            self.stats.leaves_evaluated,
            pruned
        )
    }
}

/// All three directions evaluated on the same tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub root_role: Role,
    /// Value from plain minimax without pruning
    pub reference: f64,
    pub reports: Vec<DirectionReport>,
}

impl Comparison {
    pub fn report(&self, direction: Direction) -> Option<&DirectionReport> {
        self.reports.iter().find(|r| r.direction == direction)
    }
}

/// Service for building and evaluating game trees.
pub struct EvaluationService {
    fs: Arc<dyn FileSystem>,
}

impl EvaluationService {
    /// Create a new evaluation service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read tree text from a file.
    pub fn read_source(&self, path: &Path) -> ApplicationResult<String> {
        self.fs
            .read_to_string(path)
            .with_path_context("read tree", path)
    }

    /// Read and parse a tree file. `Auto` picks the format by extension,
    /// then by content.
    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, path: &Path, format: TreeFormat) -> ApplicationResult<Node> {
        let source = self.read_source(path)?;
        let format = format.resolve(Some(path), &source);
        debug!("load_tree: {} as {}", path.display(), format);
        Ok(parse_tree(&source, format)?)
    }

    /// Parse tree text already in memory.
    pub fn parse(&self, source: &str, format: TreeFormat) -> ApplicationResult<Node> {
        Ok(parse_tree(source, format)?)
    }

    #[instrument(level = "debug", skip(self, node), fields(root = %node.label()))]
    pub fn evaluate(
        &self,
        node: &Node,
        direction: Direction,
        root_role: Role,
    ) -> ApplicationResult<Evaluation> {
        let evaluation = evaluate(node, direction, root_role)?;
        debug!(
            "evaluate: value={} pruned={}",
            evaluation.value, evaluation.stats.pruned
        );
        Ok(evaluation)
    }

    /// Evaluate every direction in parallel and check they agree with
    /// plain minimax.
    #[instrument(level = "debug", skip(self, node), fields(root = %node.label()))]
    pub fn compare(&self, node: &Node, root_role: Role) -> ApplicationResult<Comparison> {
        let reference = minimax_value(node, root_role)?;

        let reports = Direction::ALL[..]
            .par_iter()
            .map(|&direction| {
                evaluate(node, direction, root_role).map(|eval| DirectionReport {
                    direction,
                    value: eval.value,
                    pruned: eval.pruned_names(),
                    stats: eval.stats,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let disagreeing: Vec<_> = reports.iter().filter(|r| r.value != reference).collect();
        if !disagreeing.is_empty() {
            let details = disagreeing
                .iter()
                .map(|r| format!("{}={}", r.direction, format_value(r.value)))
                .join(", ");
            warn!("compare: reference {} but {}", reference, details);
            return Err(ApplicationError::Inconsistent {
                details: format!("reference={}, {}", format_value(reference), details),
            });
        }

        Ok(Comparison {
            root_role,
            reference,
            reports,
        })
    }
}
