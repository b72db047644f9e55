//! Interactive evaluation session
//!
//! Holds the tree text being edited together with the chosen direction and
//! starting role. Every change re-evaluates from scratch; a failed attempt
//! leaves the last good evaluation in place for display.

use std::path::Path;

use tracing::{debug, info};

use crate::application::services::EvaluationService;
use crate::application::ApplicationResult;
use crate::domain::{Direction, Evaluation, Node, Role, TreeFormat, DEFAULT_TREE};

pub struct Session {
    service: EvaluationService,
    source: String,
    /// Configured format
    format: TreeFormat,
    /// Format of the current text, resolved from a file extension on load
    source_format: TreeFormat,
    direction: Direction,
    start_with: Role,
    last_good: Option<Evaluation>,
    last_error: Option<String>,
}

impl Session {
    /// Create a session on the sample tree. Nothing is evaluated until the
    /// first change or `refresh()`.
    pub fn new(
        service: EvaluationService,
        direction: Direction,
        start_with: Role,
        format: TreeFormat,
    ) -> Self {
        Self {
            service,
            source: DEFAULT_TREE.to_string(),
            format,
            source_format: format,
            direction,
            start_with,
            last_good: None,
            last_error: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn start_with(&self) -> Role {
        self.start_with
    }

    /// Last successful evaluation.
    pub fn current(&self) -> Option<&Evaluation> {
        self.last_good.as_ref()
    }

    /// Message of the most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the tree text. The text is kept even if it fails to evaluate.
    pub fn submit(&mut self, source: impl Into<String>) -> ApplicationResult<&Evaluation> {
        self.source = source.into();
        self.source_format = self.format;
        self.refresh()
    }

    /// Load tree text from a file; the file extension selects the format
    /// when the session format is `Auto`.
    pub fn load(&mut self, path: &Path) -> ApplicationResult<&Evaluation> {
        match self.service.read_source(path) {
            Ok(source) => {
                self.source_format = self.format.resolve(Some(path), &source);
                self.source = source;
                info!("session: loaded {}", path.display());
                self.refresh()
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn set_direction(&mut self, direction: Direction) -> ApplicationResult<&Evaluation> {
        self.direction = direction;
        self.refresh()
    }

    pub fn toggle_role(&mut self) -> ApplicationResult<&Evaluation> {
        self.start_with = self.start_with.opposite();
        self.refresh()
    }

    /// Back to the sample tree.
    pub fn reset(&mut self) -> ApplicationResult<&Evaluation> {
        self.source = DEFAULT_TREE.to_string();
        self.source_format = TreeFormat::Expr;
        self.refresh()
    }

    /// Re-parse and re-evaluate the current text.
    pub fn refresh(&mut self) -> ApplicationResult<&Evaluation> {
        let parsed = self.service.parse(&self.source, self.source_format);
        match parsed {
            Ok(node) => self.run(&node),
            Err(e) => {
                debug!("session: keeping last good tree after parse failure");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn run(&mut self, node: &Node) -> ApplicationResult<&Evaluation> {
        match self.service.evaluate(node, self.direction, self.start_with) {
            Ok(evaluation) => {
                self.last_error = None;
                Ok(&*self.last_good.insert(evaluation))
            }
            Err(e) => {
                debug!("session: keeping last good tree after evaluation failure");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
