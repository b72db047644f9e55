//! Minimax game-tree evaluation with alpha-beta pruning.
//!
//! Trees are built from an expression or JSON text, evaluated by a pure
//! function into a fresh annotated tree and rendered for the terminal or
//! for tree-graph widgets.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
