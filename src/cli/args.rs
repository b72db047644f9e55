//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::{Direction, Role, TreeFormat};

/// Minimax game trees with alpha-beta pruning: evaluate, compare, explore
#[derive(Parser, Debug)]
#[command(name = "abviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project directory holding .abviz.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a tree and show the annotated result
    Eval {
        /// Tree file, `-` for stdin (default: configured tree or the sample)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,

        /// Pruning direction: none, ltr, rtl
        #[arg(short, long)]
        direction: Option<Direction>,

        /// Role of the root node: max, min
        #[arg(short, long)]
        start_with: Option<Role>,

        /// Tree format: auto, expr, json
        #[arg(short, long)]
        format: Option<TreeFormat>,

        /// Output kind
        #[arg(short, long, value_enum, default_value_t = OutputKind::Tree)]
        output: OutputKind,

        /// Print each evaluation step
        #[arg(long)]
        trace: bool,

        /// Print visit counts
        #[arg(long)]
        stats: bool,
    },

    /// Evaluate all directions side by side
    Compare {
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,

        #[arg(short, long)]
        start_with: Option<Role>,

        #[arg(short, long)]
        format: Option<TreeFormat>,
    },

    /// Print the sample tree
    Sample {
        /// Print as JSON instead of an expression
        #[arg(long)]
        json: bool,
    },

    /// Interactive session reading commands from stdin
    Repl {
        /// Initial tree file
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputKind {
    /// Annotated terminal tree
    #[default]
    Tree,
    /// Graph JSON for tree widgets
    Json,
    /// Root value only
    Value,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn given_cli_definition_when_asserting_then_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_eval_flags_when_parsing_then_domain_types() {
        let cli = Cli::try_parse_from([
            "abviz", "-vv", "eval", "t.tree", "-d", "ltr", "-s", "min", "-o", "value",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Eval {
                file,
                direction,
                start_with,
                output,
                ..
            }) => {
                assert_eq!(file, Some(PathBuf::from("t.tree")));
                assert_eq!(direction, Some(Direction::LeftToRight));
                assert_eq!(start_with, Some(Role::Min));
                assert_eq!(output, OutputKind::Value);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_bad_direction_when_parsing_then_rejected() {
        assert!(Cli::try_parse_from(["abviz", "eval", "-d", "sideways"]).is_err());
    }
}
