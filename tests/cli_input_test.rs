//! Tree input resolution: stdin, configured default tree, built-in sample

use std::io;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use abviz::cli::commands::read_tree;
use abviz::config::Settings;
use abviz::domain::{evaluate, Direction, Node, Role, TreeFormat};
use abviz::exitcode;
use abviz::infrastructure::di::ServiceContainer;
use abviz::infrastructure::traits::{InputSource, RealFileSystem};

/// Input source that hands back fixed text.
struct FixedInput(String);

impl InputSource for FixedInput {
    fn read_all(&self) -> io::Result<String> {
        Ok(self.0.clone())
    }
}

/// Input source whose reads always fail.
struct BrokenInput;

impl InputSource for BrokenInput {
    fn read_all(&self) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

fn container(settings: Settings, input: impl InputSource + 'static) -> ServiceContainer {
    ServiceContainer::with_deps(settings, Arc::new(RealFileSystem), Arc::new(input))
}

fn value_of(node: &Node) -> f64 {
    evaluate(node, Direction::None, Role::Max).unwrap().value
}

#[test]
fn given_dash_when_reading_tree_then_parses_piped_input() {
    let container = container(
        Settings::default(),
        FixedInput("node('R', [node('a', 2), node('b', 9)])".to_string()),
    );

    let node = read_tree(&container, Some(Path::new("-")), TreeFormat::Auto).unwrap();

    assert_eq!(node.label(), "R");
    assert_eq!(value_of(&node), 9.0);
}

#[test]
fn given_dash_and_json_input_when_reading_tree_then_sniffs_json() {
    let container = container(
        Settings::default(),
        FixedInput(r#"{"label": "R", "children": [{"label": "a", "value": -3}]}"#.to_string()),
    );

    let node = read_tree(&container, Some(Path::new("-")), TreeFormat::Auto).unwrap();
    assert_eq!(value_of(&node), -3.0);
}

#[test]
fn given_failing_stdin_when_reading_tree_then_io_error() {
    let container = container(Settings::default(), BrokenInput);

    let err = read_tree(&container, Some(Path::new("-")), TreeFormat::Auto).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::IOERR);
    assert!(err.to_string().contains("read stdin"));
}

#[test]
fn given_configured_default_tree_when_no_file_then_loads_it() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("game.tree");
    std::fs::write(&path, "node('G', [node('x', 1), node('y', 6)])").unwrap();
    let settings = Settings {
        default_tree: Some(path),
        ..Default::default()
    };
    let container = container(settings, BrokenInput);

    let node = read_tree(&container, None, TreeFormat::Auto).unwrap();

    assert_eq!(node.label(), "G");
    assert_eq!(value_of(&node), 6.0);
}

#[test]
fn given_missing_default_tree_when_no_file_then_noinput() {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        default_tree: Some(temp.path().join("gone.tree")),
        ..Default::default()
    };
    let container = container(settings, BrokenInput);

    let err = read_tree(&container, None, TreeFormat::Auto).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_no_file_and_no_default_when_reading_tree_then_sample() {
    let container = container(Settings::default(), BrokenInput);

    let node = read_tree(&container, None, TreeFormat::Auto).unwrap();

    assert_eq!(node.size(), 14);
    assert_eq!(value_of(&node), 4.0);
}
