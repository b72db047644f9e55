//! Integration tests for Settings config loading.
//!
//! These tests only write local config files in temp directories, so they
//! exercise the local layer on top of defaults (or the user's global config).

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use abviz::application::ApplicationError;
use abviz::config::{local_config_path, Settings};
use abviz::domain::{Direction, Role, TreeFormat};

#[test]
fn given_local_config_when_load_then_overrides_scalars() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        r#"
direction = "rtl"
start_with = "min"
color = false
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.direction, Direction::RightToLeft);
    assert_eq!(settings.start_with, Role::Min);
    assert!(!settings.color);
}

#[test]
fn given_relative_default_tree_when_load_then_resolves_against_project() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "default_tree = \"trees/game.json\"\nformat = \"json\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(
        settings.default_tree,
        Some(project.path().join("trees/game.json"))
    );
    assert_eq!(settings.format, TreeFormat::Json);
}

#[test]
fn given_home_relative_default_tree_when_load_then_expands_tilde() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "default_tree = \"~/game.tree\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    let home = PathBuf::from(std::env::var("HOME").expect("HOME should be set"));
    assert_eq!(settings.default_tree, Some(home.join("game.tree")));
}

#[test]
fn given_invalid_direction_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "direction = \"sideways\"\n").unwrap();

    let err = Settings::load(Some(project.path())).unwrap_err();
    match err {
        ApplicationError::Config { message } => assert!(message.contains(".abviz.toml")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_template_when_written_as_local_config_then_loads() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), Settings::template()).unwrap();

    assert!(Settings::load(Some(project.path())).is_ok());
}

#[test]
fn given_loaded_settings_when_to_toml_then_contains_fields() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "direction = \"ltr\"\n").unwrap();

    let toml = Settings::load(Some(project.path()))
        .unwrap()
        .to_toml()
        .unwrap();

    assert!(toml.contains("direction = \"ltr\""));
    assert!(toml.contains("start_with"));
    assert!(toml.contains("color"));
}
