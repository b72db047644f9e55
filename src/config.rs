//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/abviz/abviz.toml`
//! 3. Local config: `<project_dir>/.abviz.toml`
//! 4. Environment variables: `ABVIZ_*` prefix

use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, Direction, Role, TreeFormat};

/// Raw settings for intermediate parsing. `None` means "not specified,
/// inherit from the layer below".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub direction: Option<Direction>,
    pub start_with: Option<Role>,
    pub format: Option<TreeFormat>,
    pub color: Option<bool>,
    pub default_tree: Option<PathBuf>,
}

/// Unified configuration for abviz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Pruning direction used when none is given on the command line
    pub direction: Direction,
    /// Role of the root node
    pub start_with: Role,
    /// Tree file format (auto, expr, json)
    pub format: TreeFormat,
    /// Colored terminal output
    pub color: bool,
    /// Tree evaluated when no file is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_tree: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            direction: Direction::None,
            start_with: Role::Max,
            format: TreeFormat::Auto,
            color: true,
            default_tree: None,
        }
    }
}

/// Get the XDG config directory for abviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "abviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("abviz.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".abviz.toml")
}

fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand `~`, `$VAR` and `${VAR}` in the default tree path.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.default_tree {
            let expanded = expand_env_vars(path.to_string_lossy().as_ref());
            self.default_tree = Some(PathBuf::from(expanded));
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            direction: overlay.direction.unwrap_or(self.direction),
            start_with: overlay.start_with.unwrap_or(self.start_with),
            format: overlay.format.unwrap_or(self.format),
            color: overlay.color.unwrap_or(self.color),
            default_tree: overlay
                .default_tree
                .clone()
                .or_else(|| self.default_tree.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a `.abviz.toml`
    ///
    /// A relative `default_tree` from the local config resolves against
    /// `project_dir`.
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                raw.default_tree = raw.default_tree.map(|p| {
                    let expandable = p.to_string_lossy().starts_with(['~', '$']);
                    if p.is_relative() && !expandable {
                        dir.join(p)
                    } else {
                        p
                    }
                });
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, env_source())?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply ABVIZ_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("direction") {
            settings.direction = parse_env("ABVIZ_DIRECTION", &val)?;
        }
        if let Ok(val) = config.get_string("start_with") {
            settings.start_with = parse_env("ABVIZ_START_WITH", &val)?;
        }
        if let Ok(val) = config.get_string("format") {
            settings.format = parse_env("ABVIZ_FORMAT", &val)?;
        }
        if let Ok(val) = config.get_bool("color") {
            settings.color = val;
        }
        if let Ok(val) = config.get_string("default_tree") {
            settings.default_tree = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# abviz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/abviz/abviz.toml
#   Local:  <project_dir>/.abviz.toml
#   Env:    ABVIZ_* environment variables

# Pruning direction: "none", "ltr" or "rtl"
# direction = "none"

# Role of the root node: "max" or "min"
# start_with = "max"

# Tree file format: "auto", "expr" or "json"
# format = "auto"

# Colored terminal output
# color = true

# Tree evaluated when no file is given
# default_tree = "~/trees/sample.tree"
"#
        .to_string()
    }
}

/// `ABVIZ_START_WITH` maps to `start_with`; `__` separates nested keys.
fn env_source() -> Environment {
    Environment::with_prefix("ABVIZ")
        .prefix_separator("_")
        .separator("__")
}

fn parse_env<T>(key: &str, val: &str) -> Result<T, ApplicationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    val.parse().map_err(|e| ApplicationError::Config {
        message: format!("{key}: {e}"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_max_without_pruning() {
        let settings = Settings::default();
        assert_eq!(settings.direction, Direction::None);
        assert_eq!(settings.start_with, Role::Max);
        assert_eq!(settings.format, TreeFormat::Auto);
        assert!(settings.color);
        assert!(settings.default_tree.is_none());
    }

    #[test]
    fn given_overlay_when_merging_then_only_specified_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            direction: Some(Direction::RightToLeft),
            color: Some(false),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.direction, Direction::RightToLeft);
        assert!(!merged.color);
        assert_eq!(merged.start_with, Role::Max);
        assert_eq!(merged.format, TreeFormat::Auto);
    }

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env_source().source(Some(map))
    }

    #[test]
    fn given_single_underscore_env_vars_when_applying_overrides_then_all_fields_change() {
        let env = env_with(&[
            ("ABVIZ_DIRECTION", "rtl"),
            ("ABVIZ_START_WITH", "min"),
            ("ABVIZ_FORMAT", "json"),
            ("ABVIZ_COLOR", "false"),
            ("ABVIZ_DEFAULT_TREE", "/trees/game.json"),
        ]);

        let settings = Settings::apply_env_overrides(Settings::default(), env).unwrap();

        assert_eq!(settings.direction, Direction::RightToLeft);
        assert_eq!(settings.start_with, Role::Min);
        assert_eq!(settings.format, TreeFormat::Json);
        assert!(!settings.color);
        assert_eq!(
            settings.default_tree,
            Some(PathBuf::from("/trees/game.json"))
        );
    }

    #[test]
    fn given_foreign_prefix_when_applying_overrides_then_ignored() {
        let env = env_with(&[("ABVIZDIRECTION", "rtl"), ("OTHER_DIRECTION", "ltr")]);
        let settings = Settings::apply_env_overrides(Settings::default(), env).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_bad_env_value_when_applying_overrides_then_config_error_names_variable() {
        let env = env_with(&[("ABVIZ_DIRECTION", "sideways")]);
        let err = Settings::apply_env_overrides(Settings::default(), env).unwrap_err();
        assert!(
            matches!(err, ApplicationError::Config { ref message } if message.contains("ABVIZ_DIRECTION"))
        );
    }

    #[test]
    fn given_tilde_in_default_tree_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            default_tree: Some(PathBuf::from("~/trees/a.tree")),
            ..Default::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.default_tree.unwrap();
        assert!(path.to_string_lossy().starts_with(&home));
        assert!(!path.to_string_lossy().contains('~'));
    }

    #[test]
    fn given_raw_toml_when_parsing_then_reads_lowercase_values() {
        let raw: RawSettings = toml::from_str(
            r#"
direction = "ltr"
start_with = "min"
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(raw.direction, Some(Direction::LeftToRight));
        assert_eq!(raw.start_with, Some(Role::Min));
        assert_eq!(raw.format, Some(TreeFormat::Json));
        assert_eq!(raw.color, None);
    }

    #[test]
    fn given_unknown_key_when_parsing_then_fails() {
        let raw: Result<RawSettings, _> = toml::from_str("depth = 3\n");
        assert!(raw.is_err());
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips_through_raw() {
        let settings = Settings {
            direction: Direction::LeftToRight,
            start_with: Role::Min,
            ..Default::default()
        };
        let text = settings.to_toml().unwrap();
        assert!(text.contains("direction = \"ltr\""));
        assert!(!text.contains("default_tree"));

        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }

    #[test]
    fn given_template_when_parsing_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.direction.is_none());
    }
}
