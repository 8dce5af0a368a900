use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::vim::command::EditorCommand;

const DEFAULT_CONFIG: &str = r#"# damai configuration

[cursor]
# Width of the insertion bar (edit mode, end of line).
thin_width = 3.0
# Caret height as a multiple of the computed font size.
line_height_factor = 1.2
# Height used before the first measurement.
initial_height = 24.0

[motion]
# Probes per pass when looking for the adjacent line.
search_limit = 5
# Scroll-and-retry passes after the first pass misses.
scroll_retries = 3
vertical_epsilon = 1.0
horizontal_epsilon = 20.0

[layout]
font_size = 16.0
line_height = 28.0
char_width = 9.6
wrap_columns = 72
padding = 16.0
viewport_width = 800.0
viewport_height = 600.0
history_limit = 200

[view]
# Delay before re-measuring the editor container after a sidebar toggle.
sidebar_transition_ms = 100

[keys]
# "D" = "delete-line"
"#;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub cursor: CursorConfig,
    pub motion: MotionConfig,
    pub layout: LayoutConfig,
    pub view: ViewConfig,
    pub keys: KeysConfig,
}

/// Custom cursor rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorConfig {
    pub thin_width: f64,
    pub line_height_factor: f64,
    pub initial_height: f64,
}

/// Vertical caret motion search bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    pub search_limit: usize,
    pub scroll_retries: usize,
    pub vertical_epsilon: f64,
    pub horizontal_epsilon: f64,
}

/// Metrics for the headless text layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub font_size: f64,
    pub line_height: f64,
    pub char_width: f64,
    pub wrap_columns: usize,
    pub padding: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub history_limit: usize,
}

/// Host view timings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub sidebar_transition_ms: u64,
}

/// Keybinding configuration: key patterns mapped to command names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeysConfig {
    pub bindings: HashMap<String, String>,
}

/// Errors that can occur during config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
}

// ── Serde intermediate structs ──────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    cursor: RawCursorConfig,
    motion: RawMotionConfig,
    layout: RawLayoutConfig,
    view: RawViewConfig,
    keys: RawKeysConfig,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawCursorConfig {
    thin_width: f64,
    line_height_factor: f64,
    initial_height: f64,
}

impl Default for RawCursorConfig {
    fn default() -> Self {
        let d = CursorConfig::default();
        Self {
            thin_width: d.thin_width,
            line_height_factor: d.line_height_factor,
            initial_height: d.initial_height,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawMotionConfig {
    search_limit: usize,
    scroll_retries: usize,
    vertical_epsilon: f64,
    horizontal_epsilon: f64,
}

impl Default for RawMotionConfig {
    fn default() -> Self {
        let d = MotionConfig::default();
        Self {
            search_limit: d.search_limit,
            scroll_retries: d.scroll_retries,
            vertical_epsilon: d.vertical_epsilon,
            horizontal_epsilon: d.horizontal_epsilon,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawLayoutConfig {
    font_size: f64,
    line_height: f64,
    char_width: f64,
    wrap_columns: usize,
    padding: f64,
    viewport_width: f64,
    viewport_height: f64,
    history_limit: usize,
}

impl Default for RawLayoutConfig {
    fn default() -> Self {
        let d = LayoutConfig::default();
        Self {
            font_size: d.font_size,
            line_height: d.line_height,
            char_width: d.char_width,
            wrap_columns: d.wrap_columns,
            padding: d.padding,
            viewport_width: d.viewport_width,
            viewport_height: d.viewport_height,
            history_limit: d.history_limit,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawViewConfig {
    sidebar_transition_ms: u64,
}

impl Default for RawViewConfig {
    fn default() -> Self {
        Self {
            sidebar_transition_ms: ViewConfig::default().sidebar_transition_ms,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawKeysConfig {
    #[serde(flatten)]
    bindings: HashMap<String, String>,
}

// ── Default impls ───────────────────────────────────────────────────────

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            thin_width: 3.0,
            line_height_factor: 1.2,
            initial_height: 24.0,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            search_limit: 5,
            scroll_retries: 3,
            vertical_epsilon: 1.0,
            horizontal_epsilon: 20.0,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 28.0,
            char_width: 9.6,
            wrap_columns: 72,
            padding: 16.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            history_limit: 200,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            sidebar_transition_ms: 100,
        }
    }
}

// ── Config implementation ───────────────────────────────────────────────

impl Config {
    /// Load config from a TOML file path. Returns defaults if file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Parse a TOML string into a Config.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let config = Self {
            cursor: CursorConfig {
                thin_width: raw.cursor.thin_width,
                line_height_factor: raw.cursor.line_height_factor,
                initial_height: raw.cursor.initial_height,
            },
            motion: MotionConfig {
                search_limit: raw.motion.search_limit,
                scroll_retries: raw.motion.scroll_retries,
                vertical_epsilon: raw.motion.vertical_epsilon,
                horizontal_epsilon: raw.motion.horizontal_epsilon,
            },
            layout: LayoutConfig {
                font_size: raw.layout.font_size,
                line_height: raw.layout.line_height,
                char_width: raw.layout.char_width,
                wrap_columns: raw.layout.wrap_columns,
                padding: raw.layout.padding,
                viewport_width: raw.layout.viewport_width,
                viewport_height: raw.layout.viewport_height,
                history_limit: raw.layout.history_limit,
            },
            view: ViewConfig {
                sidebar_transition_ms: raw.view.sidebar_transition_ms,
            },
            keys: KeysConfig {
                bindings: raw.keys.bindings,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// The commented default configuration file.
    pub fn print_default() -> &'static str {
        DEFAULT_CONFIG
    }

    /// Validate the config, returning an error if any values are out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("cursor.thin_width", self.cursor.thin_width),
            ("cursor.line_height_factor", self.cursor.line_height_factor),
            ("cursor.initial_height", self.cursor.initial_height),
            ("layout.font_size", self.layout.font_size),
            ("layout.line_height", self.layout.line_height),
            ("layout.char_width", self.layout.char_width),
            ("layout.viewport_width", self.layout.viewport_width),
            ("layout.viewport_height", self.layout.viewport_height),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::Validation(format!("{name} must be > 0")));
            }
        }

        if self.motion.search_limit == 0 {
            return Err(ConfigError::Validation(
                "motion.search_limit must be > 0".to_string(),
            ));
        }

        if self.motion.vertical_epsilon < 0.0 || self.motion.horizontal_epsilon < 0.0 {
            return Err(ConfigError::Validation(
                "motion epsilons must be >= 0".to_string(),
            ));
        }

        if self.layout.padding < 0.0 {
            return Err(ConfigError::Validation(
                "layout.padding must be >= 0".to_string(),
            ));
        }

        if self.layout.wrap_columns == 0 {
            return Err(ConfigError::Validation(
                "layout.wrap_columns must be > 0".to_string(),
            ));
        }

        for (pattern, name) in &self.keys.bindings {
            if pattern.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "empty key pattern bound to '{name}'"
                )));
            }
            if EditorCommand::from_name(name).is_none() {
                return Err(ConfigError::Validation(format!(
                    "unknown command '{name}' bound to '{pattern}', valid commands: {}",
                    EditorCommand::NAMES.join(", ")
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ── Default tests ───────────────────────────────────────────────

    #[test]
    fn default_cursor_thin_width() {
        let config = Config::default();
        assert_eq!(config.cursor.thin_width, 3.0);
    }

    #[test]
    fn default_line_height_factor() {
        let config = Config::default();
        assert_eq!(config.cursor.line_height_factor, 1.2);
    }

    #[test]
    fn default_motion_bounds() {
        let config = Config::default();
        assert_eq!(config.motion.search_limit, 5);
        assert_eq!(config.motion.scroll_retries, 3);
        assert_eq!(config.motion.vertical_epsilon, 1.0);
        assert_eq!(config.motion.horizontal_epsilon, 20.0);
    }

    #[test]
    fn default_sidebar_transition() {
        let config = Config::default();
        assert_eq!(config.view.sidebar_transition_ms, 100);
    }

    #[test]
    fn default_keys_empty() {
        let config = Config::default();
        assert!(config.keys.bindings.is_empty());
    }

    #[test]
    fn printed_default_parses_to_default() {
        let config = Config::from_toml(Config::print_default()).unwrap();
        assert_eq!(config, Config::default());
    }

    // ── TOML parsing tests ──────────────────────────────────────────

    #[test]
    fn parse_complete_toml() {
        let toml = r#"
[cursor]
thin_width = 2.0
line_height_factor = 1.5
initial_height = 20.0

[motion]
search_limit = 8
scroll_retries = 1
vertical_epsilon = 0.5
horizontal_epsilon = 12.0

[layout]
font_size = 14.0
line_height = 20.0
char_width = 8.0
wrap_columns = 40
padding = 0.0
viewport_width = 640.0
viewport_height = 480.0
history_limit = 10

[view]
sidebar_transition_ms = 250

[keys]
"D" = "delete-line"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.cursor.thin_width, 2.0);
        assert_eq!(config.cursor.line_height_factor, 1.5);
        assert_eq!(config.motion.search_limit, 8);
        assert_eq!(config.motion.scroll_retries, 1);
        assert_eq!(config.layout.wrap_columns, 40);
        assert_eq!(config.layout.padding, 0.0);
        assert_eq!(config.layout.history_limit, 10);
        assert_eq!(config.view.sidebar_transition_ms, 250);
        assert_eq!(config.keys.bindings.get("D").unwrap(), "delete-line");
    }

    #[test]
    fn parse_partial_toml_uses_defaults() {
        let toml = r#"
[motion]
search_limit = 3
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.motion.search_limit, 3);
        assert_eq!(config.motion.scroll_retries, 3);
        assert_eq!(config.cursor, CursorConfig::default());
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn parse_empty_toml_uses_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_unknown_keys_ignored() {
        let toml = r#"
[cursor]
thin_width = 3.0
unknown_key = "value"

[unknown_section]
foo = "bar"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.cursor.thin_width, 3.0);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let result = Config::from_toml("[cursor\nthin_width = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    // ── Validation tests ────────────────────────────────────────────

    #[test]
    fn invalid_zero_thin_width() {
        let toml = r#"
[cursor]
thin_width = 0.0
"#;
        assert!(matches!(
            Config::from_toml(toml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn invalid_negative_line_height() {
        let toml = r#"
[layout]
line_height = -4.0
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn invalid_zero_search_limit() {
        let toml = r#"
[motion]
search_limit = 0
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn zero_scroll_retries_is_allowed() {
        let toml = r#"
[motion]
scroll_retries = 0
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.motion.scroll_retries, 0);
    }

    #[test]
    fn invalid_zero_wrap_columns() {
        let toml = r#"
[layout]
wrap_columns = 0
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn invalid_unknown_command_binding() {
        let toml = r#"
[keys]
"q" = "quit-everything"
"#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(format!("{err}").contains("quit-everything"));
    }

    #[test]
    fn invalid_empty_key_pattern() {
        let toml = r#"
[keys]
"" = "undo"
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    // ── File loading tests ──────────────────────────────────────────

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        {
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(b"[cursor]\nthin_width = 4.0\n").unwrap();
        }
        let config = Config::load(&path).unwrap();
        assert_eq!(config.cursor.thin_width, 4.0);
        assert_eq!(config.motion, MotionConfig::default());
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    // ── ConfigError display test ────────────────────────────────────

    #[test]
    fn config_error_display() {
        let err = ConfigError::Validation("layout.font_size must be > 0".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("layout.font_size must be > 0"));
    }
}
