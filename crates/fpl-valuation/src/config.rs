// Configuration loading and parsing (valuation.toml).

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the single configuration file under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "valuation.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub seasons: SeasonConfig,
    pub gameweek: GameweekConfig,
    pub data: DataPaths,
}

// ---------------------------------------------------------------------------
// valuation.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire valuation.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ValuationFile {
    seasons: SeasonConfig,
    #[serde(default)]
    gameweek: GameweekConfig,
    data: DataPaths,
}

/// Season labels known to the pipeline. `all` lists every season a player
/// record may carry; `current` must be one of them.
#[derive(Debug, Clone, Deserialize)]
pub struct SeasonConfig {
    pub current: String,
    pub all: Vec<String>,
    /// Gameweeks in a completed season, used to prorate past-season minutes.
    #[serde(default = "default_past_season_gameweeks")]
    pub past_season_gameweeks: u32,
}

fn default_past_season_gameweeks() -> u32 {
    38
}

/// How the next unplayed gameweek is determined. An explicit `next` wins;
/// otherwise the deadlines in `calendar` are consulted at run time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameweekConfig {
    #[serde(default)]
    pub next: Option<u32>,
    #[serde(default)]
    pub calendar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Directory holding the filtered inputs; outputs are written alongside.
    pub dir: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/valuation.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Parse (without validating) the contents of a valuation.toml file.
fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    let file: ValuationFile = toml::from_str(text)?;
    Ok(Config {
        seasons: file.seasons,
        gameweek: file.gameweek,
        data: file.data,
    })
}

/// Copy `defaults/valuation.toml` into `config/` when no config file exists
/// yet. Returns the path written, or `None` when the existing file was kept.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither config/{CONFIG_FILE} nor defaults/{CONFIG_FILE} found in {}; \
                 run from the crate root or ensure defaults/ is present",
                base_dir.display()
            ),
        });
    }

    if let Some(config_dir) = target.parent() {
        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create config directory: {e}"),
        })?;
    }
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    })?;

    Ok(Some(target))
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Copies the default config first if none exists yet.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if let Some(copied) = ensure_config_file(&cwd)? {
        tracing::info!("Copied default config to {}", copied.display());
    }
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let seasons = &config.seasons;

    if seasons.all.is_empty() {
        return Err(invalid("seasons.all", "must list at least one season"));
    }

    let mut seen = HashSet::new();
    for label in &seasons.all {
        if label.trim().is_empty() {
            return Err(invalid("seasons.all", "season labels must not be blank"));
        }
        if !seen.insert(label.as_str()) {
            return Err(invalid("seasons.all", format!("duplicate season `{label}`")));
        }
    }

    if !seen.contains(seasons.current.as_str()) {
        return Err(invalid(
            "seasons.current",
            format!("`{}` is not listed in seasons.all", seasons.current),
        ));
    }

    if seasons.past_season_gameweeks == 0 {
        return Err(invalid("seasons.past_season_gameweeks", "must be greater than 0"));
    }

    match (&config.gameweek.next, &config.gameweek.calendar) {
        (Some(0), _) => return Err(invalid("gameweek.next", "must be at least 1")),
        (None, None) => {
            return Err(invalid(
                "gameweek",
                "either `next` or `calendar` must be set",
            ))
        }
        _ => {}
    }

    if config.data.dir.trim().is_empty() {
        return Err(invalid("data.dir", "must not be empty"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    /// Helper: returns the path to the crate root
    /// (works whether `cargo test` runs from the crate root or repo root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/fpl-valuation/defaults").exists() {
            cwd.join("crates/fpl-valuation")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Fresh temp dir with a `config/valuation.toml` holding `contents`.
    fn write_temp_config(name: &str, contents: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), contents).unwrap();
        tmp
    }

    fn default_text() -> String {
        fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE)).unwrap()
    }

    fn expect_validation_field(tmp: &Path, expected: &str) {
        let err = load_config_from(tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = write_temp_config("fpl_config_test_defaults", &default_text());
        let config = load_config_from(&tmp).expect("should load default config");

        assert_eq!(config.seasons.current, "2024/25");
        assert_eq!(config.seasons.all, vec!["2024/25", "2023/24", "2022/23"]);
        assert_eq!(config.seasons.past_season_gameweeks, 38);
        assert_eq!(config.gameweek.next, None);
        assert_eq!(
            config.gameweek.calendar.as_deref(),
            Some("data/original/gameweeks.json")
        );
        assert_eq!(config.data.dir, "data");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn past_season_gameweeks_defaults_to_38() {
        let tmp = write_temp_config(
            "fpl_config_test_season_len_default",
            r#"
[seasons]
current = "2024/25"
all = ["2024/25"]

[gameweek]
next = 3

[data]
dir = "data"
"#,
        );
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.seasons.past_season_gameweeks, 38);
        assert_eq!(config.gameweek.next, Some(3));
        assert!(config.gameweek.calendar.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_current_season_not_listed() {
        let modified = default_text().replace(r#"current = "2024/25""#, r#"current = "2030/31""#);
        let tmp = write_temp_config("fpl_config_test_current_missing", &modified);
        expect_validation_field(&tmp, "seasons.current");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_duplicate_seasons() {
        let modified = default_text().replace(r#""2022/23""#, r#""2023/24""#);
        let tmp = write_temp_config("fpl_config_test_duplicate_season", &modified);
        expect_validation_field(&tmp, "seasons.all");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_season_length() {
        let modified = default_text().replace(
            "past_season_gameweeks = 38",
            "past_season_gameweeks = 0",
        );
        let tmp = write_temp_config("fpl_config_test_zero_season_len", &modified);
        expect_validation_field(&tmp, "seasons.past_season_gameweeks");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_gameweek_without_source() {
        let tmp = write_temp_config(
            "fpl_config_test_no_gameweek_source",
            r#"
[seasons]
current = "2024/25"
all = ["2024/25"]

[data]
dir = "data"
"#,
        );
        expect_validation_field(&tmp, "gameweek");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_gameweek_zero() {
        let tmp = write_temp_config(
            "fpl_config_test_gameweek_zero",
            r#"
[seasons]
current = "2024/25"
all = ["2024/25"]

[gameweek]
next = 0

[data]
dir = "data"
"#,
        );
        expect_validation_field(&tmp, "gameweek.next");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = std::env::temp_dir().join("fpl_config_test_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = write_temp_config("fpl_config_test_invalid_toml", "this is not valid [[[ toml");
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_copies_default_when_missing() {
        let tmp = std::env::temp_dir().join("fpl_config_test_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), default_text()).unwrap();

        assert!(!tmp.join("config").exists());

        let copied = ensure_config_file(&tmp).expect("should succeed");
        assert_eq!(copied, Some(tmp.join("config").join(CONFIG_FILE)));
        let content = fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, default_text());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_keeps_existing() {
        let tmp = std::env::temp_dir().join("fpl_config_test_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), default_text()).unwrap();
        fs::write(config_dir.join(CONFIG_FILE), "# custom\n").unwrap();

        assert_eq!(ensure_config_file(&tmp).expect("should succeed"), None);

        let content = fs::read_to_string(config_dir.join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_without_defaults_keeps_existing_config() {
        let tmp = write_temp_config("fpl_config_test_no_defaults", "# custom\n");
        assert_eq!(ensure_config_file(&tmp).expect("should succeed"), None);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_errors_when_both_missing() {
        let tmp = std::env::temp_dir().join("fpl_config_test_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_file(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("defaults/valuation.toml"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        assert!(!tmp.join("config").exists());

        let _ = fs::remove_dir_all(&tmp);
    }
}
