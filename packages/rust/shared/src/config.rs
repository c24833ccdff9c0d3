//! Application configuration for plantpresets.
//!
//! Project config lives at `plantpresets.toml` next to the input tables.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PresetsError, Result};
use crate::types::{ItemStyle, TableSource};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "plantpresets.toml";

// ---------------------------------------------------------------------------
// Config structs (matching plantpresets.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Preset document settings.
    #[serde(default)]
    pub presets: PresetsConfig,

    /// Packaging step.
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Input tables, emitted in this order.
    #[serde(default = "default_tables")]
    pub tables: Vec<TableSource>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            presets: PresetsConfig::default(),
            archive: ArchiveConfig::default(),
            tables: default_tables(),
        }
    }
}

fn default_tables() -> Vec<TableSource> {
    vec![TableSource {
        group: "樹木".into(),
        path: "trees.csv".into(),
    }]
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the preset file is written to; this whole directory is archived.
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,

    /// File name of the preset document inside `dist_dir`.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Archive base name; `.zip` is appended and the archive is placed beside `dist_dir`.
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dist_dir: default_dist_dir(),
            file_name: default_file_name(),
            archive_name: default_archive_name(),
        }
    }
}

fn default_dist_dir() -> String {
    "dist".into()
}
fn default_file_name() -> String {
    "presets.xml".into()
}
fn default_archive_name() -> String {
    "presets".into()
}

/// `[presets]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetsConfig {
    /// Locale code written as `baselanguage` and used for localized keys.
    #[serde(default = "default_base_language")]
    pub base_language: String,

    /// Field policy for known-species items.
    #[serde(default)]
    pub style: ItemStyle,

    /// Prefix of the "any species of this genus" item name.
    #[serde(default = "default_wildcard_prefix")]
    pub wildcard_prefix: String,

    /// Parenthetical marker appended to cultivar item names in the editable style.
    #[serde(default = "default_cultivar_marker")]
    pub cultivar_marker: String,
}

impl Default for PresetsConfig {
    fn default() -> Self {
        Self {
            base_language: default_base_language(),
            style: ItemStyle::default(),
            wildcard_prefix: default_wildcard_prefix(),
            cultivar_marker: default_cultivar_marker(),
        }
    }
}

fn default_base_language() -> String {
    "ja".into()
}
fn default_wildcard_prefix() -> String {
    "*".into()
}
fn default_cultivar_marker() -> String {
    "栽培品種".into()
}

/// `[archive]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Whether to package the output directory after writing.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Archiver executable, invoked as `<command> -r <archive> .`.
    #[serde(default = "default_archive_command")]
    pub command: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_archive_command(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_archive_command() -> String {
    "zip".into()
}

impl AppConfig {
    /// Reject configs that cannot produce a document.
    pub fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            return Err(PresetsError::config("at least one [[tables]] entry is required"));
        }
        if self.presets.base_language.trim().is_empty() {
            return Err(PresetsError::config("presets.base_language must not be empty"));
        }
        if self.output.file_name.trim().is_empty() || self.output.archive_name.trim().is_empty() {
            return Err(PresetsError::config(
                "output.file_name and output.archive_name must not be empty",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Resolve a possibly relative config path against the project directory.
pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Load `plantpresets.toml` from a project directory. Returns defaults if the file does not exist.
pub fn load_config(project_dir: &Path) -> Result<AppConfig> {
    let path = project_dir.join(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PresetsError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        PresetsError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Write a default config file into `project_dir`.
/// Returns the path to the created file. An existing file is left untouched.
pub fn init_config(project_dir: &Path) -> Result<PathBuf> {
    init_config_at(&project_dir.join(CONFIG_FILE_NAME))
}

/// Write a default config file at an explicit path.
pub fn init_config_at(path: &Path) -> Result<PathBuf> {
    let path = path.to_path_buf();
    if path.exists() {
        return Err(PresetsError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| PresetsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PresetsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("dist_dir"));
        assert!(toml_str.contains("trees.csv"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.presets.base_language, "ja");
        assert_eq!(parsed.presets.style, ItemStyle::Fixed);
        assert_eq!(parsed.tables, default_tables());
    }

    #[test]
    fn config_with_tables() {
        let toml_str = r#"
[presets]
style = "editable"

[archive]
enabled = false

[[tables]]
group = "Shrubs"
path = "data/shrubs.csv"

[[tables]]
group = "Trees"
path = "/srv/trees.csv"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.tables.len(), 2);
        assert_eq!(config.tables[0].group, "Shrubs");
        assert_eq!(config.presets.style, ItemStyle::Editable);
        assert!(!config.archive.enabled);
        assert_eq!(config.archive.command, "zip");
        assert_eq!(config.output.file_name, "presets.xml");
    }

    #[test]
    fn empty_tables_rejected() {
        let config: AppConfig = toml::from_str("tables = []").expect("parse");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("[[tables]]"));
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let base = Path::new("/project");
        assert_eq!(resolve_path(base, "trees.csv"), PathBuf::from("/project/trees.csv"));
        assert_eq!(resolve_path(base, "/data/x.csv"), PathBuf::from("/data/x.csv"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(dir.path()).expect("load");
        assert_eq!(config.output.dist_dir, "dist");
    }

    #[test]
    fn init_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = init_config(dir.path()).expect("init");
        assert!(path.exists());
        let config = load_config(dir.path()).expect("load");
        assert_eq!(config.presets.cultivar_marker, "栽培品種");
        assert!(init_config(dir.path()).is_err());
    }

    #[test]
    fn init_at_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("presets.toml");
        assert_eq!(init_config_at(&path).expect("init"), path);
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.output.file_name, "presets.xml");
        assert!(!dir.path().join(CONFIG_FILE_NAME).exists());
        assert!(init_config_at(&path).is_err());
    }
}
