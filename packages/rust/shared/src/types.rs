//! Domain types shared between the emitter, the pipeline and the CLI.

use serde::{Deserialize, Serialize};

/// JOSM tagging-preset schema namespace written on the document root.
pub const PRESET_NAMESPACE: &str = "http://josm.openstreetmap.de/tagging-preset-1.0";

/// Environment variable the release workflow exposes the version in.
pub const VERSION_ENV: &str = "GITHUB_REF_NAME";

// ---------------------------------------------------------------------------
// ItemStyle
// ---------------------------------------------------------------------------

/// How known-species items expose their taxon fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStyle {
    /// Species, taxon and cultivar values are fixed keys; cultivar names are
    /// wrapped in curly quotes.
    #[default]
    Fixed,
    /// Values are editable text fields with defaults; cultivar names carry a
    /// parenthetical marker.
    Editable,
}

impl std::fmt::Display for ItemStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Editable => write!(f, "editable"),
        }
    }
}

impl std::str::FromStr for ItemStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "editable" => Ok(Self::Editable),
            other => Err(format!(
                "unknown item style '{other}': expected 'fixed' or 'editable'"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// TableSource
// ---------------------------------------------------------------------------

/// One input table and the top-level group its presets are placed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSource {
    /// Display name of the top-level group.
    pub group: String,
    /// Path to the CSV file.
    pub path: String,
}
