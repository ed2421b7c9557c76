// src/config/model.rs

use serde::Deserialize;

use crate::assets::StyleDialect;
use crate::sync::changed::Comparison;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [project]
/// source = "src"
/// dest = "dist"
///
/// [server]
/// port = 3000
///
/// [styles]
/// dialect = "scss"
///
/// [scripts]
/// entry = "main.js"
/// minify = false
///
/// [images]
/// compare = "hash"
/// ```
///
/// All sections are optional and have reasonable defaults. Configuration is
/// read once at startup and never reloaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub styles: StylesSection,

    #[serde(default)]
    pub scripts: ScriptsSection,

    /// Per-class change-detection settings for the copied asset classes.
    #[serde(default)]
    pub fonts: StaticSection,
    #[serde(default)]
    pub icons: StaticSection,
    #[serde(default)]
    pub images: StaticSection,
}

/// `[project]` section: the source and destination roots.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default = "default_dest")]
    pub dest: String,
}

fn default_source() -> String {
    "src".to_string()
}

fn default_dest() -> String {
    "dist".to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            dest: default_dest(),
        }
    }
}

/// `[server]` section.
///
/// The static file server binds the configured port; the reload control
/// channel binds the next port up.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// `[styles]` section.
///
/// `dialect` selects one of the two stylesheet syntaxes; it decides both the
/// source directory name and the file extension the class compiles.
#[derive(Debug, Clone, Deserialize)]
pub struct StylesSection {
    #[serde(default = "default_dialect")]
    pub dialect: String,
}

fn default_dialect() -> String {
    "scss".to_string()
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
        }
    }
}

impl StylesSection {
    /// Effective dialect; validation guarantees the string parses.
    pub fn effective_dialect(&self) -> StyleDialect {
        self.dialect.parse().unwrap_or_default()
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptsSection {
    /// Bundle entry file name, relative to the scripts source root.
    #[serde(default = "default_entry")]
    pub entry: String,

    /// Strip comments and blank lines from the bundle (production builds).
    #[serde(default)]
    pub minify: bool,
}

fn default_entry() -> String {
    "main.js".to_string()
}

impl Default for ScriptsSection {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            minify: false,
        }
    }
}

/// Shared shape of the `[fonts]`, `[icons]` and `[images]` sections.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticSection {
    /// `"mtime"` (default) or `"hash"`: how the change detector decides
    /// whether a destination file is up to date.
    #[serde(default = "default_compare")]
    pub compare: String,
}

fn default_compare() -> String {
    "mtime".to_string()
}

impl Default for StaticSection {
    fn default() -> Self {
        Self {
            compare: default_compare(),
        }
    }
}

impl StaticSection {
    /// Effective comparison mode; validation guarantees the string parses.
    pub fn effective_comparison(&self) -> Comparison {
        self.compare.parse().unwrap_or_default()
    }
}
