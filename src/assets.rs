// src/assets.rs

//! Asset class model.
//!
//! An [`AssetClass`] binds one category of source files (markup, styles,
//! scripts, fonts, icons, images) to a source root, a destination root and a
//! glob pattern, plus the sync behaviour for that category: whether stale
//! destination entries are pruned before a rebuild, how up-to-date files are
//! detected, and which filesystem change kinds re-trigger the class in watch
//! mode. The set of classes is built once from the validated config and is
//! immutable afterwards.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::model::ConfigFile;
use crate::sync::changed::Comparison;

/// Identity of a pipeline task. One task per asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Markup,
    Styles,
    Scripts,
    Fonts,
    Icons,
    Images,
}

impl AssetKind {
    /// All classes, in the order the composite refresh triggers them.
    pub const ALL: [AssetKind; 6] = [
        AssetKind::Markup,
        AssetKind::Styles,
        AssetKind::Scripts,
        AssetKind::Fonts,
        AssetKind::Icons,
        AssetKind::Images,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Markup => "markup",
            AssetKind::Styles => "styles",
            AssetKind::Scripts => "scripts",
            AssetKind::Fonts => "fonts",
            AssetKind::Icons => "icons",
            AssetKind::Images => "images",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markup" | "html" => Ok(AssetKind::Markup),
            "styles" => Ok(AssetKind::Styles),
            "scripts" => Ok(AssetKind::Scripts),
            "fonts" => Ok(AssetKind::Fonts),
            "icons" => Ok(AssetKind::Icons),
            "images" => Ok(AssetKind::Images),
            other => Err(format!(
                "unknown task: {other} (expected one of markup, styles, scripts, fonts, icons, images)"
            )),
        }
    }
}

/// Filesystem change kinds a watch subscription can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    Created,
    Removed,
    Renamed,
}

/// Markup and scripts rebuild on content changes only; the remaining classes
/// also react to files appearing, disappearing or being renamed.
const CONTENT_ONLY: &[ChangeKind] = &[ChangeKind::Modified];
const ALL_CHANGES: &[ChangeKind] = &[
    ChangeKind::Modified,
    ChangeKind::Created,
    ChangeKind::Removed,
    ChangeKind::Renamed,
];

/// Stylesheet source dialect. The two syntaxes are mutually exclusive; the
/// selected one decides the styles source directory and glob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleDialect {
    #[default]
    Scss,
    Sass,
}

impl StyleDialect {
    pub fn extension(self) -> &'static str {
        match self {
            StyleDialect::Scss => "scss",
            StyleDialect::Sass => "sass",
        }
    }
}

impl FromStr for StyleDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scss" => Ok(StyleDialect::Scss),
            "sass" => Ok(StyleDialect::Sass),
            other => Err(format!(
                "invalid styles dialect: {other} (expected \"scss\" or \"sass\")"
            )),
        }
    }
}

/// One asset class: immutable configuration created at startup.
#[derive(Debug, Clone)]
pub struct AssetClass {
    pub kind: AssetKind,
    pub src_root: PathBuf,
    pub dest_root: PathBuf,
    /// File-name glob, relative to `src_root`. `*` does not cross directory
    /// boundaries, `**` does.
    pub glob: String,
    /// `Some` for classes that skip up-to-date files before invoking the
    /// adapter (fonts, icons, images).
    pub comparison: Option<Comparison>,
    /// Whether stale destination entries are pruned before a rebuild.
    pub prune: bool,
    /// Change kinds that re-trigger this class in watch mode.
    pub change_kinds: &'static [ChangeKind],
}

/// Build the full class set from a validated config.
///
/// The layout mirrors the conventional front-end tree: markup at the source
/// root itself, styles under the dialect directory compiling into `css/`,
/// scripts under `js/`, and fonts/icons/img copied subtree-for-subtree.
pub fn classes_from_config(cfg: &ConfigFile) -> Vec<AssetClass> {
    let src = PathBuf::from(&cfg.project.source);
    let dest = PathBuf::from(&cfg.project.dest);

    let dialect = cfg.styles.effective_dialect();
    let ext = dialect.extension();

    vec![
        AssetClass {
            kind: AssetKind::Markup,
            src_root: src.clone(),
            dest_root: dest.clone(),
            glob: "*.html".to_string(),
            comparison: None,
            prune: false,
            change_kinds: CONTENT_ONLY,
        },
        AssetClass {
            kind: AssetKind::Styles,
            src_root: src.join(ext),
            dest_root: dest.join("css"),
            glob: format!("**/*.{ext}"),
            comparison: None,
            prune: false,
            change_kinds: ALL_CHANGES,
        },
        AssetClass {
            kind: AssetKind::Scripts,
            src_root: src.join("js"),
            dest_root: dest.join("js"),
            glob: "**/*.js".to_string(),
            comparison: None,
            prune: false,
            change_kinds: CONTENT_ONLY,
        },
        AssetClass {
            kind: AssetKind::Fonts,
            src_root: src.join("fonts"),
            dest_root: dest.join("fonts"),
            glob: "**/*".to_string(),
            comparison: Some(cfg.fonts.effective_comparison()),
            prune: true,
            change_kinds: ALL_CHANGES,
        },
        AssetClass {
            kind: AssetKind::Icons,
            src_root: src.join("icons"),
            dest_root: dest.join("icons"),
            glob: "**/*".to_string(),
            comparison: Some(cfg.icons.effective_comparison()),
            prune: true,
            change_kinds: ALL_CHANGES,
        },
        AssetClass {
            kind: AssetKind::Images,
            src_root: src.join("img"),
            dest_root: dest.join("img"),
            glob: "**/*".to_string(),
            comparison: Some(cfg.images.effective_comparison()),
            prune: true,
            change_kinds: ALL_CHANGES,
        },
    ]
}
