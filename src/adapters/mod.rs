// src/adapters/mod.rs

//! Transform adapters: one per asset class.
//!
//! Each adapter takes a set of source files and produces zero or more files
//! under the class destination root. The orchestrator treats them as black
//! boxes behind the [`Transform`] trait; what "minify", "compile" or
//! "bundle" mean is the adapter's business.
//!
//! - [`markup`] collapses inter-tag whitespace in top-level HTML pages.
//! - [`styles`] inlines stylesheet partials and emits minified `.min.css`.
//! - [`scripts`] bundles the module graph from the configured entry.
//! - [`statics`] copies fonts, icons and images preserving relative paths.

pub mod markup;
pub mod scripts;
pub mod statics;
pub mod styles;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::assets::{AssetClass, AssetKind};
use crate::config::model::ConfigFile;

pub use markup::MarkupMinifier;
pub use scripts::ScriptBundler;
pub use statics::StaticCopy;
pub use styles::StyleCompiler;

/// Failure of one transformation, tied to the source file that caused it.
#[derive(Debug, Clone, Error)]
#[error("{path:?}: {message}")]
pub struct AdapterError {
    pub path: PathBuf,
    pub message: String,
}

impl AdapterError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A transformation from source files of one asset class to destination
/// files. Implementations write their outputs under `class.dest_root` and
/// return the paths they wrote.
pub trait Transform: Send + Sync {
    fn apply(&self, inputs: &[PathBuf], class: &AssetClass) -> Result<Vec<PathBuf>, AdapterError>;
}

/// The full adapter table, built once from config and shared by all task
/// invocations. Fonts, icons and images share the copy adapter.
#[derive(Clone)]
pub struct AdapterSet {
    markup: Arc<dyn Transform>,
    styles: Arc<dyn Transform>,
    scripts: Arc<dyn Transform>,
    statics: Arc<dyn Transform>,
}

impl AdapterSet {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            markup: Arc::new(MarkupMinifier),
            styles: Arc::new(StyleCompiler::new(cfg.styles.effective_dialect())),
            scripts: Arc::new(ScriptBundler::new(
                cfg.scripts.entry.clone(),
                cfg.scripts.minify,
            )),
            statics: Arc::new(StaticCopy),
        }
    }

    pub fn get(&self, kind: AssetKind) -> Arc<dyn Transform> {
        let adapter = match kind {
            AssetKind::Markup => &self.markup,
            AssetKind::Styles => &self.styles,
            AssetKind::Scripts => &self.scripts,
            AssetKind::Fonts | AssetKind::Icons | AssetKind::Images => &self.statics,
        };
        Arc::clone(adapter)
    }
}
