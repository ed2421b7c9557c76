// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::assets::{AssetClass, AssetKind, ChangeKind};

/// Compile a class glob into a matcher over paths relative to the class
/// source root. `*` does not cross directory boundaries (so `*.html` is
/// top-level only) while `**` does.
pub fn compile_matcher(pattern: &str) -> Result<GlobSet> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut builder = GlobSetBuilder::new();
    builder.add(glob);
    Ok(builder.build()?)
}

/// A watch subscription: the compiled binding between one asset class's
/// source subtree and its task, including which change kinds re-trigger it.
/// Lives for the duration of a watch session.
#[derive(Clone)]
pub struct ClassWatchProfile {
    kind: AssetKind,
    src_root: PathBuf,
    matcher: GlobSet,
    change_kinds: &'static [ChangeKind],
}

impl fmt::Debug for ClassWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassWatchProfile")
            .field("kind", &self.kind)
            .field("src_root", &self.src_root)
            .finish_non_exhaustive()
    }
}

impl ClassWatchProfile {
    /// The task this subscription triggers.
    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Returns true if a change of this kind at this absolute path should
    /// re-run the bound task.
    pub fn matches(&self, path: &Path, change: ChangeKind) -> bool {
        if !self.change_kinds.contains(&change) {
            return false;
        }
        let rel = match path.strip_prefix(&self.src_root) {
            Ok(rel) => rel,
            Err(_) => return false,
        };
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        self.matcher.is_match(rel_str)
    }
}

/// Build one compiled subscription per asset class.
pub fn build_profiles(classes: &[AssetClass]) -> Result<Vec<ClassWatchProfile>> {
    classes
        .iter()
        .map(|class| {
            let matcher = compile_matcher(&class.glob)
                .with_context(|| format!("building watch globset for task '{}'", class.kind))?;
            Ok(ClassWatchProfile {
                kind: class.kind,
                src_root: class.src_root.clone(),
                matcher,
                change_kinds: class.change_kinds,
            })
        })
        .collect()
}
