// src/sync/walk.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Recursively collect all regular files under `root`, sorted for stable
/// ordering. Fails if `root` cannot be read (e.g. a missing source root),
/// which callers treat as fatal to the affected task only.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading directory {:?}", dir))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {:?}", dir))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspecting {:?}", path))?;

        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
        // Symlinks and other special entries are skipped.
    }

    Ok(())
}
