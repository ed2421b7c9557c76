// src/sync/prune.rs

//! Stale-artifact pruning.
//!
//! The transformations themselves only ever write; deletions in the source
//! tree would otherwise accumulate as orphans in the output tree. Before a
//! copied class rebuilds, the pruner diffs its destination subtree against
//! its source subtree and removes destination entries that no longer have a
//! source counterpart.
//!
//! Entries are paired by path relative to the compared roots. Deletion is
//! best-effort: a failure to remove one entry is logged and the pass
//! continues — a leftover stale file is preferable to aborting the build.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Node kind of a compared tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// Presence classification of one source/destination path pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Both,
    MissingFromSource,
    MissingFromDest,
}

/// One path pair produced while comparing a source subtree to a destination
/// subtree. Transient: produced for one pass, never persisted.
#[derive(Debug, Clone)]
pub struct DiffEntry {
    /// Path relative to the compared roots.
    pub rel: PathBuf,
    pub kind: NodeKind,
    pub presence: Presence,
}

/// Outcome of one pruning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed_files: usize,
    pub removed_dirs: usize,
    pub failures: usize,
}

/// Recursively enumerate both trees and classify every node, in pre-order
/// (a directory entry precedes the entries beneath it).
///
/// A destination node whose source counterpart exists but has a different
/// kind counts as missing from source: the stale node must go so the adapter
/// can recreate the path with the right kind.
pub fn compare_trees(src_root: &Path, dest_root: &Path) -> Result<Vec<DiffEntry>> {
    let mut entries = Vec::new();
    visit(Some(src_root), Some(dest_root), Path::new(""), &mut entries)?;
    Ok(entries)
}

fn visit(
    src_dir: Option<&Path>,
    dest_dir: Option<&Path>,
    rel: &Path,
    out: &mut Vec<DiffEntry>,
) -> Result<()> {
    let src_names = match src_dir {
        Some(dir) => read_names(dir)?,
        None => BTreeSet::new(),
    };
    let dest_names = match dest_dir {
        Some(dir) => read_names(dir)?,
        None => BTreeSet::new(),
    };

    for name in src_names.union(&dest_names) {
        let child_rel = rel.join(name);
        let src_path = src_dir.map(|d| d.join(name)).filter(|p| p.exists());
        let dest_path = dest_dir.map(|d| d.join(name)).filter(|p| p.exists());

        let src_kind = src_path.as_deref().map(node_kind);
        let dest_kind = dest_path.as_deref().map(node_kind);

        match (src_kind, dest_kind) {
            (Some(sk), Some(dk)) if sk == dk => {
                out.push(DiffEntry {
                    rel: child_rel.clone(),
                    kind: dk,
                    presence: Presence::Both,
                });
                if dk == NodeKind::Directory {
                    visit(
                        src_path.as_deref(),
                        dest_path.as_deref(),
                        &child_rel,
                        out,
                    )?;
                }
            }
            (_, Some(dk)) => {
                // Destination node with no matching source node (absent, or
                // present with a different kind).
                out.push(DiffEntry {
                    rel: child_rel.clone(),
                    kind: dk,
                    presence: Presence::MissingFromSource,
                });
                if dk == NodeKind::Directory {
                    visit(None, dest_path.as_deref(), &child_rel, out)?;
                }
            }
            (Some(sk), None) => {
                out.push(DiffEntry {
                    rel: child_rel.clone(),
                    kind: sk,
                    presence: Presence::MissingFromDest,
                });
                if sk == NodeKind::Directory {
                    visit(src_path.as_deref(), None, &child_rel, out)?;
                }
            }
            (None, None) => {}
        }
    }

    Ok(())
}

fn read_names(dir: &Path) -> Result<BTreeSet<std::ffi::OsString>> {
    let mut names = BTreeSet::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading directory {:?}", dir))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {:?}", dir))?;
        names.insert(entry.file_name());
    }
    Ok(names)
}

fn node_kind(path: &Path) -> NodeKind {
    if path.is_dir() {
        NodeKind::Directory
    } else {
        NodeKind::File
    }
}

/// Remove destination entries that no longer have a source counterpart.
///
/// Directories are removed recursively; the last removed directory is
/// remembered so file entries beneath it are skipped instead of re-deleted.
/// Returns an error only when enumeration itself fails (e.g. a missing
/// source root), which is fatal to the calling task.
pub fn prune_dest(src_root: &Path, dest_root: &Path) -> Result<PruneReport> {
    let mut report = PruneReport::default();

    if !dest_root.is_dir() {
        // Nothing to prune yet.
        return Ok(report);
    }

    let entries = compare_trees(src_root, dest_root)
        .with_context(|| format!("comparing {:?} against {:?}", src_root, dest_root))?;

    let mut last_removed_dir: Option<PathBuf> = None;

    for entry in entries {
        if entry.presence != Presence::MissingFromSource {
            continue;
        }

        if let Some(removed) = &last_removed_dir {
            if entry.rel.starts_with(removed) {
                // Already gone with its parent directory.
                continue;
            }
        }

        let target = dest_root.join(&entry.rel);
        match entry.kind {
            NodeKind::Directory => match fs::remove_dir_all(&target) {
                Ok(()) => {
                    debug!(dir = ?target, "removed stale directory");
                    last_removed_dir = Some(entry.rel.clone());
                    report.removed_dirs += 1;
                }
                Err(err) => {
                    warn!(dir = ?target, error = %err, "failed to remove stale directory");
                    report.failures += 1;
                }
            },
            NodeKind::File => match fs::remove_file(&target) {
                Ok(()) => {
                    debug!(file = ?target, "removed stale file");
                    report.removed_files += 1;
                }
                Err(err) => {
                    warn!(file = ?target, error = %err, "failed to remove stale file");
                    report.failures += 1;
                }
            },
        }
    }

    Ok(report)
}
