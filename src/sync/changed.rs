// src/sync/changed.rs

//! Change detection: decide whether a destination file is stale relative to
//! its source counterpart.
//!
//! Used by the high-volume copied classes (fonts, icons, images) to skip
//! re-invoking the adapter for unchanged inputs. The decision is pure; on any
//! doubt (missing destination, unreadable metadata, unmappable path) the file
//! is treated as stale so the task regenerates it rather than failing.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

/// How source and destination files are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    /// Stale when the source modification time is newer than the
    /// destination's.
    #[default]
    ModifiedTime,
    /// Stale when the file contents differ. Slower, but immune to
    /// timestamp-only changes.
    ContentHash,
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mtime" => Ok(Comparison::ModifiedTime),
            "hash" => Ok(Comparison::ContentHash),
            other => Err(format!(
                "invalid comparison mode: {other} (expected \"mtime\" or \"hash\")"
            )),
        }
    }
}

/// Destination counterpart of a source file: the same path relative to the
/// class roots. `None` if the file does not live under `src_root`.
pub fn dest_counterpart(src_file: &Path, src_root: &Path, dest_root: &Path) -> Option<PathBuf> {
    let rel = src_file.strip_prefix(src_root).ok()?;
    Some(dest_root.join(rel))
}

/// Returns whether the destination counterpart of `src_file` is missing or
/// out of date. Errors never propagate: anything unstattable is stale.
pub fn is_stale(
    src_file: &Path,
    src_root: &Path,
    dest_root: &Path,
    comparison: Comparison,
) -> bool {
    let dest = match dest_counterpart(src_file, src_root, dest_root) {
        Some(d) => d,
        None => return true,
    };

    if !dest.is_file() {
        return true;
    }

    match comparison {
        Comparison::ModifiedTime => mtime_stale(src_file, &dest),
        Comparison::ContentHash => hash_stale(src_file, &dest),
    }
}

fn mtime_stale(src: &Path, dest: &Path) -> bool {
    let src_mtime = match src.metadata().and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return true,
    };
    let dest_mtime = match dest.metadata().and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return true,
    };
    src_mtime > dest_mtime
}

fn hash_stale(src: &Path, dest: &Path) -> bool {
    match (compute_file_hash(src), compute_file_hash(dest)) {
        (Ok(a), Ok(b)) => {
            let stale = a != b;
            if !stale {
                debug!(file = ?src, "content unchanged; destination is fresh");
            }
            stale
        }
        _ => true,
    }
}

/// Hash a single file's contents.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut hasher = Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
