// src/sync/mod.rs

//! Source/destination tree synchronization.
//!
//! - [`walk`] enumerates source trees.
//! - [`changed`] decides whether a destination file is stale (the change
//!   detector).
//! - [`prune`] removes destination entries whose source counterpart is gone
//!   (the stale-artifact pruner).
//!
//! This module knows nothing about tasks or adapters; it only compares and
//! reconciles trees on disk.

pub mod changed;
pub mod prune;
pub mod walk;

pub use changed::{Comparison, compute_file_hash, dest_counterpart, is_stale};
pub use prune::{DiffEntry, NodeKind, Presence, PruneReport, compare_trees, prune_dest};
pub use walk::walk_files;
