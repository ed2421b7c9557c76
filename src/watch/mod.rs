// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Compiling per-class glob subscriptions (`patterns`).
//! - Wiring up a cross-platform filesystem watcher (`watcher`) that turns
//!   change events into task-level triggers.
//!
//! It does **not** know how tasks run; it only decides which task a changed
//! path belongs to.

pub mod patterns;
pub mod watcher;

pub use patterns::{ClassWatchProfile, build_profiles, compile_matcher};
pub use watcher::{WatcherHandle, spawn_watcher};
