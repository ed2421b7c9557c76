// src/engine/mod.rs

//! Orchestration engine for assetpipe.
//!
//! This module ties together:
//! - the runtime event loop that reacts to file-watch triggers, task
//!   completion events and shutdown signals
//! - the per-class rerun queue (what happens when triggers arrive while the
//!   class task is already running)
//! - reload notification after successful tasks in watch mode

pub mod pending;
pub mod runtime;

pub use pending::PendingReruns;
pub use runtime::{
    PipelineEvent, RunSummary, Runtime, RuntimeOptions, TaskOutcome, TriggerReason,
};
