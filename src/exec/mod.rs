// src/exec/mod.rs

//! Task execution layer.
//!
//! Consumes `ScheduledTask`s from the runtime and performs the actual work
//! of a task invocation — pruning stale artifacts, enumerating and filtering
//! source files, invoking the class adapter — reporting back via
//! `PipelineEvent`s.

pub mod runner;

pub use runner::{ExecContext, ScheduledTask, spawn_executor};
