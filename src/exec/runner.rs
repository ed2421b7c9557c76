// src/exec/runner.rs

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::GlobSet;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::adapters::AdapterSet;
use crate::assets::{AssetClass, AssetKind};
use crate::engine::{PipelineEvent, TaskOutcome};
use crate::errors::PipelineError;
use crate::sync::{is_stale, prune_dest, walk_files};
use crate::watch::compile_matcher;

/// Description of a task invocation the runtime wants executed now.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledTask {
    pub kind: AssetKind,
}

/// Everything a task invocation needs: the immutable class table and the
/// adapter table. Built once at startup and shared.
pub struct ExecContext {
    classes: HashMap<AssetKind, AssetClass>,
    adapters: AdapterSet,
}

impl ExecContext {
    pub fn new(classes: Vec<AssetClass>, adapters: AdapterSet) -> Self {
        Self {
            classes: classes.into_iter().map(|c| (c.kind, c)).collect(),
            adapters,
        }
    }

    pub fn class(&self, kind: AssetKind) -> Option<&AssetClass> {
        self.classes.get(&kind)
    }
}

/// Spawn the background executor loop.
///
/// The returned sender is what the runtime uses to dispatch tasks. Each
/// scheduled task runs in its own tokio task, so classes rebuild in
/// parallel; serialization within one class is the runtime's job.
pub fn spawn_executor(
    ctx: Arc<ExecContext>,
    events_tx: mpsc::Sender<PipelineEvent>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");
        while let Some(task) = rx.recv().await {
            let ctx = Arc::clone(&ctx);
            let events_tx = events_tx.clone();
            tokio::spawn(async move {
                run_task(task, ctx, events_tx).await;
            });
        }
        info!("executor loop finished (channel closed)");
    });

    tx
}

/// Run a single task invocation and emit a `TaskCompleted` event.
///
/// All errors are converted into a failed outcome after logging the
/// originating file and detail; a task failure never crashes the process.
async fn run_task(
    task: ScheduledTask,
    ctx: Arc<ExecContext>,
    events_tx: mpsc::Sender<PipelineEvent>,
) {
    let kind = task.kind;

    let outcome = match run_task_inner(kind, &ctx).await {
        Ok(outputs) => TaskOutcome::Success { outputs },
        Err(err) => {
            error!(task = %kind, error = %format!("{err:#}"), "task execution error");
            TaskOutcome::Failed
        }
    };

    let _ = events_tx
        .send(PipelineEvent::TaskCompleted { kind, outcome })
        .await;
}

/// One task invocation: Prune → Detect → Adapt, strictly in that order, all
/// on the blocking pool (the steps are filesystem-bound).
async fn run_task_inner(kind: AssetKind, ctx: &Arc<ExecContext>) -> Result<usize> {
    let class = ctx
        .class(kind)
        .with_context(|| format!("no class registered for task '{kind}'"))?
        .clone();
    let adapter = ctx.adapters.get(kind);

    tokio::task::spawn_blocking(move || -> Result<usize> {
        if class.prune {
            let report = prune_dest(&class.src_root, &class.dest_root)?;
            debug!(
                task = %class.kind,
                removed_files = report.removed_files,
                removed_dirs = report.removed_dirs,
                failures = report.failures,
                "prune pass complete"
            );
        }

        let matcher = compile_matcher(&class.glob)?;
        let mut files = enumerate_sources(&class, &matcher)?;

        if let Some(comparison) = class.comparison {
            let before = files.len();
            files.retain(|f| is_stale(f, &class.src_root, &class.dest_root, comparison));
            debug!(
                task = %class.kind,
                total = before,
                stale = files.len(),
                "change detection filtered up-to-date files"
            );
        }

        let outputs = adapter.apply(&files, &class).map_err(PipelineError::from)?;
        Ok(outputs.len())
    })
    .await
    .context("task worker panicked or was cancelled")?
}

/// Enumerate the class's matching source files. A missing or unreadable
/// source root is fatal to this task only.
fn enumerate_sources(class: &AssetClass, matcher: &GlobSet) -> Result<Vec<PathBuf>> {
    if !class.src_root.is_dir() {
        return Err(PipelineError::Enumeration {
            root: class.src_root.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "source root is not a directory",
            ),
        }
        .into());
    }

    let files = walk_files(&class.src_root)
        .with_context(|| format!("enumerating sources for task '{}'", class.kind))?;

    Ok(files
        .into_iter()
        .filter(|f| {
            f.strip_prefix(&class.src_root)
                .map(|rel| matcher.is_match(rel))
                .unwrap_or(false)
        })
        .collect())
}
