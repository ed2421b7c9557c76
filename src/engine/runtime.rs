// src/engine/runtime.rs

use std::collections::HashSet;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::assets::AssetKind;
use crate::engine::pending::PendingReruns;
use crate::exec::ScheduledTask;
use crate::serve::ReloadMessage;

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Seeded at startup (the composite refresh).
    Startup,
    FileWatch,
}

/// Result of one task invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success {
        /// Number of files the adapter wrote.
        outputs: usize,
    },
    Failed,
}

/// Events sent into the runtime from the watcher, the executor, or signal
/// handlers.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    TaskTriggered {
        kind: AssetKind,
        reason: TriggerReason,
    },
    TaskCompleted {
        kind: AssetKind,
        outcome: TaskOutcome,
    },
    ShutdownRequested,
}

/// Options that influence how the runtime behaves.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// If true, exit as soon as no task is running and nothing is queued.
    /// In watch mode this should be `false`.
    pub exit_when_idle: bool,
}

/// What a finished run looked like; drives the one-shot exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub failed_tasks: usize,
}

/// The dispatcher at the center of the pipeline.
///
/// Consumes [`PipelineEvent`]s and upholds the scheduling contract: tasks for
/// different asset classes run concurrently (their destination subtrees are
/// disjoint), while triggers for a class whose task is mid-run are queued and
/// replayed one at a time. After a successful task in watch mode, connected
/// clients are notified with a reload scoped to the kind of asset that
/// changed.
pub struct Runtime {
    options: RuntimeOptions,
    pending: PendingReruns,

    /// Unified event stream from all producers.
    events_rx: mpsc::Receiver<PipelineEvent>,

    /// Channel to the executor: one message per task invocation.
    exec_tx: mpsc::Sender<ScheduledTask>,

    /// Reload fan-out to connected clients; `None` outside watch mode.
    reload_tx: Option<broadcast::Sender<ReloadMessage>>,

    running: HashSet<AssetKind>,
    failed_tasks: usize,
}

impl Runtime {
    pub fn new(
        options: RuntimeOptions,
        events_rx: mpsc::Receiver<PipelineEvent>,
        exec_tx: mpsc::Sender<ScheduledTask>,
        reload_tx: Option<broadcast::Sender<ReloadMessage>>,
    ) -> Self {
        Self {
            options,
            pending: PendingReruns::new(),
            events_rx,
            exec_tx,
            reload_tx,
            running: HashSet::new(),
            failed_tasks: 0,
        }
    }

    /// Main event loop. Returns once a shutdown is requested, the event
    /// channel closes, or — with `exit_when_idle` — all work has drained.
    pub async fn run(mut self) -> Result<RunSummary> {
        info!("pipeline runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            let keep_running = match event {
                PipelineEvent::TaskTriggered { kind, reason } => {
                    self.handle_trigger(kind, reason).await?
                }
                PipelineEvent::TaskCompleted { kind, outcome } => {
                    self.handle_completion(kind, outcome).await?
                }
                PipelineEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    false
                }
            };

            if !keep_running {
                break;
            }
        }

        info!(failed = self.failed_tasks, "pipeline runtime exiting");
        Ok(RunSummary {
            failed_tasks: self.failed_tasks,
        })
    }

    async fn handle_trigger(&mut self, kind: AssetKind, reason: TriggerReason) -> Result<bool> {
        info!(task = %kind, ?reason, "task triggered");

        if self.running.contains(&kind) {
            // Same class already rebuilding; serialize behind it.
            self.pending.record(kind);
        } else {
            self.dispatch(kind).await?;
        }

        Ok(true)
    }

    async fn handle_completion(&mut self, kind: AssetKind, outcome: TaskOutcome) -> Result<bool> {
        self.running.remove(&kind);

        match outcome {
            TaskOutcome::Success { outputs } => {
                info!(task = %kind, outputs, "task completed successfully");
                self.notify_clients(kind);
            }
            TaskOutcome::Failed => {
                // Detail was already logged by the executor; the task simply
                // waits for the next triggering event.
                warn!(task = %kind, "task failed");
                self.failed_tasks += 1;
            }
        }

        if self.pending.take(kind) {
            debug!(task = %kind, "replaying queued trigger");
            self.dispatch(kind).await?;
        }

        if self.options.exit_when_idle && self.running.is_empty() && self.pending.is_empty() {
            info!("runtime idle and exit_when_idle=true, stopping");
            return Ok(false);
        }

        Ok(true)
    }

    async fn dispatch(&mut self, kind: AssetKind) -> Result<()> {
        self.running.insert(kind);
        debug!(task = %kind, "dispatching task to executor");
        if let Err(err) = self.exec_tx.send(ScheduledTask { kind }).await {
            error!(error = %err, "failed to send task to executor");
            return Err(err.into());
        }
        Ok(())
    }

    /// Push a reload notification scoped to the changed asset kind. No-op
    /// outside watch mode or when no client is connected.
    fn notify_clients(&self, kind: AssetKind) {
        if let Some(reload_tx) = &self.reload_tx {
            let message = ReloadMessage::for_class(kind);
            match reload_tx.send(message) {
                Ok(receivers) => {
                    debug!(task = %kind, ?message, receivers, "reload notification sent");
                }
                Err(_) => {
                    debug!(task = %kind, "no connected clients to notify");
                }
            }
        }
    }
}
