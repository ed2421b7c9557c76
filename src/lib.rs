// src/lib.rs

pub mod adapters;
pub mod assets;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod serve;
pub mod sync;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::adapters::AdapterSet;
use crate::assets::{AssetKind, classes_from_config};
use crate::cli::{CliArgs, Command};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{PipelineEvent, RunSummary, Runtime, RuntimeOptions, TriggerReason};
use crate::errors::PipelineError;
use crate::exec::{ExecContext, spawn_executor};
use crate::serve::ServerSession;
use crate::watch::build_profiles;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - class table + adapter table
/// - runtime / executor
/// - (watch mode) server, reload channel, file watcher, Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    match args.command {
        Command::Build { only } => run_build(&cfg, &only).await,
        Command::Watch => run_watch(&cfg).await,
    }
}

/// One-shot build: composite refresh over the selected tasks, then exit.
/// Any failed task makes the whole command fail.
async fn run_build(cfg: &ConfigFile, only: &[String]) -> Result<()> {
    let kinds = selected_kinds(only)?;
    let ctx = Arc::new(ExecContext::new(
        classes_from_config(cfg),
        AdapterSet::from_config(cfg),
    ));

    let summary = refresh_once(ctx, &kinds).await?;
    if summary.failed_tasks > 0 {
        bail!("{} task(s) failed", summary.failed_tasks);
    }

    info!("build complete");
    Ok(())
}

/// Watch mode: baseline refresh, then serve the destination root and rebuild
/// classes as their sources change. Exits only on an external termination
/// signal; a bind failure is fatal immediately.
async fn run_watch(cfg: &ConfigFile) -> Result<()> {
    let classes = classes_from_config(cfg);
    let ctx = Arc::new(ExecContext::new(
        classes.clone(),
        AdapterSet::from_config(cfg),
    ));

    // Full consistency baseline before anything is served. Task failures are
    // reported but don't prevent watching — the operator fixes the source
    // and the next event rebuilds.
    let baseline = refresh_once(Arc::clone(&ctx), &AssetKind::ALL).await?;
    if baseline.failed_tasks > 0 {
        warn!(
            failed = baseline.failed_tasks,
            "baseline refresh had failures; waiting for fixes"
        );
    }

    let dest_root = PathBuf::from(&cfg.project.dest);
    let session = ServerSession::start(&dest_root, cfg.server.port).await?;

    let (events_tx, events_rx) = mpsc::channel::<PipelineEvent>(64);
    let exec_tx = spawn_executor(Arc::clone(&ctx), events_tx.clone());

    let profiles = build_profiles(&classes)?;
    let _watcher_handle = watch::spawn_watcher(
        PathBuf::from(&cfg.project.source),
        profiles,
        events_tx.clone(),
    )?;

    // Ctrl-C → shutdown.
    {
        let tx = events_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(PipelineEvent::ShutdownRequested).await;
        });
    }

    // SIGTERM → shutdown (Unix only).
    #[cfg(unix)]
    {
        let tx = events_tx.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};
            let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
                return;
            };
            sigterm.recv().await;
            let _ = tx.send(PipelineEvent::ShutdownRequested).await;
        });
    }

    let options = RuntimeOptions {
        exit_when_idle: false,
    };
    let runtime = Runtime::new(options, events_rx, exec_tx, Some(session.reload_tx()));
    runtime.run().await?;

    // Dropping the session tears both listeners down.
    drop(session);
    Ok(())
}

/// Run one composite refresh over `kinds` to completion and report how it
/// went. Used by the one-shot build and as the watch-mode baseline.
pub async fn refresh_once(ctx: Arc<ExecContext>, kinds: &[AssetKind]) -> Result<RunSummary> {
    let (events_tx, events_rx) = mpsc::channel::<PipelineEvent>(64);
    let exec_tx = spawn_executor(ctx, events_tx.clone());

    info!(tasks = ?kinds, "starting refresh");
    for kind in kinds {
        events_tx
            .send(PipelineEvent::TaskTriggered {
                kind: *kind,
                reason: TriggerReason::Startup,
            })
            .await?;
    }

    let options = RuntimeOptions {
        exit_when_idle: true,
    };
    let runtime = Runtime::new(options, events_rx, exec_tx, None);
    runtime.run().await
}

/// Resolve `--only` names into task identities; empty means all tasks.
fn selected_kinds(only: &[String]) -> Result<Vec<AssetKind>> {
    if only.is_empty() {
        return Ok(AssetKind::ALL.to_vec());
    }
    only.iter()
        .map(|name| {
            name.parse::<AssetKind>()
                .map_err(|e| PipelineError::Config(e).into())
        })
        .collect()
}
