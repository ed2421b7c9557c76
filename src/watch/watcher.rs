// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::assets::ChangeKind;
use crate::engine::{PipelineEvent, TriggerReason};
use crate::watch::patterns::ClassWatchProfile;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher observing the source root recursively.
///
/// Each change event is matched against the per-class subscriptions; every
/// match sends a `TaskTriggered` into the runtime. Matching for different
/// classes is independent — one event may trigger several tasks, and events
/// for different classes rebuild concurrently.
pub fn spawn_watcher(
    source_root: impl Into<PathBuf>,
    profiles: Vec<ClassWatchProfile>,
    events_tx: mpsc::Sender<PipelineEvent>,
) -> Result<WatcherHandle> {
    let source_root = source_root.into();
    let abs_root = source_root
        .canonicalize()
        .unwrap_or_else(|_| source_root.clone()); // best-effort

    let profiles = Arc::new(profiles);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("assetpipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("assetpipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&abs_root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", abs_root);

    // Async task that consumes notify events and forwards task triggers to
    // the runtime.
    let async_profiles = Arc::clone(&profiles);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("received notify event: {:?}", event);

            let change = match map_change_kind(&event.kind) {
                Some(c) => c,
                None => continue,
            };

            for path in &event.paths {
                let comparable = match comparable_path(&abs_root, &source_root, path) {
                    Some(p) => p,
                    None => {
                        warn!(
                            "could not relativize path {:?} against root {:?}",
                            path, abs_root
                        );
                        continue;
                    }
                };

                for profile in async_profiles.iter() {
                    if profile.matches(&comparable, change) {
                        let kind = profile.kind();
                        debug!(
                            task = %kind,
                            path = ?comparable,
                            ?change,
                            "watch match -> triggering task"
                        );
                        if let Err(err) = events_tx
                            .send(PipelineEvent::TaskTriggered {
                                kind,
                                reason: TriggerReason::FileWatch,
                            })
                            .await
                        {
                            warn!("failed to send PipelineEvent::TaskTriggered: {err}");
                            // If the runtime channel is closed, there's no
                            // point keeping the watcher loop alive.
                            return;
                        }
                    }
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Map a notify event kind onto the subscription vocabulary. Access events
/// never trigger work.
fn map_change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(_) | EventKind::Any => Some(ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Other => None,
    }
}

/// Express an absolute event path in the same form as the configured class
/// roots, so the profiles can strip their own prefixes.
fn comparable_path(abs_root: &Path, source_root: &Path, path: &Path) -> Option<PathBuf> {
    let rel = path.strip_prefix(abs_root).ok()?;
    Some(source_root.join(rel))
}
