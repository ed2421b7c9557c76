use std::error::Error;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use assetpipe::assets::AssetKind;
use assetpipe::engine::{
    PipelineEvent, RunSummary, Runtime, RuntimeOptions, TaskOutcome, TriggerReason,
};
use assetpipe::exec::ScheduledTask;
use assetpipe::serve::ReloadMessage;

type TestResult = Result<(), Box<dyn Error>>;

/// A runtime under test, with the executor replaced by a channel the test
/// drains by hand.
struct Harness {
    events_tx: mpsc::Sender<PipelineEvent>,
    exec_rx: mpsc::Receiver<ScheduledTask>,
    reload_tx: broadcast::Sender<ReloadMessage>,
    runtime: JoinHandle<anyhow::Result<RunSummary>>,
}

fn start_runtime(exit_when_idle: bool, with_reload: bool) -> Harness {
    let (events_tx, events_rx) = mpsc::channel::<PipelineEvent>(16);
    let (exec_tx, exec_rx) = mpsc::channel::<ScheduledTask>(16);
    let (reload_tx, _) = broadcast::channel::<ReloadMessage>(16);

    let runtime = Runtime::new(
        RuntimeOptions { exit_when_idle },
        events_rx,
        exec_tx,
        with_reload.then(|| reload_tx.clone()),
    );

    Harness {
        events_tx,
        exec_rx,
        reload_tx,
        runtime: tokio::spawn(runtime.run()),
    }
}

async fn trigger(h: &Harness, kind: AssetKind) -> TestResult {
    h.events_tx
        .send(PipelineEvent::TaskTriggered {
            kind,
            reason: TriggerReason::FileWatch,
        })
        .await?;
    Ok(())
}

async fn complete(h: &Harness, kind: AssetKind, outcome: TaskOutcome) -> TestResult {
    h.events_tx
        .send(PipelineEvent::TaskCompleted { kind, outcome })
        .await?;
    Ok(())
}

async fn next_dispatch(h: &mut Harness) -> Option<ScheduledTask> {
    timeout(Duration::from_secs(1), h.exec_rx.recv())
        .await
        .ok()
        .flatten()
}

async fn no_dispatch(h: &mut Harness) -> bool {
    match timeout(Duration::from_millis(100), h.exec_rx.recv()).await {
        Err(_) => true,   // timed out with nothing dispatched
        Ok(None) => true, // runtime gone, nothing was pending
        Ok(Some(_)) => false,
    }
}

const OK: TaskOutcome = TaskOutcome::Success { outputs: 1 };

#[tokio::test]
async fn triggers_for_one_class_are_serialized() -> TestResult {
    let mut h = start_runtime(true, false);

    trigger(&h, AssetKind::Styles).await?;
    trigger(&h, AssetKind::Styles).await?;

    // First trigger dispatches; the second queues behind the running task.
    assert_eq!(next_dispatch(&mut h).await.map(|t| t.kind), Some(AssetKind::Styles));
    assert!(no_dispatch(&mut h).await);

    complete(&h, AssetKind::Styles, OK).await?;
    assert_eq!(next_dispatch(&mut h).await.map(|t| t.kind), Some(AssetKind::Styles));

    complete(&h, AssetKind::Styles, OK).await?;
    let summary = h.runtime.await??;
    assert_eq!(summary.failed_tasks, 0);

    Ok(())
}

#[tokio::test]
async fn different_classes_dispatch_concurrently() -> TestResult {
    let mut h = start_runtime(true, false);

    trigger(&h, AssetKind::Fonts).await?;
    trigger(&h, AssetKind::Icons).await?;

    let first = next_dispatch(&mut h).await.map(|t| t.kind);
    let second = next_dispatch(&mut h).await.map(|t| t.kind);
    assert_eq!(first, Some(AssetKind::Fonts));
    assert_eq!(second, Some(AssetKind::Icons));

    complete(&h, AssetKind::Icons, OK).await?;
    complete(&h, AssetKind::Fonts, OK).await?;

    let summary = h.runtime.await??;
    assert_eq!(summary.failed_tasks, 0);

    Ok(())
}

#[tokio::test]
async fn styles_completion_notifies_with_style_injection_only() -> TestResult {
    let mut h = start_runtime(true, true);
    let mut reload_rx = h.reload_tx.subscribe();

    trigger(&h, AssetKind::Styles).await?;
    assert_eq!(next_dispatch(&mut h).await.map(|t| t.kind), Some(AssetKind::Styles));
    complete(&h, AssetKind::Styles, OK).await?;

    let message = timeout(Duration::from_secs(1), reload_rx.recv()).await??;
    assert_eq!(message, ReloadMessage::InjectStyles);

    // No other class was triggered by the styles event.
    assert!(no_dispatch(&mut h).await);

    h.runtime.await??;
    Ok(())
}

#[tokio::test]
async fn markup_completion_notifies_with_full_reload() -> TestResult {
    let mut h = start_runtime(true, true);
    let mut reload_rx = h.reload_tx.subscribe();

    trigger(&h, AssetKind::Markup).await?;
    next_dispatch(&mut h).await;
    complete(&h, AssetKind::Markup, OK).await?;

    let message = timeout(Duration::from_secs(1), reload_rx.recv()).await??;
    assert_eq!(message, ReloadMessage::Reload);

    h.runtime.await??;
    Ok(())
}

#[tokio::test]
async fn failed_task_is_counted_and_sends_no_notification() -> TestResult {
    let mut h = start_runtime(true, true);
    let mut reload_rx = h.reload_tx.subscribe();

    trigger(&h, AssetKind::Scripts).await?;
    next_dispatch(&mut h).await;
    complete(&h, AssetKind::Scripts, TaskOutcome::Failed).await?;

    let summary = h.runtime.await??;
    assert_eq!(summary.failed_tasks, 1);
    assert!(matches!(
        reload_rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));

    Ok(())
}

#[tokio::test]
async fn shutdown_request_stops_the_loop() -> TestResult {
    let h = start_runtime(false, false);

    h.events_tx.send(PipelineEvent::ShutdownRequested).await?;
    let summary = h.runtime.await??;
    assert_eq!(summary.failed_tasks, 0);

    Ok(())
}
