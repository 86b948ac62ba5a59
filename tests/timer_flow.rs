use std::time::Duration;

use taskminder::timer::{CountdownTimer, StopBehavior, TimerHooks, TimerStatus};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    time::timeout,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Observed {
    ticks: UnboundedReceiver<(u64, u64)>,
    finishes: UnboundedReceiver<()>,
}

fn observer_hooks() -> (TimerHooks, Observed) {
    let (tick_tx, ticks) = mpsc::unbounded_channel();
    let (finish_tx, finishes) = mpsc::unbounded_channel();

    let hooks = TimerHooks::new()
        .on_tick(move |mins, secs| {
            let _ = tick_tx.send((mins, secs));
        })
        .on_finish(move || {
            let _ = finish_tx.send(());
        });

    (hooks, Observed { ticks, finishes })
}

async fn wait_until_idle(timer: &CountdownTimer) {
    for _ in 0..100 {
        if timer.state().await.status == TimerStatus::Idle {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("timer never went idle");
}

fn drain(ticks: &mut UnboundedReceiver<(u64, u64)>) -> Vec<(u64, u64)> {
    let mut seen = Vec::new();
    while let Ok(tick) = ticks.try_recv() {
        seen.push(tick);
    }
    seen
}

#[tokio::test]
async fn three_second_countdown_runs_to_completion() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let stats = dir.path().join("stats.json");

    let (hooks, mut observed) = observer_hooks();
    let timer = CountdownTimer::new(0, 3, hooks).with_log_path(&stats);

    timer.start().await;

    timeout(Duration::from_secs(10), observed.finishes.recv())
        .await
        .expect("countdown did not finish in time")
        .expect("finish channel closed");
    wait_until_idle(&timer).await;

    assert_eq!(drain(&mut observed.ticks), vec![(0, 3), (0, 2), (0, 1)]);
    assert!(observed.finishes.try_recv().is_err(), "finish fired twice");

    let entries = timer.session_log().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].duration_minutes, 0.05);

    let state = timer.state().await;
    assert_eq!(state.remaining_secs, 0);
    assert_eq!(state.elapsed_secs, 3);
}

#[tokio::test]
async fn stop_mid_countdown_logs_partial_elapsed() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let stats = dir.path().join("stats.json");

    let (hooks, mut observed) = observer_hooks();
    let timer = CountdownTimer::new(0, 3, hooks).with_log_path(&stats);

    timer.start().await;

    // The third tick arrives once two full seconds have elapsed.
    for expected in [(0, 3), (0, 2), (0, 1)] {
        let tick = timeout(Duration::from_secs(5), observed.ticks.recv())
            .await
            .expect("tick timed out")
            .expect("tick channel closed");
        assert_eq!(tick, expected);
    }

    timer.stop().await.unwrap();

    let state = timer.state().await;
    assert_eq!(state.status, TimerStatus::Idle);
    assert_eq!(state.elapsed_secs, 2);
    assert_eq!(state.remaining_secs, 1);

    let entries = timer.session_log().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].duration_minutes, 0.03);

    // Let the ticker observe the stop; no finish may fire and nothing more
    // may be logged.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(observed.finishes.try_recv().is_err());
    assert_eq!(timer.session_log().entries().len(), 1);
}

#[tokio::test]
async fn start_is_idempotent_while_running() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let stats = dir.path().join("stats.json");

    let (hooks, mut observed) = observer_hooks();
    let timer = CountdownTimer::new(0, 2, hooks).with_log_path(&stats);

    timer.start().await;
    let first_session = timer
        .state()
        .await
        .session_id
        .expect("session id missing after start");

    timer.start().await;
    assert_eq!(
        timer.state().await.session_id.as_deref(),
        Some(first_session.as_str()),
        "second start must not replace the session"
    );

    timeout(Duration::from_secs(10), observed.finishes.recv())
        .await
        .expect("countdown did not finish in time")
        .expect("finish channel closed");
    wait_until_idle(&timer).await;

    // A duplicated ticker would have doubled these up.
    assert_eq!(drain(&mut observed.ticks), vec![(0, 2), (0, 1)]);
    assert_eq!(timer.session_log().entries().len(), 1);
}

#[tokio::test]
async fn reset_restores_duration_and_reemits_tick() {
    init_logs();
    let (hooks, mut observed) = observer_hooks();
    let timer = CountdownTimer::new(0, 0, hooks);

    timer.reset(Some(2), Some(5)).await;

    // The tick is re-invoked synchronously, so it is already delivered.
    assert_eq!(observed.ticks.try_recv().expect("missing reset tick"), (2, 5));

    let state = timer.state().await;
    assert_eq!(state.status, TimerStatus::Idle);
    assert_eq!(state.remaining_secs, 125);
    assert_eq!(state.elapsed_secs, 0);

    // Absent arguments keep the configured duration.
    timer.reset(None, None).await;
    assert_eq!(observed.ticks.try_recv().expect("missing reset tick"), (2, 5));
    assert_eq!(timer.state().await.remaining_secs, 125);
}

#[tokio::test]
async fn reset_mid_countdown_fires_immediately() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let stats = dir.path().join("stats.json");

    let (hooks, mut observed) = observer_hooks();
    let timer = CountdownTimer::new(0, 5, hooks).with_log_path(&stats);

    timer.start().await;
    let first = timeout(Duration::from_secs(5), observed.ticks.recv())
        .await
        .expect("tick timed out")
        .expect("tick channel closed");
    assert_eq!(first, (0, 5));

    timer.reset(None, Some(3)).await;
    assert_eq!(
        observed
            .ticks
            .try_recv()
            .expect("reset tick must arrive without a real-time delay"),
        (0, 3)
    );

    let state = timer.state().await;
    assert_eq!(state.status, TimerStatus::Idle);
    assert_eq!(state.total_secs, 3);
    assert_eq!(state.remaining_secs, 3);

    // The old ticker exits without finishing or logging.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(observed.finishes.try_recv().is_err());
    assert!(timer.session_log().entries().is_empty());
}

#[tokio::test]
async fn discard_and_rewind_stop_logs_nothing() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let stats = dir.path().join("stats.json");

    let (hooks, mut observed) = observer_hooks();
    let timer = CountdownTimer::new(0, 3, hooks)
        .with_log_path(&stats)
        .with_stop_behavior(StopBehavior::DiscardAndRewind);

    timer.start().await;
    for _ in 0..2 {
        timeout(Duration::from_secs(5), observed.ticks.recv())
            .await
            .expect("tick timed out")
            .expect("tick channel closed");
    }

    timer.stop().await.unwrap();

    let state = timer.state().await;
    assert_eq!(state.status, TimerStatus::Idle);
    assert_eq!(state.remaining_secs, 3);
    assert_eq!(state.elapsed_secs, 0);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(observed.finishes.try_recv().is_err());
    assert!(!stats.exists(), "no log entry may be written");
}

#[tokio::test]
async fn vetoed_stop_keeps_the_countdown_running() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let stats = dir.path().join("stats.json");

    let (hooks, mut observed) = observer_hooks();
    let hooks = hooks.confirm_stop(|| false);
    let timer = CountdownTimer::new(0, 3, hooks).with_log_path(&stats);

    timer.start().await;
    timeout(Duration::from_secs(5), observed.ticks.recv())
        .await
        .expect("tick timed out")
        .expect("tick channel closed");

    timer.stop().await.unwrap();
    assert_eq!(timer.state().await.status, TimerStatus::Running);
    assert!(timer.session_log().entries().is_empty());

    // The vetoed stop left the session untouched, so it finishes naturally.
    timeout(Duration::from_secs(10), observed.finishes.recv())
        .await
        .expect("countdown did not finish in time")
        .expect("finish channel closed");
    wait_until_idle(&timer).await;
    assert_eq!(timer.session_log().entries().len(), 1);
    assert_eq!(timer.session_log().entries()[0].duration_minutes, 0.05);
}

#[tokio::test]
async fn zero_duration_finishes_without_ticking() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let stats = dir.path().join("stats.json");

    let (hooks, mut observed) = observer_hooks();
    let timer = CountdownTimer::new(0, 0, hooks).with_log_path(&stats);

    timer.start().await;
    timeout(Duration::from_secs(2), observed.finishes.recv())
        .await
        .expect("finish timed out")
        .expect("finish channel closed");
    wait_until_idle(&timer).await;

    assert!(drain(&mut observed.ticks).is_empty());
    let entries = timer.session_log().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].duration_minutes, 0.0);
}
