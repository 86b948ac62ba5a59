use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::{sync::Mutex, task::JoinHandle, time};
use uuid::Uuid;

use super::{
    stats::{SessionLog, DEFAULT_LOG_PATH},
    state::{TimerState, TimerStatus},
};

pub type TickFn = dyn Fn(u64, u64) + Send + Sync;
pub type FinishFn = dyn Fn() + Send + Sync;
pub type ConfirmStopFn = dyn Fn() -> bool + Send + Sync;

/// Observer callbacks for a [`CountdownTimer`].
///
/// `on_tick` and `on_finish` run on the ticker task; `confirm_stop` runs on
/// the caller of [`CountdownTimer::stop`]. Panics inside a hook are not
/// caught and take the ticker task down with them.
#[derive(Default)]
pub struct TimerHooks {
    pub(crate) on_tick: Option<Box<TickFn>>,
    pub(crate) on_finish: Option<Box<FinishFn>>,
    pub(crate) confirm_stop: Option<Box<ConfirmStopFn>>,
}

impl TimerHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per second with `(minutes, seconds)` remaining, and once
    /// immediately after a reset.
    pub fn on_tick(mut self, hook: impl Fn(u64, u64) + Send + Sync + 'static) -> Self {
        self.on_tick = Some(Box::new(hook));
        self
    }

    /// Called once when the countdown reaches zero naturally.
    pub fn on_finish(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_finish = Some(Box::new(hook));
        self
    }

    /// Consulted by [`CountdownTimer::stop`]; returning `false` vetoes the
    /// stop and leaves the countdown running.
    pub fn confirm_stop(mut self, hook: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.confirm_stop = Some(Box::new(hook));
        self
    }
}

/// What `stop()` does with the session in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopBehavior {
    /// Record the elapsed duration to the session log and keep the countdown
    /// position where it was.
    LogElapsed,
    /// Record nothing and wind the countdown back to the full duration.
    DiscardAndRewind,
}

impl Default for StopBehavior {
    fn default() -> Self {
        StopBehavior::LogElapsed
    }
}

/// A single countdown with a background one-second ticker.
///
/// At most one ticker task is active per timer; `start()` while running is a
/// no-op. Cancellation is cooperative: `stop()` and `reset()` flip the shared
/// status and the ticker observes the change at its next wakeup, so up to one
/// in-flight second of sleep may pass before it exits. There is no drift
/// correction against wall-clock time.
#[derive(Clone)]
pub struct CountdownTimer {
    state: Arc<Mutex<TimerState>>,
    hooks: Arc<TimerHooks>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    log: SessionLog,
    stop_behavior: StopBehavior,
    tick_interval: Duration,
}

impl CountdownTimer {
    pub fn new(minutes: u64, seconds: u64, hooks: TimerHooks) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::new(minutes * 60 + seconds))),
            hooks: Arc::new(hooks),
            ticker: Arc::new(Mutex::new(None)),
            log: SessionLog::new(DEFAULT_LOG_PATH),
            stop_behavior: StopBehavior::default(),
            tick_interval: Duration::from_secs(1),
        }
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log = SessionLog::new(path);
        self
    }

    pub fn with_stop_behavior(mut self, behavior: StopBehavior) -> Self {
        self.stop_behavior = behavior;
        self
    }

    pub fn session_log(&self) -> &SessionLog {
        &self.log
    }

    pub async fn state(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    /// Begin the countdown. No-op if one is already running.
    pub async fn start(&self) {
        {
            let mut state = self.state.lock().await;
            if state.status == TimerStatus::Running {
                info!("start ignored: countdown already running");
                return;
            }
            let session_id = Uuid::new_v4().to_string();
            info!(
                "starting countdown session {session_id} ({}s)",
                state.remaining_secs
            );
            state.begin_session(session_id, Utc::now());
        }
        self.spawn_ticker().await;
    }

    /// End the session early, applying the configured [`StopBehavior`].
    ///
    /// With a `confirm_stop` hook installed, a `false` answer aborts the stop.
    pub async fn stop(&self) -> Result<()> {
        if let Some(confirm) = &self.hooks.confirm_stop {
            if !confirm() {
                info!("stop declined by confirmation hook");
                return Ok(());
            }
        }

        match self.stop_behavior {
            StopBehavior::LogElapsed => {
                let (session_id, elapsed) = {
                    let mut state = self.state.lock().await;
                    if state.status != TimerStatus::Running {
                        return Ok(());
                    }
                    state.halt();
                    (state.session_id.clone(), state.elapsed_secs)
                };
                self.log.append(elapsed)?;
                if let Some(id) = session_id {
                    info!("countdown session {id} stopped after {elapsed}s");
                }
            }
            StopBehavior::DiscardAndRewind => {
                let mut state = self.state.lock().await;
                state.rewind(None);
            }
        }
        Ok(())
    }

    /// Return to idle at the full duration, optionally replacing it.
    ///
    /// Absent arguments keep the configured duration; a present pair member
    /// treats the absent one as zero. The tick hook is re-invoked right away
    /// so observers see the restored clock without waiting a second. Never
    /// writes a log entry.
    pub async fn reset(&self, minutes: Option<u64>, seconds: Option<u64>) {
        let (mins, secs) = {
            let mut state = self.state.lock().await;
            let new_total = if minutes.is_some() || seconds.is_some() {
                Some(minutes.unwrap_or(0) * 60 + seconds.unwrap_or(0))
            } else {
                None
            };
            state.rewind(new_total);
            state.clock()
        };

        if let Some(on_tick) = &self.hooks.on_tick {
            on_tick(mins, secs);
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = Arc::clone(&self.state);
        let hooks = Arc::clone(&self.hooks);
        let log = self.log.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            loop {
                let clock = {
                    let guard = state.lock().await;
                    if guard.status != TimerStatus::Running || guard.remaining_secs == 0 {
                        break;
                    }
                    guard.clock()
                };

                if let Some(on_tick) = &hooks.on_tick {
                    on_tick(clock.0, clock.1);
                }

                time::sleep(tick_interval).await;

                // Re-check under the lock so a stop or reset landing during
                // the sleep never produces a stray decrement.
                let mut guard = state.lock().await;
                if guard.status != TimerStatus::Running {
                    break;
                }
                guard.tick_down();
            }

            let finished = {
                let guard = state.lock().await;
                guard.status == TimerStatus::Running && guard.remaining_secs == 0
            };

            if finished {
                if let Some(on_finish) = &hooks.on_finish {
                    on_finish();
                }

                let (session_id, elapsed) = {
                    let guard = state.lock().await;
                    (guard.session_id.clone(), guard.elapsed_secs)
                };
                if let Err(err) = log.append(elapsed) {
                    error!("failed to record finished session: {err:#}");
                }
                if let Some(id) = session_id {
                    info!("countdown session {id} finished after {elapsed}s");
                }
            }

            let mut guard = state.lock().await;
            if guard.status == TimerStatus::Running {
                guard.halt();
            }
        });

        *ticker_guard = Some(handle);
    }
}
