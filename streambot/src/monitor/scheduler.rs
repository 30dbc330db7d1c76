//! Timer driving the reconciliation engine.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::engine::{CycleReport, ReconciliationEngine};
use crate::Result;
use crate::activity::ActivityLog;

struct TimerHandle {
    interval_secs: u64,
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// `Stopped -> Running -> Stopped` state machine around a repeating timer.
///
/// The first tick fires immediately. Ticks that arrive while a cycle is
/// still running are skipped.
pub struct Scheduler {
    engine: Arc<ReconciliationEngine>,
    activity: Arc<ActivityLog>,
    timer: Mutex<Option<TimerHandle>>,
    /// Serializes start, stop and re-arm.
    transition: tokio::sync::Mutex<()>,
}

impl Scheduler {
    pub fn new(engine: Arc<ReconciliationEngine>, activity: Arc<ActivityLog>) -> Self {
        Self {
            engine,
            activity,
            timer: Mutex::new(None),
            transition: tokio::sync::Mutex::new(()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.lock().is_some()
    }

    /// Interval of the armed timer, if running.
    pub fn interval_secs(&self) -> Option<u64> {
        self.timer.lock().as_ref().map(|t| t.interval_secs)
    }

    /// Arm the timer. Returns `false` if it was already running.
    pub async fn start(&self, interval_secs: u64) -> bool {
        let _transition = self.transition.lock().await;
        self.arm(interval_secs).await
    }

    /// Cancel the timer and wait for an in-flight cycle to finish.
    /// Returns `false` if it was not running.
    pub async fn stop(&self) -> bool {
        let _transition = self.transition.lock().await;
        self.disarm().await
    }

    /// Re-arm with a new interval when running; a no-op when stopped, since
    /// the next start reads the configuration anyway.
    ///
    /// The re-arm holds the transition lock throughout, so a concurrent
    /// `stop` lands after it and leaves the scheduler stopped.
    pub async fn update_interval(&self, interval_secs: u64) {
        let _transition = self.transition.lock().await;
        match self.interval_secs() {
            None => debug!(interval_secs, "Monitoring stopped, interval applies on next start"),
            Some(current) if current == interval_secs.max(1) => {}
            Some(_) => {
                self.disarm().await;
                self.arm(interval_secs).await;
            }
        }
    }

    async fn arm(&self, interval_secs: u64) -> bool {
        let interval_secs = interval_secs.max(1);
        {
            let mut timer = self.timer.lock();
            if timer.is_some() {
                debug!("Monitoring already running");
                return false;
            }

            let token = CancellationToken::new();
            let task = tokio::spawn(run_timer(
                self.engine.clone(),
                Duration::from_secs(interval_secs),
                token.clone(),
            ));
            *timer = Some(TimerHandle {
                interval_secs,
                token,
                task,
            });
        }

        info!(interval_secs, "Stream monitoring started");
        self.activity
            .info(
                "Stream monitoring started",
                Some(format!("Checking every {interval_secs} seconds")),
            )
            .await;
        true
    }

    async fn disarm(&self) -> bool {
        let handle = self.timer.lock().take();
        let Some(handle) = handle else {
            return false;
        };

        handle.token.cancel();
        if let Err(e) = handle.task.await {
            warn!(error = %e, "Monitoring timer task ended abnormally");
        }

        info!("Stream monitoring stopped");
        self.activity.info("Stream monitoring stopped", None).await;
        true
    }

    /// Run one cycle now without touching the timer.
    pub async fn check_now(&self) -> Result<CycleReport> {
        self.engine.run_cycle().await
    }
}

async fn run_timer(engine: Arc<ReconciliationEngine>, period: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("Monitoring timer shutting down");
                break;
            }
            _ = ticker.tick() => {
                if engine.try_run_cycle().await.is_none() {
                    debug!("Previous cycle still running, skipping tick");
                }
            }
        }
    }
}
