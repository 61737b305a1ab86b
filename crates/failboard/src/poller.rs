//! Periodic collector poller.
//!
//! Fetches run outside the state lock; only applying the result takes it,
//! so polls and operator actions never interleave inside the state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::Instrument;

use crate::board::{DashboardState, SnapshotReport};
use crate::collector::{JobSource, PollError};

/// Dashboard state shared between the poller and the operator-facing side.
pub type SharedState = Arc<Mutex<DashboardState>>;

/// Default interval between scheduled polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Locks the shared state, recovering from a poisoned lock.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, DashboardState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Dashboard state lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Runs one poll: takes a ticket, fetches, then applies or records the failure.
pub async fn poll_once(
    source: &dyn JobSource,
    state: &SharedState,
) -> Result<SnapshotReport, PollError> {
    let ticket = lock_state(state).begin_poll();
    let span = tracing::info_span!("poll", ticket = ticket.value());

    let result = source.fetch_failed_jobs().instrument(span.clone()).await;

    let _span = span.entered();
    let mut guard = lock_state(state);
    match result {
        Ok(jobs) => match guard.apply_snapshot(ticket, jobs) {
            Ok(report) => {
                if !report.new_failed.is_empty() {
                    log::info!("{} new failed job(s) detected", report.new_failed.len());
                }
                Ok(report)
            }
            Err(e) => {
                log::debug!("{}", e);
                Err(e)
            }
        },
        Err(e) => {
            log::error!("Poll of {} failed: {}", source.describe(), e);
            guard.record_poll_failure(ticket, &source.describe(), &e);
            Err(e)
        }
    }
}

/// Polls on a fixed interval and on manual triggers until stopped.
pub struct Poller {
    source: Arc<dyn JobSource>,
    state: SharedState,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Poller {
    pub fn new(source: Arc<dyn JobSource>, state: SharedState, interval: Duration) -> Self {
        Self {
            source,
            state,
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Start the poll loop in a background thread.
    ///
    /// Polls once immediately, then on every interval tick or trigger.
    pub fn start(&self, mut trigger_rx: broadcast::Receiver<()>) -> std::io::Result<JoinHandle<()>> {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;

        std::thread::Builder::new()
            .name("failboard-poller".into())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        log::error!("Failed to start poller runtime: {}", e);
                        return;
                    }
                };

                rt.block_on(async {
                    let mut interval_timer = tokio::time::interval(interval);
                    interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

                    loop {
                        if shutdown.load(Ordering::Acquire) {
                            break;
                        }

                        tokio::select! {
                            _ = interval_timer.tick() => {},
                            Ok(()) = trigger_rx.recv() => {
                                log::info!("Manual refresh triggered");
                            },
                        }

                        if shutdown.load(Ordering::Acquire) {
                            break;
                        }

                        // Failures are already logged and notified.
                        let _ = poll_once(source.as_ref(), &state).await;
                    }

                    log::info!("Poller stopped");
                });
            })
    }

    /// Signals the poller to stop after its current wait.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}
