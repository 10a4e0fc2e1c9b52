//! Cancellable periodic timer for the decay process.
//!
//! `DecayScheduler` owns one background `std::thread` that sleeps on a stop
//! channel with a timeout and runs the tick callback each time the timeout
//! elapses. Stopping wakes the thread immediately and joins it, so once
//! [`DecayScheduler::stop`] returns no further tick can fire.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Handle to a running timer thread.
struct Running {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// A restartable periodic timer.
#[derive(Default)]
pub struct DecayScheduler {
    running: Option<Running>,
    starts: u64,
}

impl DecayScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a timer thread is currently alive.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Number of times the timer has been (re)started.
    pub fn start_count(&self) -> u64 {
        self.starts
    }

    /// Start calling `tick` every `interval`, measured from now.
    ///
    /// No-op if already running. The first tick fires one full interval
    /// after this call.
    pub fn start<F>(&mut self, interval: Duration, tick: F)
    where
        F: Fn() + Send + 'static,
    {
        if self.running.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let spawned = std::thread::Builder::new()
            .name("sakura-decay".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => tick(),
                        // Explicit stop or the owning scheduler is gone.
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                self.starts += 1;
                tracing::info!(interval_secs = interval.as_secs_f64(), "decay scheduler started");
                self.running = Some(Running { stop_tx, handle });
            }
            Err(e) => {
                // Without a timer the state simply doesn't decay this session.
                tracing::warn!(error = %e, "failed to spawn decay thread");
            }
        }
    }

    /// Stop the timer and wait for its thread to exit. Idempotent.
    pub fn stop(&mut self) {
        let Some(Running { stop_tx, handle }) = self.running.take() else {
            return;
        };
        let _ = stop_tx.send(());
        if handle.join().is_err() {
            tracing::warn!("decay thread panicked");
        }
        tracing::info!("decay scheduler stopped");
    }
}

impl std::fmt::Debug for DecayScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecayScheduler")
            .field("running", &self.is_running())
            .field("starts", &self.starts)
            .finish()
    }
}

impl Drop for DecayScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
