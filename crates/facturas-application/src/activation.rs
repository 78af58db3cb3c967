//! BackendActivationMonitor - waits out the backend's cold start.
//!
//! One bounded probe at startup. If it fails the monitor reports `Sleeping`
//! and re-probes on a fixed interval until the backend answers, then stops.
//! Group operations never wait on this monitor.

use facturas_core::{ActivationConfig, LivenessProbe};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Backend liveness as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Unknown,
    Probing,
    Awake,
    /// Show the "service is waking up" indicator.
    Sleeping,
}

impl ActivationState {
    pub fn is_waking(&self) -> bool {
        matches!(self, Self::Sleeping)
    }
}

pub struct BackendActivationMonitor {
    probe: Arc<dyn LivenessProbe>,
    config: ActivationConfig,
    state: watch::Sender<ActivationState>,
    cancel: CancellationToken,
}

impl BackendActivationMonitor {
    pub fn new(probe: Arc<dyn LivenessProbe>, config: ActivationConfig) -> Self {
        let (state, _) = watch::channel(ActivationState::Unknown);
        Self {
            probe,
            config,
            state,
            cancel: CancellationToken::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ActivationState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ActivationState {
        *self.state.borrow()
    }

    /// Stops the heartbeat; an in-flight probe is abandoned.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Runs the monitor on its own task.
    pub fn start(self: &Arc<Self>) -> JoinHandle<ActivationState> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move { monitor.run().await })
    }

    /// Probes until the backend is awake or the monitor is stopped.
    ///
    /// Returns the last state reached.
    pub async fn run(&self) -> ActivationState {
        if self.cancel.is_cancelled() {
            return self.state();
        }

        self.set(ActivationState::Probing);
        if self.probe_once().await {
            tracing::debug!("[ActivationMonitor] Backend is awake");
            return self.set(ActivationState::Awake);
        }

        let retry = self.config.retry_interval();
        tracing::warn!(
            "[ActivationMonitor] Backend is not responding, retrying every {}s",
            retry.as_secs()
        );
        self.set(ActivationState::Sleeping);

        let mut ticker = interval_at(Instant::now() + retry, retry);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!("[ActivationMonitor] Stopped while sleeping");
                    return self.state();
                }
                _ = ticker.tick() => {
                    if self.probe_once().await {
                        tracing::info!("[ActivationMonitor] Backend woke up");
                        return self.set(ActivationState::Awake);
                    }
                    tracing::debug!("[ActivationMonitor] Still waiting for the backend");
                }
            }
        }
    }

    /// One ping, abandoned after the probe timeout or on stop.
    async fn probe_once(&self) -> bool {
        tokio::select! {
            result = self.probe.ping() => match result {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!("[ActivationMonitor] Probe failed: {}", e);
                    false
                }
            },
            _ = tokio::time::sleep(self.config.probe_timeout()) => {
                tracing::debug!(
                    "[ActivationMonitor] Probe timed out after {}ms",
                    self.config.probe_timeout_ms
                );
                false
            }
            _ = self.cancel.cancelled() => false,
        }
    }

    fn set(&self, state: ActivationState) -> ActivationState {
        self.state.send_replace(state);
        state
    }
}
