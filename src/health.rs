// ============================================================================
// File: src/health.rs
// Fixed-interval health polling
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api_client::AnalysisService;
use crate::models::HealthStatus;

/// Last known service health
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HealthState {
    /// Not polled yet, or the last poll failed
    #[default]
    Unknown,
    Reported(HealthStatus),
}

impl HealthState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthState::Reported(status) if status.is_healthy())
    }
}

/// Background poller publishing the latest `HealthState`
pub struct HealthMonitor {
    state: watch::Receiver<HealthState>,
    handle: JoinHandle<()>,
}

impl HealthMonitor {
    /// Poll immediately, then every `interval`, until `cancel` fires
    pub fn spawn(
        service: Arc<dyn AnalysisService>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = watch::channel(HealthState::Unknown);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let state = tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = service.check_health() => poll_result(result),
                };

                // send_replace so subscribers see every poll, even an unchanged one
                tx.send_replace(state);
            }

            tracing::debug!("Health monitor stopped");
        });

        Self { state: rx, handle }
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthState> {
        self.state.clone()
    }

    /// Wait for the polling task to finish after cancellation
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

fn poll_result(result: Result<HealthStatus, crate::error::ClientError>) -> HealthState {
    match result {
        Ok(status) => {
            tracing::debug!(status = %status.status, "Health check");
            HealthState::Reported(status)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Health check failed, status unknown");
            HealthState::Unknown
        }
    }
}
