// ============================================================================
// File: src/session.rs
// Analysis request lifecycle: validate, dispatch, classify, record
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::api_client::AnalysisService;
use crate::error::ClientError;
use crate::history::{HistoryEntry, HistoryStore, NewEntry};
use crate::models::{AnalysisRequest, AnalysisResponse, RequestType};
use crate::verdict::{classify, Verdict};

pub const MAX_TEXT_CHARS: usize = 5000;

/// Result of one successful analysis
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub response: AnalysisResponse,
    pub verdict: Verdict,
    pub entry: HistoryEntry,
}

/// Owns the history store and the single in-flight analysis.
///
/// Everything a front end needs is injected through `new`, so tests can run
/// as many isolated sessions as they like.
pub struct AnalysisSession {
    service: Arc<dyn AnalysisService>,
    history: Mutex<HistoryStore>,
    in_flight: AtomicBool,
}

/// Clears the loading flag on every exit path
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Check and normalize user input before anything touches the network
pub fn validate_request(
    text: &str,
    request_type: RequestType,
    temperature: f32,
) -> Result<AnalysisRequest, ClientError> {
    let text = validate_text(text)?;

    if !(0.0..=1.0).contains(&temperature) {
        return Err(ClientError::Validation(
            "Temperature must be between 0.0 and 1.0".to_string(),
        ));
    }

    Ok(AnalysisRequest {
        text: text.to_string(),
        request_type,
        temperature,
    })
}

fn validate_text(text: &str) -> Result<&str, ClientError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(
            "Please enter some text to analyze".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_TEXT_CHARS {
        return Err(ClientError::Validation(format!(
            "Text exceeds {} character limit",
            MAX_TEXT_CHARS
        )));
    }
    Ok(trimmed)
}

impl AnalysisSession {
    pub fn new(service: Arc<dyn AnalysisService>, history: HistoryStore) -> Self {
        Self {
            service,
            history: Mutex::new(history),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one analysis end to end.
    ///
    /// Fails with `Validation` before any network call, `Busy` if another
    /// analysis is still running, `Cancelled` if `cancel` fires first, or
    /// whatever the service reported. Only a successful analysis is recorded.
    pub async fn submit(
        &self,
        text: &str,
        request_type: RequestType,
        temperature: f32,
        cancel: CancellationToken,
    ) -> Result<AnalysisOutcome, ClientError> {
        let request = validate_request(text, request_type, temperature)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::Busy);
        }
        let _loading = LoadingGuard(&self.in_flight);

        tracing::debug!(
            request_type = %request.request_type,
            text_len = request.text.chars().count(),
            "Dispatching analysis"
        );

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Analysis cancelled");
                return Err(ClientError::Cancelled);
            }
            result = self.service.analyze(&request) => result?,
        };

        let verdict = classify(&response.result);

        let entry = {
            let mut history = self.history.lock().await;
            let entry = history.add_entry(NewEntry {
                text: &request.text,
                request_type: request.request_type,
                result: &response.result,
            });
            if let Err(e) = history.save() {
                tracing::warn!(error = %e, "Failed to persist history");
            }
            entry
        };

        tracing::info!(verdict = %verdict, entry_id = entry.id, "Analysis complete");

        Ok(AnalysisOutcome {
            response,
            verdict,
            entry,
        })
    }

    /// Ask the service which mode fits `text`. Best-effort hint.
    pub async fn detect_type(&self, text: &str) -> Result<RequestType, ClientError> {
        let text = validate_text(text)?;
        self.service.detect_type(text).await
    }

    /// Newest-first snapshot
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().await.list().to_vec()
    }

    pub async fn clear_history(&self) -> anyhow::Result<()> {
        let mut history = self.history.lock().await;
        history.clear();
        history.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HealthStatus;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Canned service that counts calls
    struct StubService {
        outcome: Result<AnalysisResponse, ClientError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl StubService {
        fn answering(result: &str) -> Self {
            Self {
                outcome: Ok(AnalysisResponse {
                    result: result.to_string(),
                    request_type: RequestType::FactCheck,
                    model: None,
                    timestamp: None,
                }),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(err: ClientError) -> Self {
            Self {
                outcome: Err(err),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalysisService for StubService {
        async fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisResponse, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome.clone()
        }

        async fn check_health(&self) -> Result<HealthStatus, ClientError> {
            Err(ClientError::Transport("not used".to_string()))
        }

        async fn detect_type(&self, _text: &str) -> Result<RequestType, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RequestType::AiDetection)
        }
    }

    fn session(stub: &Arc<StubService>) -> AnalysisSession {
        AnalysisSession::new(stub.clone(), HistoryStore::default())
    }

    #[tokio::test]
    async fn fact_check_round_trip_records_history() {
        let stub = Arc::new(StubService::answering("This is true."));
        let session = session(&stub);

        let outcome = session
            .submit("The earth is round", RequestType::FactCheck, 0.7, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.verdict, Verdict::True);
        assert_eq!(outcome.entry.text, "The earth is round");
        assert_eq!(outcome.entry.request_type, RequestType::FactCheck);

        let history = session.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], outcome.entry);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_dispatch_and_recording() {
        let stub = Arc::new(StubService::answering("This claim is false."));
        let session = session(&stub);

        let outcome = session
            .submit("   Pigs can fly \n", RequestType::FactCheck, 0.2, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::False);
        assert_eq!(outcome.entry.text, "Pigs can fly");
    }

    #[tokio::test]
    async fn oversized_text_is_rejected_without_network_call() {
        let stub = Arc::new(StubService::answering("This is true."));
        let session = session(&stub);

        let err = session
            .submit(&"x".repeat(5001), RequestType::FactCheck, 0.7, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Text exceeds 5000 character limit");
        assert_eq!(stub.calls(), 0);
        assert!(session.history().await.is_empty());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn length_is_measured_after_trimming() {
        let stub = Arc::new(StubService::answering("ok"));
        let session = session(&stub);

        let padded = format!("  {}  ", "y".repeat(5000));
        session
            .submit(&padded, RequestType::GeneralChat, 0.7, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn blank_text_and_bad_temperature_are_rejected() {
        let stub = Arc::new(StubService::answering("ok"));
        let session = session(&stub);

        let blank = session
            .submit(" \t\n", RequestType::FactCheck, 0.7, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(blank, ClientError::Validation("Please enter some text to analyze".to_string()));

        for temperature in [-0.1, 1.5, f32::NAN] {
            let err = session
                .submit("claim", RequestType::FactCheck, temperature, CancellationToken::new())
                .await
                .unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn timeout_leaves_loading_cleared_and_history_unchanged() {
        let stub = Arc::new(StubService::failing(ClientError::Timeout(Duration::from_secs(60))));
        let session = session(&stub);

        let err = session
            .submit("The earth is flat", RequestType::FactCheck, 0.7, CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err, ClientError::Timeout(Duration::from_secs(60)));
        assert!(!session.is_loading());
        assert!(session.history().await.is_empty());
    }

    #[tokio::test]
    async fn service_error_message_is_propagated() {
        let stub = Arc::new(StubService::failing(ClientError::Service {
            status: 500,
            message: "Analysis failed: quota exceeded".to_string(),
        }));
        let session = session(&stub);

        let err = session
            .submit("claim", RequestType::FactCheck, 0.7, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Analysis failed: quota exceeded");
        assert!(session.history().await.is_empty());
    }

    #[tokio::test]
    async fn overlapping_submit_is_busy() {
        let stub = Arc::new(StubService::answering("This is true.").with_delay(Duration::from_millis(200)));
        let session = Arc::new(session(&stub));

        let first = {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .submit("first", RequestType::FactCheck, 0.7, CancellationToken::new())
                    .await
            })
        };

        // wait until the first request holds the flag
        while !session.is_loading() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let second = session
            .submit("second", RequestType::FactCheck, 0.7, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(second, ClientError::Busy);

        first.await.unwrap().unwrap();
        assert_eq!(stub.calls(), 1);
        assert_eq!(session.history().await.len(), 1);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn cancellation_aborts_without_recording() {
        let stub = Arc::new(StubService::answering("This is true.").with_delay(Duration::from_secs(10)));
        let session = session(&stub);
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.cancel();
            })
        };

        let err = session
            .submit("claim", RequestType::FactCheck, 0.7, cancel)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err, ClientError::Cancelled);
        assert!(!session.is_loading());
        assert!(session.history().await.is_empty());
    }

    #[tokio::test]
    async fn history_is_bounded_across_many_submits() {
        let stub = Arc::new(StubService::answering("Likely AI generated."));
        let session = session(&stub);

        for i in 0..60 {
            let outcome = session
                .submit(&format!("sample {}", i), RequestType::AiDetection, 0.7, CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(outcome.verdict, Verdict::AiDetected);
        }

        let history = session.history().await;
        assert_eq!(history.len(), 50);
        assert_eq!(history[0].text, "sample 59");
        assert_eq!(history[49].text, "sample 10");

        session.clear_history().await.unwrap();
        assert!(session.history().await.is_empty());
    }

    #[tokio::test]
    async fn detect_type_validates_then_delegates() {
        let stub = Arc::new(StubService::answering("ok"));
        let session = session(&stub);

        assert!(session.detect_type("   ").await.unwrap_err().is_validation());
        assert_eq!(stub.calls(), 0);

        assert_eq!(session.detect_type("Is this AI?").await.unwrap(), RequestType::AiDetection);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn persisted_session_survives_restart() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let stub = Arc::new(StubService::answering("The headline is misleading."));

        {
            let session = AnalysisSession::new(stub.clone(), HistoryStore::open(&path, 50).unwrap());
            session
                .submit("Headline", RequestType::FactCheck, 0.7, CancellationToken::new())
                .await
                .unwrap();
        }

        let session = AnalysisSession::new(stub.clone(), HistoryStore::open(&path, 50).unwrap());
        let history = session.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].result, "The headline is misleading.");

        session.clear_history().await.unwrap();
        let reopened = HistoryStore::open(&path, 50).unwrap();
        assert!(reopened.is_empty());
    }
}
