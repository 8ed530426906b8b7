// ============================================================================
// File: src/api_client.rs
// HTTP client for the IsItTrue analysis service
// ============================================================================

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

use crate::error::ClientError;
use crate::models::{
    AnalysisRequest, AnalysisResponse, AnalyzeBody, DetectTypeBody, DetectTypeResponse,
    HealthStatus, RequestType,
};

/// Operations the remote analysis service offers.
///
/// Implementations never retry; the caller decides what to do with a failure.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ClientError>;

    async fn check_health(&self) -> Result<HealthStatus, ClientError>;

    async fn detect_type(&self, text: &str) -> Result<RequestType, ClientError>;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: &'static str,
        path: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, ClientError> {
        let start = Instant::now();
        tracing::debug!(method, path, "API request started");

        let response = request.send().await.map_err(|e| {
            let err = self.map_send_error(e);
            tracing::warn!(method, path, error = %err, "API request failed");
            err
        })?;

        let status = response.status();
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ClientError::from_service_body(status.as_u16(), &body);
            tracing::warn!(method, path, status = status.as_u16(), elapsed_ms, error = %err, "API request failed");
            return Err(err);
        }

        tracing::info!(method, path, status = status.as_u16(), elapsed_ms, "API request completed");
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ClientError> {
        let response_text = response.text().await.map_err(|e| self.map_send_error(e))?;
        serde_json::from_str(&response_text).map_err(|e| {
            ClientError::Decode(format!(
                "{} (body: {})",
                e,
                response_text.chars().take(200).collect::<String>()
            ))
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl AnalysisService for ApiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ClientError> {
        let body = AnalyzeBody::from(request);
        let builder = self.client.post(self.url("/analyze")).json(&body);
        let response = self.send("POST", "/analyze", builder).await?;
        self.read_json(response).await
    }

    async fn check_health(&self) -> Result<HealthStatus, ClientError> {
        let builder = self.client.get(self.url("/health"));
        let response = self.send("GET", "/health", builder).await?;
        self.read_json(response).await
    }

    async fn detect_type(&self, text: &str) -> Result<RequestType, ClientError> {
        let builder = self
            .client
            .post(self.url("/detect-type"))
            .json(&DetectTypeBody { text });
        let response = self.send("POST", "/detect-type", builder).await?;
        let detected: DetectTypeResponse = self.read_json(response).await?;
        Ok(detected.request_type)
    }
}
