// ============================================================================
// File: src/models.rs
// API request and response models
// ============================================================================

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis mode sent to the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum RequestType {
    #[default]
    FactCheck,
    AiDetection,
    GeneralChat,
}

impl RequestType {
    /// Wire name, as sent in `request_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::FactCheck => "fact_check",
            RequestType::AiDetection => "ai_detection",
            RequestType::GeneralChat => "general_chat",
        }
    }

    /// Human-readable label used in result banners and exports
    pub fn label(&self) -> &'static str {
        match self {
            RequestType::FactCheck => "✓ Fact-Check",
            RequestType::AiDetection => "🤖 AI Detection",
            RequestType::GeneralChat => "💬 General Chat",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fact_check" => Ok(RequestType::FactCheck),
            "ai_detection" => Ok(RequestType::AiDetection),
            "general_chat" => Ok(RequestType::GeneralChat),
            other => Err(format!("unknown request type '{}'", other)),
        }
    }
}

/// Describe a temperature as the response style shown next to the slider
pub fn describe_temperature(temperature: f32) -> &'static str {
    if temperature < 0.4 {
        "Precise"
    } else if temperature > 0.7 {
        "Creative"
    } else {
        "Balanced"
    }
}

/// Validated input for a single analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub text: String,
    pub request_type: RequestType,
    pub temperature: f32,
}

/// Request body for `POST /analyze`
#[derive(Debug, Serialize)]
pub struct AnalyzeBody<'a> {
    pub text: &'a str,
    pub request_type: RequestType,
    pub temperature: f32,
}

impl<'a> From<&'a AnalysisRequest> for AnalyzeBody<'a> {
    fn from(request: &'a AnalysisRequest) -> Self {
        Self {
            text: &request.text,
            request_type: request.request_type,
            temperature: request.temperature,
        }
    }
}

/// Response body from `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub result: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Request body for `POST /detect-type`
#[derive(Debug, Serialize)]
pub struct DetectTypeBody<'a> {
    pub text: &'a str,
}

/// Response body from `POST /detect-type`
#[derive(Debug, Deserialize)]
pub struct DetectTypeResponse {
    #[serde(rename = "type", alias = "detected_type")]
    pub request_type: RequestType,
}

/// Response body from `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Structured error payload returned by the service on 4xx/5xx
#[derive(Debug, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(default)]
    pub error_code: Option<String>,
}
