//! Remote Service Gateway: the single point of contact with the backend.
//!
//! Core components depend on the `Gateway` trait only; `HttpGateway` is the
//! reqwest implementation used by the binary, `mock::ScriptedGateway` backs tests.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::models::session::{FeedbackEntry, Scores};
use crate::models::user::{Profile, ResultRecord, ResumeAnalysis, User};

pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewStartRequest {
    pub session_id: Option<String>,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InterviewStartResponse {
    pub question: String,
    /// The backend mints an id when the request carried none.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewAnswerRequest {
    pub session_id: Option<String>,
    pub question: String,
    pub answer: String,
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InterviewAnswerResponse {
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub next_question: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    pub user_id: String,
    pub domain: String,
    pub score_mcq: u32,
    pub score_interview: u32,
    pub feedback: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveResultsRequest {
    pub user_id: String,
    pub scores: Scores,
    pub responses: Vec<FeedbackEntry>,
    pub feedback: Vec<String>,
}

/// Ratings come from an LLM on the backend: accept numbers or numeric strings,
/// treat anything else as absent.
fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
    .filter(|f| f.is_finite())
    .map(|f| f.round() as i64))
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Backend contract. Every call is an independent await point; callers never
/// issue two calls for the same sub-flow concurrently.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn health(&self) -> Result<HealthStatus, GatewayError>;

    async fn register(&self, credentials: &Credentials) -> Result<Registration, GatewayError>;

    async fn login(&self, credentials: &Credentials) -> Result<User, GatewayError>;

    async fn fetch_profile(&self, user_id: &str) -> Result<User, GatewayError>;

    async fn save_profile(&self, profile: &Profile) -> Result<(), GatewayError>;

    async fn upload_resume(
        &self,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<ResumeAnalysis, GatewayError>;

    async fn interview_start(
        &self,
        request: &InterviewStartRequest,
    ) -> Result<InterviewStartResponse, GatewayError>;

    async fn interview_answer(
        &self,
        request: &InterviewAnswerRequest,
    ) -> Result<InterviewAnswerResponse, GatewayError>;

    async fn export_report(&self, request: &ExportRequest) -> Result<Bytes, GatewayError>;

    async fn save_results(&self, request: &SaveResultsRequest) -> Result<(), GatewayError>;

    async fn fetch_results(&self) -> Result<Vec<ResultRecord>, GatewayError>;

    async fn logout(&self) -> Result<(), GatewayError>;
}
