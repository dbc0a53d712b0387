//! Backend Module
//!
//! Remote analysis services behind a single trait, so the pipeline can be
//! exercised with fakes.

pub mod fallback;
pub mod ondemand;
pub mod prompt;

pub use fallback::FallbackClient;
pub use ondemand::OnDemandClient;

use async_trait::async_trait;

use crate::analysis::AnalysisResult;
use crate::intake::AnalysisRequest;

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Timeout after {0}s")]
    Timeout(u64),

    #[error("Backend not configured")]
    NotConfigured,
}

/// Free-text answer from a session-based backend, still to be interpreted
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnalysis {
    pub session_id: String,
    pub answer: String,
    pub agent_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    Narrative(RawAnalysis),
    /// Already carries numeric scores, no text parsing needed
    Structured(AnalysisResult),
}

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(&self, request: &AnalysisRequest) -> BackendResult<BackendReply>;
}
