//! Analysis Pipeline
//!
//! Primary session backend first, fallback second, hard failure only when
//! neither produced anything usable.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::analysis::{roster, AnalysisResult};
use crate::backend::{
    AnalysisBackend, BackendError, BackendReply, BackendResult, FallbackClient, OnDemandClient,
    RawAnalysis,
};
use crate::config::AppConfig;
use crate::intake::AnalysisRequest;
use crate::interpreter::ResponseInterpreter;

const DEFAULT_PRIMARY_TIMEOUT: Duration = Duration::from_secs(90);
const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Analysis failed (primary: {primary}; fallback: {fallback})")]
    AllBackendsFailed { primary: String, fallback: String },
}

pub struct AnalysisPipeline {
    primary: Option<Arc<dyn AnalysisBackend>>,
    primary_timeout: Duration,
    fallback: Option<Arc<dyn AnalysisBackend>>,
    fallback_timeout: Duration,
    interpreter: ResponseInterpreter,
}

impl AnalysisPipeline {
    pub fn new() -> Self {
        Self {
            primary: None,
            primary_timeout: DEFAULT_PRIMARY_TIMEOUT,
            fallback: None,
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
            interpreter: ResponseInterpreter::new(),
        }
    }

    /// Wires the real HTTP backends that `config` enables
    pub fn from_config(config: &AppConfig) -> Self {
        let mut pipeline = Self::new();
        if let Some(backend) = &config.backend {
            pipeline = pipeline.with_primary(
                Arc::new(OnDemandClient::new(backend.clone())),
                backend.timeout,
            );
        } else {
            info!("No API key configured, primary analysis disabled");
        }
        if let Some(url) = &config.fallback_url {
            pipeline = pipeline.with_fallback(Arc::new(FallbackClient::new(url.clone())), config.fallback_timeout);
        }
        pipeline
    }

    pub fn with_primary(mut self, backend: Arc<dyn AnalysisBackend>, limit: Duration) -> Self {
        self.primary = Some(backend);
        self.primary_timeout = limit;
        self
    }

    pub fn with_fallback(mut self, backend: Arc<dyn AnalysisBackend>, limit: Duration) -> Self {
        self.fallback = Some(backend);
        self.fallback_timeout = limit;
        self
    }

    pub fn with_interpreter(mut self, interpreter: ResponseInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn has_backend(&self) -> bool {
        self.primary.is_some() || self.fallback.is_some()
    }

    fn interpret(&self, raw: RawAnalysis) -> AnalysisResult {
        self.interpreter
            .interpret(&raw.answer)
            .with_session(raw.session_id)
            .with_agent_responses(roster::completed_responses(&raw.agent_ids))
    }

    /// Runs one analysis. Every backend failure is soft until both have failed.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResult, PipelineError> {
        // interpretation of a primary answer that carried no recognizable content
        let mut unparsed = None;

        let primary_error = match &self.primary {
            Some(primary) => {
                debug!("Calling primary backend '{}'", primary.name());
                match call(primary.as_ref(), request, self.primary_timeout).await {
                    Ok(BackendReply::Structured(result)) => return Ok(result),
                    Ok(BackendReply::Narrative(raw)) => {
                        let has_signal = self.interpreter.has_signal(&raw.answer);
                        let result = self.interpret(raw);
                        if has_signal {
                            info!("Primary analysis complete, overall score {}", result.overall_score);
                            return Ok(result);
                        }
                        warn!("Primary answer had no recognizable scores or sections");
                        unparsed = Some(result);
                        "answer had no recognizable scores or sections".to_string()
                    }
                    Err(e) => {
                        warn!("Primary backend '{}' failed: {}", primary.name(), e);
                        e.to_string()
                    }
                }
            }
            None => BackendError::NotConfigured.to_string(),
        };

        let fallback_error = match &self.fallback {
            Some(fallback) => {
                debug!("Calling fallback backend '{}'", fallback.name());
                match call(fallback.as_ref(), request, self.fallback_timeout).await {
                    Ok(BackendReply::Structured(result)) => {
                        info!("Fallback analysis complete, overall score {}", result.overall_score);
                        return Ok(result);
                    }
                    Ok(BackendReply::Narrative(raw)) => return Ok(self.interpret(raw)),
                    Err(e) => {
                        warn!("Fallback backend '{}' failed: {}", fallback.name(), e);
                        e.to_string()
                    }
                }
            }
            None => BackendError::NotConfigured.to_string(),
        };

        if let Some(result) = unparsed {
            info!("Using synthesized interpretation of the primary answer");
            return Ok(result);
        }

        Err(PipelineError::AllBackendsFailed {
            primary: primary_error,
            fallback: fallback_error,
        })
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new()
    }
}

async fn call(
    backend: &dyn AnalysisBackend,
    request: &AnalysisRequest,
    limit: Duration,
) -> BackendResult<BackendReply> {
    match timeout(limit, backend.analyze(request)).await {
        Ok(reply) => reply,
        Err(_) => Err(BackendError::Timeout(limit.as_secs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::intake::{BusinessModel, BusinessStage, TargetMarket};

    struct Scripted {
        reply: Option<BackendReply>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(reply: BackendReply) -> Arc<Self> {
            Arc::new(Self { reply: Some(reply), delay: Duration::ZERO, calls: AtomicUsize::new(0) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: None, delay: Duration::ZERO, calls: AtomicUsize::new(0) })
        }

        fn slow(reply: BackendReply, delay: Duration) -> Arc<Self> {
            Arc::new(Self { reply: Some(reply), delay, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl AnalysisBackend for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn analyze(&self, _request: &AnalysisRequest) -> BackendResult<BackendReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.reply
                .clone()
                .ok_or(BackendError::Status { status: 503, body: "unavailable".to_string() })
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new(
            "Arabic-first bookkeeping app for freelancers and micro-businesses in the Gulf.",
            TargetMarket::UaeSaudiQatar,
            BusinessStage::Idea,
            BusinessModel::B2cApp,
        )
        .unwrap()
    }

    fn narrative(answer: &str) -> BackendReply {
        BackendReply::Narrative(RawAnalysis {
            session_id: "sess-1".to_string(),
            answer: answer.to_string(),
            agent_ids: vec!["agent-1757090431".to_string()],
        })
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let fallback = Scripted::ok(BackendReply::Structured(AnalysisResult::sample()));
        let pipeline = AnalysisPipeline::new()
            .with_primary(Scripted::ok(narrative("Market Score: 90/100")), Duration::from_secs(1))
            .with_fallback(fallback.clone(), Duration::from_secs(1));

        let result = pipeline.run(&request()).await.unwrap();
        assert_eq!(result.scores.market, 90);
        assert_eq!(result.session_id.as_deref(), Some("sess-1"));
        assert_eq!(result.agent_responses.len(), 1);
        assert_eq!(result.agent_responses[0].agent_name, "Market Research");
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_signal_tries_fallback() {
        let pipeline = AnalysisPipeline::new()
            .with_primary(Scripted::ok(narrative("Sorry, I cannot help.")), Duration::from_secs(1))
            .with_fallback(
                Scripted::ok(BackendReply::Structured(AnalysisResult::sample())),
                Duration::from_secs(1),
            );
        let result = pipeline.run(&request()).await.unwrap();
        assert_eq!(result, AnalysisResult::sample());
    }

    #[tokio::test]
    async fn test_no_signal_without_fallback_is_synthesized() {
        let pipeline = AnalysisPipeline::new()
            .with_primary(Scripted::ok(narrative("Sorry, I cannot help.")), Duration::from_secs(1))
            .with_fallback(Scripted::failing(), Duration::from_secs(1));
        let result = pipeline.run(&request()).await.unwrap();
        assert_eq!(result.raw_response.as_deref(), Some("Sorry, I cannot help."));
        assert_eq!(result.overall_score, result.scores.overall());
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_timeout_falls_through() {
        let pipeline = AnalysisPipeline::new()
            .with_primary(
                Scripted::slow(narrative("Market Score: 90/100"), Duration::from_secs(600)),
                Duration::from_secs(90),
            )
            .with_fallback(
                Scripted::ok(BackendReply::Structured(AnalysisResult::sample())),
                Duration::from_secs(30),
            );
        let result = pipeline.run(&request()).await.unwrap();
        assert_eq!(result.overall_score, 78);
    }

    #[tokio::test]
    async fn test_nothing_configured() {
        let err = AnalysisPipeline::new().run(&request()).await.unwrap_err();
        let PipelineError::AllBackendsFailed { primary, fallback } = err;
        assert_eq!(primary, "Backend not configured");
        assert_eq!(fallback, "Backend not configured");
    }

    #[test]
    fn test_from_config_without_key() {
        let config = AppConfig::default();
        assert!(!AnalysisPipeline::from_config(&config).has_backend());

        let config = AppConfig {
            fallback_url: Some("http://localhost:8000/analyze".to_string()),
            ..AppConfig::default()
        };
        let pipeline = AnalysisPipeline::from_config(&config);
        assert!(pipeline.primary.is_none());
        assert!(pipeline.fallback.is_some());
    }
}
