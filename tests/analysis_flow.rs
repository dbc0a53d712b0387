use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use gulf_validate::analysis::{AgentRole, AgentStatus};
use gulf_validate::backend::fallback::FlatAnalysis;
use gulf_validate::backend::prompt::build_analysis_prompt;
use gulf_validate::backend::{BackendReply, BackendResult, RawAnalysis};
use gulf_validate::intake::{BusinessModel, BusinessStage, TargetMarket};
use gulf_validate::orchestrator::FlowState;
use gulf_validate::services::{analysis_from_url, generate_shareable_url};
use gulf_validate::{
    AnalysisBackend, AnalysisPipeline, AnalysisRequest, AnalysisResult, BackendError, Interpretation,
    LocalStore, PipelineError, ProgressRunner, ResponseInterpreter,
};

/// Replays canned replies in order and records every prompt it was sent
struct MockSessionBackend {
    replies: Mutex<VecDeque<BackendResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockSessionBackend {
    fn new(replies: Vec<BackendResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from(replies)),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AnalysisBackend for MockSessionBackend {
    fn name(&self) -> &str {
        "mock-session"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> BackendResult<BackendReply> {
        let prompt = build_analysis_prompt(request);
        debug!("MOCK PROMPT: {}", prompt);
        self.prompts.lock().await.push(prompt);

        let answer = self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(BackendError::NotConfigured))?;
        Ok(BackendReply::Narrative(RawAnalysis {
            session_id: "sess-e2e".to_string(),
            answer,
            agent_ids: AgentRole::default_agent_ids(),
        }))
    }
}

/// Secondary backend answering with a flat JSON payload
struct MockFlatBackend {
    payload: Option<&'static str>,
}

#[async_trait]
impl AnalysisBackend for MockFlatBackend {
    fn name(&self) -> &str {
        "mock-flat"
    }

    async fn analyze(&self, _request: &AnalysisRequest) -> BackendResult<BackendReply> {
        let payload = self.payload.ok_or(BackendError::Status {
            status: 500,
            body: "internal error".to_string(),
        })?;
        let flat: FlatAnalysis =
            serde_json::from_str(payload).map_err(|e| BackendError::MalformedResponse(e.to_string()))?;
        Ok(BackendReply::Structured(flat.into_result()))
    }
}

const HAPPY_ANSWER: &str = "\
### GCC Feasibility Assessment

Market Score: 90/100
Financial Score: 72/100
Technical Score: 85/100
Legal Score: 60/100
Cultural Score: 78/100
Competitive Score: 66/100

Strengths:
- Rapidly digitising SME sector in Saudi Arabia
- Open banking rules in the UAE enable data access
- Recurring SaaS revenue

Concerns:
- Credit bureau partnerships take months to secure

Recommendations:
1. Join the DIFC fintech sandbox
2. Hire a compliance lead before launch
";

const FLAT_PAYLOAD: &str = r#"{
    "overall_feasibility_score": 75,
    "scores": {"market": 80, "financial": 72, "technical": 77, "legal": 64, "cultural": 81, "competitive": 70},
    "strengths": ["Clear demand"],
    "concerns": ["Licensing"],
    "recommendations": ["Start in the UAE"]
}"#;

fn request() -> AnalysisRequest {
    AnalysisRequest::new(
        "AI-powered credit scoring platform for SMEs in the GCC using alternative data sources.",
        TargetMarket::UaeSaudi,
        BusinessStage::Mvp,
        BusinessModel::Fintech,
    )
    .unwrap()
}

fn limit() -> Duration {
    Duration::from_secs(5)
}

#[tokio::test]
async fn test_e2e_happy_path() {
    let primary = MockSessionBackend::new(vec![Ok(HAPPY_ANSWER.to_string())]);
    let pipeline = AnalysisPipeline::new()
        .with_primary(primary.clone(), limit())
        .with_fallback(Arc::new(MockFlatBackend { payload: Some(FLAT_PAYLOAD) }), limit());

    let result = pipeline.run(&request()).await.unwrap();

    assert_eq!(result.scores.market, 90);
    assert_eq!(result.scores.competitive, 66);
    assert_eq!(result.strengths.len(), 3);
    assert_eq!(result.recommendations[0], "Join the DIFC fintech sandbox");
    assert_eq!(result.overall_score, result.scores.overall());
    assert_eq!(result.interpretation, Interpretation::from_score(result.overall_score));
    assert_eq!(result.session_id.as_deref(), Some("sess-e2e"));
    assert_eq!(result.agent_responses.len(), 11);
    assert!(result.agent_responses.iter().all(|a| a.status == AgentStatus::Completed));

    let prompts = primary.prompts.lock().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Market Score: <0-100>/100"));
    assert!(prompts[0].contains("Model: Fintech"));
}

#[tokio::test]
async fn test_e2e_primary_failure_secondary_success() {
    let primary = MockSessionBackend::new(vec![Err(BackendError::Status {
        status: 401,
        body: "invalid api key".to_string(),
    })]);
    let pipeline = AnalysisPipeline::new()
        .with_primary(primary, limit())
        .with_fallback(Arc::new(MockFlatBackend { payload: Some(FLAT_PAYLOAD) }), limit());

    let result = pipeline.run(&request()).await.unwrap();
    assert_eq!(result.overall_score, 75);
    assert_eq!(result.scores.market, 80);
    assert!(result.agent_responses.is_empty());
    assert_eq!(result.interpretation, Interpretation::ViableWithImprovements);
}

#[tokio::test]
async fn test_e2e_both_backends_fail() {
    let primary = MockSessionBackend::new(vec![Err(BackendError::Timeout(90))]);
    let pipeline = AnalysisPipeline::new()
        .with_primary(primary, limit())
        .with_fallback(Arc::new(MockFlatBackend { payload: None }), limit());

    let err = pipeline.run(&request()).await.unwrap_err();
    let PipelineError::AllBackendsFailed { primary, fallback } = err;
    assert!(primary.contains("Timeout after 90s"));
    assert!(fallback.contains("500"));
}

#[tokio::test]
async fn test_e2e_retry_after_failure() {
    let primary = MockSessionBackend::new(vec![
        Err(BackendError::MalformedResponse("no data.answer".to_string())),
        Ok(HAPPY_ANSWER.to_string()),
    ]);
    let pipeline = AnalysisPipeline::new().with_primary(primary.clone(), limit());

    assert!(pipeline.run(&request()).await.is_err());
    let result = pipeline.run(&request()).await.unwrap();
    assert_eq!(result.scores.market, 90);
    assert_eq!(primary.prompts.lock().await.len(), 2);
}

#[tokio::test]
async fn test_e2e_unparseable_answer_is_synthesized_deterministically() {
    let answer = "Thank you for your question. The agents are reviewing it.";
    let pipeline = || {
        AnalysisPipeline::new()
            .with_primary(MockSessionBackend::new(vec![Ok(answer.to_string())]), limit())
            .with_interpreter(ResponseInterpreter::new().with_seed(7))
    };

    let first = pipeline().run(&request()).await.unwrap();
    let second = pipeline().run(&request()).await.unwrap();
    assert_eq!(first, second);
    for (_, score) in first.scores.iter() {
        assert!(score <= 100);
    }
    assert!(!first.strengths.is_empty());
}

#[tokio::test]
async fn test_e2e_progress_store_and_share() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("store.json"));
    let pipeline = AnalysisPipeline::new()
        .with_primary(MockSessionBackend::new(vec![Ok(HAPPY_ANSWER.to_string())]), limit());

    let runner = ProgressRunner::new().with_tick(Duration::from_millis(10));
    let (tx, rx) = watch::channel(runner.initial_snapshot());
    let request = request();
    store.save_request(&request).await.unwrap();

    let result = runner
        .run(pipeline.run(&request), &tx)
        .await
        .expect("view still open")
        .unwrap();
    assert_eq!(rx.borrow().state, FlowState::Completed);
    store.save_result(&result).await.unwrap();

    let stored = store.load_result().await.unwrap();
    assert_eq!(stored, result);
    assert_eq!(store.load_request().await, Some(request));

    let url = generate_shareable_url("https://gulfvalidate.app", &stored);
    assert_eq!(analysis_from_url(&url), Some(result));
}

#[tokio::test]
async fn test_e2e_failed_run_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("store.json"));
    let pipeline = AnalysisPipeline::new()
        .with_fallback(Arc::new(MockFlatBackend { payload: None }), limit());

    let runner = ProgressRunner::new().with_tick(Duration::from_millis(10));
    let (tx, rx) = watch::channel(runner.initial_snapshot());
    let outcome = runner.run(pipeline.run(&request()), &tx).await.unwrap();

    assert!(outcome.is_err());
    assert_eq!(rx.borrow().state, FlowState::Failed);
    assert!(store.load_result().await.is_none());
}

#[test]
fn test_corrupt_share_link_shows_no_results() {
    assert!(analysis_from_url("https://gulfvalidate.app/results#data=eyJicm9rZW4i").is_none());
    assert!(analysis_from_url("https://gulfvalidate.app/results#data=").is_none());
    assert_eq!(
        analysis_from_url(&generate_shareable_url("https://gulfvalidate.app", &AnalysisResult::sample())),
        Some(AnalysisResult::sample())
    );
}
